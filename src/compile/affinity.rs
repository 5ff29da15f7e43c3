// Copyright 2025 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::models::pool::{
    LabelSelector, NodeAffinity, NodeSelectorTerm, PodAffinity, PodAffinityTerm, PoolAffinity,
    PoolToleration, PreferredSchedulingTerm, SelectorRequirement, TolerationSeconds,
    WeightedPodAffinityTerm,
};
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

/// Scheduling constraints for a pool. `None` when no part carries a term.
pub fn to_resource_affinity(affinity: &PoolAffinity) -> Option<corev1::Affinity> {
    let node_affinity = affinity.node_affinity.as_ref().and_then(to_node_affinity);
    let pod_affinity = affinity
        .pod_affinity
        .as_ref()
        .and_then(to_pod_terms)
        .map(|(required, preferred)| corev1::PodAffinity {
            required_during_scheduling_ignored_during_execution: required,
            preferred_during_scheduling_ignored_during_execution: preferred,
        });
    let pod_anti_affinity = affinity
        .pod_anti_affinity
        .as_ref()
        .and_then(to_pod_terms)
        .map(|(required, preferred)| corev1::PodAntiAffinity {
            required_during_scheduling_ignored_during_execution: required,
            preferred_during_scheduling_ignored_during_execution: preferred,
        });

    if node_affinity.is_none() && pod_affinity.is_none() && pod_anti_affinity.is_none() {
        return None;
    }

    Some(corev1::Affinity {
        node_affinity,
        pod_affinity,
        pod_anti_affinity,
    })
}

pub fn from_resource_affinity(affinity: &corev1::Affinity) -> Option<PoolAffinity> {
    let node_affinity = affinity.node_affinity.as_ref().map(from_node_affinity);
    let pod_affinity = affinity.pod_affinity.as_ref().map(|a| {
        from_pod_terms(
            a.required_during_scheduling_ignored_during_execution.as_deref(),
            a.preferred_during_scheduling_ignored_during_execution.as_deref(),
        )
    });
    let pod_anti_affinity = affinity.pod_anti_affinity.as_ref().map(|a| {
        from_pod_terms(
            a.required_during_scheduling_ignored_during_execution.as_deref(),
            a.preferred_during_scheduling_ignored_during_execution.as_deref(),
        )
    });

    if node_affinity.is_none() && pod_affinity.is_none() && pod_anti_affinity.is_none() {
        return None;
    }

    Some(PoolAffinity {
        node_affinity,
        pod_affinity,
        pod_anti_affinity,
    })
}

fn to_node_affinity(affinity: &NodeAffinity) -> Option<corev1::NodeAffinity> {
    let required: Vec<_> = affinity
        .required_during_scheduling_ignored_during_execution
        .iter()
        .map(to_node_selector_term)
        .collect();
    let preferred: Vec<_> = affinity
        .preferred_during_scheduling_ignored_during_execution
        .iter()
        .map(|term| corev1::PreferredSchedulingTerm {
            weight: term.weight,
            preference: to_node_selector_term(&term.preference),
        })
        .collect();

    if required.is_empty() && preferred.is_empty() {
        return None;
    }

    Some(corev1::NodeAffinity {
        required_during_scheduling_ignored_during_execution: non_empty(required)
            .map(|node_selector_terms| corev1::NodeSelector { node_selector_terms }),
        preferred_during_scheduling_ignored_during_execution: non_empty(preferred),
    })
}

fn from_node_affinity(affinity: &corev1::NodeAffinity) -> NodeAffinity {
    NodeAffinity {
        required_during_scheduling_ignored_during_execution: affinity
            .required_during_scheduling_ignored_during_execution
            .as_ref()
            .map(|selector| {
                selector
                    .node_selector_terms
                    .iter()
                    .map(from_node_selector_term)
                    .collect()
            })
            .unwrap_or_default(),
        preferred_during_scheduling_ignored_during_execution: affinity
            .preferred_during_scheduling_ignored_during_execution
            .iter()
            .flatten()
            .map(|term| PreferredSchedulingTerm {
                weight: term.weight,
                preference: from_node_selector_term(&term.preference),
            })
            .collect(),
    }
}

fn to_node_selector_term(term: &NodeSelectorTerm) -> corev1::NodeSelectorTerm {
    let requirements = |items: &[SelectorRequirement]| {
        non_empty(
            items
                .iter()
                .map(|r| corev1::NodeSelectorRequirement {
                    key: r.key.clone(),
                    operator: r.operator.clone(),
                    values: non_empty(r.values.clone()),
                })
                .collect(),
        )
    };

    corev1::NodeSelectorTerm {
        match_expressions: requirements(&term.match_expressions),
        match_fields: requirements(&term.match_fields),
    }
}

fn from_node_selector_term(term: &corev1::NodeSelectorTerm) -> NodeSelectorTerm {
    let requirements = |items: Option<&Vec<corev1::NodeSelectorRequirement>>| {
        items
            .into_iter()
            .flatten()
            .map(|r| SelectorRequirement {
                key: r.key.clone(),
                operator: r.operator.clone(),
                values: r.values.clone().unwrap_or_default(),
            })
            .collect()
    };

    NodeSelectorTerm {
        match_expressions: requirements(term.match_expressions.as_ref()),
        match_fields: requirements(term.match_fields.as_ref()),
    }
}

type PodTerms = (
    Option<Vec<corev1::PodAffinityTerm>>,
    Option<Vec<corev1::WeightedPodAffinityTerm>>,
);

fn to_pod_terms(affinity: &PodAffinity) -> Option<PodTerms> {
    let required: Vec<_> = affinity
        .required_during_scheduling_ignored_during_execution
        .iter()
        .map(to_pod_affinity_term)
        .collect();
    let preferred: Vec<_> = affinity
        .preferred_during_scheduling_ignored_during_execution
        .iter()
        .map(|term| corev1::WeightedPodAffinityTerm {
            weight: term.weight,
            pod_affinity_term: to_pod_affinity_term(&term.pod_affinity_term),
        })
        .collect();

    if required.is_empty() && preferred.is_empty() {
        return None;
    }

    Some((non_empty(required), non_empty(preferred)))
}

fn from_pod_terms(
    required: Option<&[corev1::PodAffinityTerm]>,
    preferred: Option<&[corev1::WeightedPodAffinityTerm]>,
) -> PodAffinity {
    PodAffinity {
        required_during_scheduling_ignored_during_execution: required
            .unwrap_or_default()
            .iter()
            .map(from_pod_affinity_term)
            .collect(),
        preferred_during_scheduling_ignored_during_execution: preferred
            .unwrap_or_default()
            .iter()
            .map(|term| WeightedPodAffinityTerm {
                weight: term.weight,
                pod_affinity_term: from_pod_affinity_term(&term.pod_affinity_term),
            })
            .collect(),
    }
}

fn to_pod_affinity_term(term: &PodAffinityTerm) -> corev1::PodAffinityTerm {
    let selector = &term.label_selector;
    let label_selector =
        (!selector.match_expressions.is_empty() || !selector.match_labels.is_empty()).then(|| {
            metav1::LabelSelector {
                match_expressions: non_empty(
                    selector
                        .match_expressions
                        .iter()
                        .map(|r| metav1::LabelSelectorRequirement {
                            key: r.key.clone(),
                            operator: r.operator.clone(),
                            values: non_empty(r.values.clone()),
                        })
                        .collect(),
                ),
                match_labels: (!selector.match_labels.is_empty())
                    .then(|| selector.match_labels.clone()),
            }
        });

    corev1::PodAffinityTerm {
        label_selector,
        namespaces: non_empty(term.namespaces.clone()),
        topology_key: term.topology_key.clone(),
        ..Default::default()
    }
}

fn from_pod_affinity_term(term: &corev1::PodAffinityTerm) -> PodAffinityTerm {
    let label_selector = term
        .label_selector
        .as_ref()
        .map(|selector| LabelSelector {
            match_expressions: selector
                .match_expressions
                .iter()
                .flatten()
                .map(|r| SelectorRequirement {
                    key: r.key.clone(),
                    operator: r.operator.clone(),
                    values: r.values.clone().unwrap_or_default(),
                })
                .collect(),
            match_labels: selector.match_labels.clone().unwrap_or_default(),
        })
        .unwrap_or_default();

    PodAffinityTerm {
        label_selector,
        namespaces: term.namespaces.clone().unwrap_or_default(),
        topology_key: term.topology_key.clone(),
    }
}

pub fn to_resource_tolerations(tolerations: &[PoolToleration]) -> Vec<corev1::Toleration> {
    tolerations
        .iter()
        .map(|t| corev1::Toleration {
            key: t.key.clone(),
            operator: t.operator.clone(),
            value: t.value.clone(),
            effect: t.effect.clone(),
            toleration_seconds: t.toleration_seconds.as_ref().map(|s| s.seconds),
        })
        .collect()
}

pub fn from_resource_tolerations(tolerations: &[corev1::Toleration]) -> Vec<PoolToleration> {
    tolerations
        .iter()
        .map(|t| PoolToleration {
            key: t.key.clone(),
            operator: t.operator.clone(),
            value: t.value.clone(),
            effect: t.effect.clone(),
            toleration_seconds: t
                .toleration_seconds
                .map(|seconds| TolerationSeconds { seconds }),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn zone_anti_affinity() -> PoolAffinity {
        PoolAffinity {
            pod_anti_affinity: Some(PodAffinity {
                required_during_scheduling_ignored_during_execution: vec![PodAffinityTerm {
                    label_selector: LabelSelector {
                        match_labels: BTreeMap::from([(
                            "v1.min.io/tenant".to_string(),
                            "test-tenant".to_string(),
                        )]),
                        ..Default::default()
                    },
                    topology_key: "kubernetes.io/hostname".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    // Test: empty sub-affinities collapse to no affinity at all
    #[test]
    fn test_empty_affinity_is_none() {
        let affinity = PoolAffinity {
            node_affinity: Some(NodeAffinity::default()),
            pod_affinity: Some(PodAffinity::default()),
            pod_anti_affinity: None,
        };
        assert!(to_resource_affinity(&affinity).is_none());
    }

    #[test]
    fn test_pod_anti_affinity() {
        let affinity = to_resource_affinity(&zone_anti_affinity()).expect("Should produce affinity");
        assert!(affinity.node_affinity.is_none());
        assert!(affinity.pod_affinity.is_none());

        let anti = affinity.pod_anti_affinity.as_ref().expect("Should have anti affinity");
        let terms = anti
            .required_during_scheduling_ignored_during_execution
            .as_ref()
            .expect("Should have required terms");
        assert_eq!(terms[0].topology_key, "kubernetes.io/hostname");
        assert!(terms[0].namespaces.is_none());
        assert!(
            anti.preferred_during_scheduling_ignored_during_execution
                .is_none()
        );

        assert_eq!(
            from_resource_affinity(&affinity).expect("Should decompile"),
            zone_anti_affinity()
        );
    }

    #[test]
    fn test_node_affinity_round_trip() {
        let term = NodeSelectorTerm {
            match_expressions: vec![SelectorRequirement {
                key: "disktype".to_string(),
                operator: "In".to_string(),
                values: vec!["nvme".to_string()],
            }],
            ..Default::default()
        };
        let affinity = PoolAffinity {
            node_affinity: Some(NodeAffinity {
                required_during_scheduling_ignored_during_execution: vec![term.clone()],
                preferred_during_scheduling_ignored_during_execution: vec![
                    PreferredSchedulingTerm {
                        weight: 50,
                        preference: term,
                    },
                ],
            }),
            ..Default::default()
        };

        let compiled = to_resource_affinity(&affinity).expect("Should produce affinity");
        let node = compiled.node_affinity.as_ref().expect("Should have node affinity");
        assert_eq!(
            node.preferred_during_scheduling_ignored_during_execution
                .as_ref()
                .map(|p| p[0].weight),
            Some(50)
        );
        assert_eq!(from_resource_affinity(&compiled), Some(affinity));
    }

    #[test]
    fn test_tolerations_round_trip() {
        let tolerations = vec![PoolToleration {
            key: Some("dedicated".to_string()),
            operator: Some("Equal".to_string()),
            value: Some("storage".to_string()),
            effect: Some("NoExecute".to_string()),
            toleration_seconds: Some(TolerationSeconds { seconds: 300 }),
        }];

        let compiled = to_resource_tolerations(&tolerations);
        assert_eq!(compiled[0].toleration_seconds, Some(300));
        assert_eq!(from_resource_tolerations(&compiled), tolerations);
    }
}
