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

use k8s_openapi::api::core::v1 as corev1;
use kube::KubeSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A storage pool: a group of servers sharing the same volume layout.
#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    #[serde(default)]
    pub name: String,

    #[x_kube(validation = Rule::new("self > 0").message("servers must be greater than 0"))]
    pub servers: i32,

    #[x_kube(validation = Rule::new("self > 0").message("volumesPerServer must be greater than 0"))]
    pub volumes_per_server: i32,

    pub volume_claim_template: corev1::PersistentVolumeClaim,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<corev1::ResourceRequirements>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity: Option<corev1::Affinity>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tolerations: Vec<corev1::Toleration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<corev1::PodSecurityContext>,
}

impl Pool {
    /// Annotations on the pool's volume claim template, created on demand.
    pub fn volume_annotations_mut(&mut self) -> &mut BTreeMap<String, String> {
        self.volume_claim_template
            .metadata
            .annotations
            .get_or_insert_with(BTreeMap::new)
    }
}
