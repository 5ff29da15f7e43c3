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

use crate::compile::affinity::{
    from_resource_affinity, from_resource_tolerations, to_resource_affinity,
    to_resource_tolerations,
};
use crate::compile::quantity::{binary_si, parse_quantity};
use crate::compile::security_context::{compile_security_context, decompile_security_context};
use crate::compile::{
    Error, InvalidServersSnafu, InvalidVolumeSizeSnafu, InvalidVolumesPerServerSnafu,
    MissingVolumeConfigurationSnafu,
};
use crate::models::pool::{PoolResources, VolumeConfiguration};
use crate::models::Pool;
use crate::types::v2;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use snafu::{OptionExt, ensure};
use std::collections::BTreeMap;

/// Name of the volume claim template every pool mounts its drives from.
pub const VOLUME_CLAIM_NAME: &str = "data";

const STORAGE: &str = "storage";

fn non_empty_map<V>(map: BTreeMap<String, V>) -> Option<BTreeMap<String, V>> {
    (!map.is_empty()).then_some(map)
}

/// Compiles a request pool into the custom resource representation.
///
/// Validation happens before anything is built, so an invalid pool never produces a
/// partial result.
pub fn compile_pool(pool: &Pool) -> Result<v2::pool::Pool, Error> {
    let label = pool.name.clone().unwrap_or_default();

    let volume = pool
        .volume_configuration
        .as_ref()
        .context(MissingVolumeConfigurationSnafu { pool: label.clone() })?;
    ensure!(
        volume.size > 0,
        InvalidVolumeSizeSnafu {
            pool: label.clone(),
            size: volume.size
        }
    );
    ensure!(
        pool.servers > 0,
        InvalidServersSnafu {
            pool: label.clone(),
            servers: pool.servers
        }
    );
    ensure!(
        pool.volumes_per_server > 0,
        InvalidVolumesPerServerSnafu {
            pool: label,
            volumes: pool.volumes_per_server
        }
    );
    let servers = i32::try_from(pool.servers).ok().context(InvalidServersSnafu {
        pool: pool.name.clone().unwrap_or_default(),
        servers: pool.servers,
    })?;

    let security_context = pool
        .security_context
        .as_ref()
        .map(compile_security_context)
        .transpose()?;

    Ok(v2::pool::Pool {
        name: pool.name.clone().unwrap_or_default(),
        servers,
        volumes_per_server: pool.volumes_per_server,
        volume_claim_template: volume_claim_template(volume),
        resources: pool.resources.as_ref().and_then(compile_resources),
        node_selector: non_empty_map(pool.node_selector.clone()),
        affinity: pool.affinity.as_ref().and_then(to_resource_affinity),
        tolerations: to_resource_tolerations(&pool.tolerations),
        security_context,
    })
}

fn volume_claim_template(volume: &VolumeConfiguration) -> corev1::PersistentVolumeClaim {
    corev1::PersistentVolumeClaim {
        metadata: metav1::ObjectMeta {
            name: Some(VOLUME_CLAIM_NAME.to_owned()),
            labels: non_empty_map(volume.labels.clone()),
            annotations: non_empty_map(volume.annotations.clone()),
            ..Default::default()
        },
        spec: Some(corev1::PersistentVolumeClaimSpec {
            access_modes: Some(vec!["ReadWriteOnce".to_owned()]),
            resources: Some(corev1::VolumeResourceRequirements {
                requests: Some(BTreeMap::from([(STORAGE.to_owned(), binary_si(volume.size))])),
                ..Default::default()
            }),
            storage_class_name: volume.storage_class_name.clone(),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn compile_quantities(values: &BTreeMap<String, i64>) -> Option<BTreeMap<String, Quantity>> {
    non_empty_map(
        values
            .iter()
            .filter(|(_, value)| **value != 0)
            .map(|(name, value)| (name.clone(), binary_si(*value)))
            .collect(),
    )
}

fn compile_resources(resources: &PoolResources) -> Option<corev1::ResourceRequirements> {
    let requests = compile_quantities(&resources.requests);
    let limits = compile_quantities(&resources.limits);
    if requests.is_none() && limits.is_none() {
        return None;
    }

    Some(corev1::ResourceRequirements {
        requests,
        limits,
        ..Default::default()
    })
}

fn decompile_quantities(values: Option<&BTreeMap<String, Quantity>>) -> BTreeMap<String, i64> {
    values
        .into_iter()
        .flatten()
        .filter_map(|(name, quantity)| Some((name.clone(), parse_quantity(&quantity.0)?)))
        .collect()
}

/// Inverse of [`compile_pool`]. Never fails; unreadable quantities are dropped.
pub fn decompile_pool(pool: &v2::pool::Pool) -> Pool {
    let template = &pool.volume_claim_template;
    let spec = template.spec.as_ref();
    let size = spec
        .and_then(|s| s.resources.as_ref())
        .and_then(|r| r.requests.as_ref())
        .and_then(|requests| requests.get(STORAGE))
        .and_then(|quantity| parse_quantity(&quantity.0))
        .unwrap_or_default();

    Pool {
        name: (!pool.name.is_empty()).then(|| pool.name.clone()),
        servers: i64::from(pool.servers),
        volumes_per_server: pool.volumes_per_server,
        volume_configuration: Some(VolumeConfiguration {
            size,
            storage_class_name: spec.and_then(|s| s.storage_class_name.clone()),
            labels: template.metadata.labels.clone().unwrap_or_default(),
            annotations: template.metadata.annotations.clone().unwrap_or_default(),
        }),
        resources: pool.resources.as_ref().map(|r| PoolResources {
            requests: decompile_quantities(r.requests.as_ref()),
            limits: decompile_quantities(r.limits.as_ref()),
        }),
        node_selector: pool.node_selector.clone().unwrap_or_default(),
        affinity: pool.affinity.as_ref().and_then(from_resource_affinity),
        tolerations: from_resource_tolerations(&pool.tolerations),
        security_context: pool.security_context.as_ref().map(decompile_security_context),
    }
}
