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

/// Log search (audit log database) deployment.
#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LogConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db: Option<LogDbConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<corev1::PodSecurityContext>,
}

#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AuditConfig {
    /// Maximum size of the audit table, trimmed when exceeded.
    #[serde(rename = "diskCapacityGB")]
    pub disk_capacity_gb: i32,
}

#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LogDbConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_image: Option<String>,

    pub volume_claim_template: corev1::PersistentVolumeClaim,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<corev1::PodSecurityContext>,
}

/// Prometheus instance scraping the tenant.
#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PrometheusConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidecar_image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_image: Option<String>,

    #[serde(rename = "diskCapacityGB")]
    pub disk_capacity_gb: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<corev1::PodSecurityContext>,
}

#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExposeServices {
    #[serde(default)]
    pub minio: bool,

    #[serde(default)]
    pub console: bool,
}
