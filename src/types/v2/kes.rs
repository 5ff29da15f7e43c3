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

use crate::types::v2::certificate::LocalCertificateReference;
use k8s_openapi::api::core::v1 as corev1;
use kube::KubeSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key Encryption Service deployed next to the tenant for server-side encryption.
#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct KesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    pub replicas: i32,

    /// Secret holding `server-config.yaml`.
    pub kes_secret: corev1::LocalObjectReference,

    /// TLS pair served by KES.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_cert_secret: Option<LocalCertificateReference>,

    /// mTLS material KES presents to the KMS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_cert_secret: Option<LocalCertificateReference>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<corev1::PodSecurityContext>,
}
