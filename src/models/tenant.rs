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

use crate::certificate::CertificateInfo;
use crate::models::{
    DomainsConfiguration, EncryptionConfiguration, EnvironmentVariable, IdentityProvider,
    ImageRegistry, KeyPairConfiguration, Pool, SecurityContext,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TenantCreateRequest {
    pub name: String,

    pub namespace: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Root user; a random one is generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,

    /// Parity drives per erasure set, 2..=8. Zero leaves the server default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub erasure_coding_parity: Option<i32>,

    pub pools: Vec<Pool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idp: Option<IdentityProvider>,

    /// Let the operator issue certificates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_tls: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_console: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_prometheus: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsConfiguration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<EncryptionConfiguration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_search_configuration: Option<LogSearchConfiguration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prometheus_configuration: Option<PrometheusConfiguration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_registry: Option<ImageRegistry>,

    /// Existing pull secret. Takes precedence over `image_registry`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_secret: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expose_minio: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expose_console: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment_variables: Vec<EnvironmentVariable>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<DomainsConfiguration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_path: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TlsConfiguration {
    /// Server certificates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub minio: Vec<KeyPairConfiguration>,

    /// Client certificates MinIO presents to other services.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub minio_client: Vec<KeyPairConfiguration>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ca_certificates: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LogSearchConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postgres_image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postgres_init_image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,

    /// GiB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_size: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<SecurityContext>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postgres_security_context: Option<SecurityContext>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PrometheusConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidecar_image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,

    /// GiB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_size: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<SecurityContext>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantResponse {
    pub external_idp: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub console: Vec<TenantCredentials>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TenantCredentials {
    pub access_key: String,
    pub secret_key: String,
    pub url: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenantRequest {
    /// New image. When empty the latest known image is used if it can be resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_registry: Option<ImageRegistry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_secret: Option<String>,

    #[serde(default)]
    pub enable_prometheus: bool,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenantSecurityRequest {
    pub auto_cert: bool,

    #[serde(default)]
    pub custom_certificates: UpdateCustomCertificates,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomCertificates {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub minio: Vec<KeyPairConfiguration>,

    #[serde(default, rename = "minioCAs", skip_serializing_if = "Vec::is_empty")]
    pub minio_cas: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secrets_to_be_deleted: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TenantSecurityResponse {
    pub auto_cert: bool,

    pub custom_certificates: SecurityCertificates,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SecurityCertificates {
    pub minio: Vec<CertificateInfo>,

    #[serde(rename = "minioCAs")]
    pub minio_cas: Vec<CertificateInfo>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PoolUpdateRequest {
    #[serde(default)]
    pub pools: Vec<Pool>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDomainsRequest {
    #[serde(default)]
    pub domains: DomainsConfiguration,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIdentityProviderRequest {
    pub idp: IdentityProvider,
}
