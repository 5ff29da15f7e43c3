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

use crate::models::{KeyPairConfiguration, SecurityContext};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    /// TLS pair served by KES.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<KeyPairConfiguration>,

    /// Client pair MinIO presents to KES.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<KeyPairConfiguration>,

    pub kms: KmsConfiguration,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<SecurityContext>,
}

/// External key management system backing KES.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum KmsConfiguration {
    Vault(VaultConfiguration),
    Aws(AwsConfiguration),
    Gemalto(GemaltoConfiguration),
    Gcp(GcpConfiguration),
    Azure(AzureConfiguration),
}

impl Default for KmsConfiguration {
    fn default() -> Self {
        KmsConfiguration::Vault(VaultConfiguration::default())
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub struct VaultConfiguration {
    pub endpoint: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approle: Option<VaultAppRole>,

    /// Base64 PEM material KES uses for mTLS against Vault.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<VaultTls>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub struct VaultAppRole {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,

    pub id: String,

    pub secret: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub struct VaultTls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub struct AwsConfiguration {
    pub secretsmanager: AwsSecretsManager,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub struct AwsSecretsManager {
    pub endpoint: String,

    pub region: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kmskey: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<AwsCredentials>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub struct AwsCredentials {
    pub accesskey: String,

    pub secretkey: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub struct GemaltoConfiguration {
    pub keysecure: GemaltoKeySecure,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub struct GemaltoKeySecure {
    pub endpoint: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<GemaltoCredentials>,

    /// Base64 PEM CA bundle for the KeySecure endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub struct GemaltoCredentials {
    pub token: String,
    pub domain: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub struct GcpConfiguration {
    pub secretmanager: GcpSecretManager,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub struct GcpSecretManager {
    pub project_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<GcpCredentials>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub struct GcpCredentials {
    #[serde(default)]
    pub client_email: String,

    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub private_key_id: String,

    #[serde(default)]
    pub private_key: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub struct AzureConfiguration {
    pub keyvault: AzureKeyVault,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub struct AzureKeyVault {
    pub endpoint: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<AzureCredentials>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub struct AzureCredentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}
