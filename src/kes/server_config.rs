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

//! KES `server-config.yaml` layout.

use serde::Serialize;
use std::collections::BTreeMap;

pub const ADDRESS: &str = "0.0.0.0:7373";
pub const SERVER_KEY_PATH: &str = "/tmp/kes/server.key";
pub const SERVER_CERT_PATH: &str = "/tmp/kes/server.crt";
pub const CLIENT_CERT_PATH: &str = "/tmp/kes/client.crt";
pub const CLIENT_KEY_PATH: &str = "/tmp/kes/client.key";
pub const CLIENT_CA_PATH: &str = "/tmp/kes/ca.crt";

pub const DEFAULT_POLICY: &str = "default-policy";
pub const MINIO_KEY_NAME: &str = "my-minio-key";

/// Identity placeholder the operator substitutes with its own client identity.
pub const OPERATOR_IDENTITY: &str = "${MINIO_KES_IDENTITY}";

const RETRY: &str = "15s";

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub address: String,
    pub root: String,
    pub tls: Tls,
    pub policy: BTreeMap<String, Policy>,
    pub cache: Cache,
    pub log: Log,
    pub keys: Keys,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Tls {
    pub key: String,
    pub cert: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Policy {
    pub paths: Vec<String>,
    pub identities: Vec<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Cache {
    pub expiry: Expiry,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Expiry {
    pub any: String,
    pub unused: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Log {
    pub error: String,
    pub audit: String,
}

#[derive(Serialize, Clone, Debug, PartialEq, Default)]
pub struct Keys {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault: Option<Vault>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws: Option<Aws>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemalto: Option<Gemalto>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcp: Option<Gcp>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure: Option<Azure>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Vault {
    pub endpoint: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    pub approle: AppRole,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<ClientTls>,

    pub status: VaultStatus,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct AppRole {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    pub id: String,
    pub secret: String,
    pub retry: String,
}

impl AppRole {
    pub fn new(engine: Option<String>, id: String, secret: String) -> Self {
        Self {
            engine,
            id,
            secret,
            retry: RETRY.to_owned(),
        }
    }
}

/// mTLS material KES presents to the KMS, as mounted paths.
#[derive(Serialize, Clone, Debug, PartialEq, Default)]
pub struct ClientTls {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct VaultStatus {
    pub ping: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Aws {
    pub secretsmanager: AwsSecretsManager,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct AwsSecretsManager {
    pub endpoint: String,
    pub region: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kmskey: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<AwsCredentials>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct AwsCredentials {
    pub accesskey: String,
    pub secretkey: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Gemalto {
    pub keysecure: GemaltoKeySecure,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct GemaltoKeySecure {
    pub endpoint: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<GemaltoCredentials>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<ClientTls>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct GemaltoCredentials {
    pub token: String,
    pub domain: String,
    pub retry: String,
}

impl GemaltoCredentials {
    pub fn new(token: String, domain: String) -> Self {
        Self {
            token,
            domain,
            retry: RETRY.to_owned(),
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Gcp {
    pub secretmanager: GcpSecretManager,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct GcpSecretManager {
    pub project_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<GcpCredentials>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct GcpCredentials {
    pub client_email: String,
    pub client_id: String,
    pub private_key_id: String,
    pub private_key: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Azure {
    pub keyvault: AzureKeyVault,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct AzureKeyVault {
    pub endpoint: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<AzureCredentials>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct AzureCredentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl ServerConfig {
    /// Defaults shared by every backend. `identity` is the only one allowed to use the key.
    pub fn new(identity: impl Into<String>, keys: Keys) -> Self {
        let paths = ["create", "generate", "decrypt"]
            .iter()
            .map(|op| format!("/v1/key/{op}/{MINIO_KEY_NAME}"))
            .collect();

        Self {
            address: ADDRESS.to_owned(),
            root: "disabled".to_owned(),
            tls: Tls {
                key: SERVER_KEY_PATH.to_owned(),
                cert: SERVER_CERT_PATH.to_owned(),
            },
            policy: BTreeMap::from([(
                DEFAULT_POLICY.to_owned(),
                Policy {
                    paths,
                    identities: vec![identity.into()],
                },
            )]),
            cache: Cache {
                expiry: Expiry {
                    any: "5m".to_owned(),
                    unused: "20s".to_owned(),
                },
            },
            log: Log {
                error: "on".to_owned(),
                audit: "off".to_owned(),
            },
            keys,
        }
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml_ng::Error> {
        serde_yaml_ng::to_string(self)
    }
}
