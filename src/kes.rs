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

//! KES (Key Encryption Service) configuration for tenants with server-side encryption.

pub mod server_config;

use crate::compile;
use crate::compile::security_context::compile_security_context;
use crate::models::EncryptionConfiguration;
use crate::models::encryption::KmsConfiguration;
use crate::secrets::certificates::decode;
use crate::secrets::{self, SecretProvisioner};
use crate::types::v2::certificate::LocalCertificateReference;
use crate::types::v2::kes::KesConfig;
use crate::utils::tls;
use k8s_openapi::api::core::v1 as corev1;
use server_config::{
    AppRole, Aws, AwsCredentials, AwsSecretsManager, Azure, AzureCredentials, AzureKeyVault,
    CLIENT_CA_PATH, CLIENT_CERT_PATH, CLIENT_KEY_PATH, ClientTls, Gcp, GcpCredentials,
    GcpSecretManager, Gemalto, GemaltoCredentials, GemaltoKeySecure, Keys, OPERATOR_IDENTITY,
    ServerConfig, Vault, VaultStatus,
};
use sha2::{Digest, Sha256};
use snafu::{OptionExt, ResultExt, Snafu};
use std::collections::BTreeMap;
use tracing::info;
use x509_cert::Certificate;
use x509_cert::der::{Decode, Encode};

pub const SERVER_CONFIG_KEY: &str = "server-config.yaml";

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("approle credentials missing for kes"))]
    MissingAppRole,

    #[snafu(display("kes client certificate is not a PEM certificate"))]
    NoClientCertificate,

    #[snafu(display("failed to read kes client certificate: {}", source))]
    ClientCertificate { source: x509_cert::der::Error },

    #[snafu(display("failed to render kes configuration: {}", source))]
    Render { source: serde_yaml_ng::Error },

    #[snafu(transparent)]
    Secrets { source: secrets::Error },

    #[snafu(transparent)]
    Compile { source: compile::Error },
}

/// Hex SHA-256 of the certificate's SubjectPublicKeyInfo, the identity KES authorizes.
pub fn client_identity(certificate_pem: &[u8]) -> Result<String, Error> {
    let der = tls::first_certificate(certificate_pem).context(NoClientCertificateSnafu)?;
    let certificate = Certificate::from_der(der.as_ref()).context(ClientCertificateSnafu)?;
    let spki = certificate
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .context(ClientCertificateSnafu)?;

    Ok(Sha256::digest(&spki)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect())
}

/// Renders the KMS section, collecting any mTLS files KES needs mounted.
fn kms_keys(
    kms: &KmsConfiguration,
    client_files: &mut BTreeMap<String, Vec<u8>>,
) -> Result<Keys, Error> {
    let mut keys = Keys::default();
    match kms {
        KmsConfiguration::Vault(vault) => {
            let approle = vault.approle.as_ref().context(MissingAppRoleSnafu)?;

            let tls = match &vault.tls {
                Some(tls) => {
                    let mut paths = ClientTls::default();
                    if let Some(crt) = tls.crt.as_deref().filter(|v| !v.is_empty()) {
                        client_files.insert("client.crt".to_owned(), decode("vault.tls.crt", crt)?);
                        paths.cert = Some(CLIENT_CERT_PATH.to_owned());
                    }
                    if let Some(key) = tls.key.as_deref().filter(|v| !v.is_empty()) {
                        client_files.insert("client.key".to_owned(), decode("vault.tls.key", key)?);
                        paths.key = Some(CLIENT_KEY_PATH.to_owned());
                    }
                    if let Some(ca) = tls.ca.as_deref().filter(|v| !v.is_empty()) {
                        client_files.insert("ca.crt".to_owned(), decode("vault.tls.ca", ca)?);
                        paths.ca = Some(CLIENT_CA_PATH.to_owned());
                    }
                    Some(paths)
                }
                None => None,
            };

            keys.vault = Some(Vault {
                endpoint: vault.endpoint.clone(),
                engine: vault.engine.clone(),
                namespace: vault.namespace.clone(),
                prefix: vault.prefix.clone(),
                approle: AppRole::new(
                    approle.engine.clone(),
                    approle.id.clone(),
                    approle.secret.clone(),
                ),
                tls,
                status: VaultStatus {
                    ping: "10s".to_owned(),
                },
            });
        }
        KmsConfiguration::Aws(aws) => {
            let sm = &aws.secretsmanager;
            keys.aws = Some(Aws {
                secretsmanager: AwsSecretsManager {
                    endpoint: sm.endpoint.clone(),
                    region: sm.region.clone(),
                    kmskey: sm.kmskey.clone(),
                    credentials: sm.credentials.as_ref().map(|c| AwsCredentials {
                        accesskey: c.accesskey.clone(),
                        secretkey: c.secretkey.clone(),
                        token: c.token.clone(),
                    }),
                },
            });
        }
        KmsConfiguration::Gemalto(gemalto) => {
            let ks = &gemalto.keysecure;
            let tls = match ks.ca.as_deref().filter(|v| !v.is_empty()) {
                Some(ca) => {
                    client_files.insert("ca.crt".to_owned(), decode("gemalto.ca", ca)?);
                    Some(ClientTls {
                        ca: Some(CLIENT_CA_PATH.to_owned()),
                        ..Default::default()
                    })
                }
                None => None,
            };

            keys.gemalto = Some(Gemalto {
                keysecure: GemaltoKeySecure {
                    endpoint: ks.endpoint.clone(),
                    credentials: ks
                        .credentials
                        .as_ref()
                        .map(|c| GemaltoCredentials::new(c.token.clone(), c.domain.clone())),
                    tls,
                },
            });
        }
        KmsConfiguration::Gcp(gcp) => {
            let sm = &gcp.secretmanager;
            keys.gcp = Some(Gcp {
                secretmanager: GcpSecretManager {
                    project_id: sm.project_id.clone(),
                    endpoint: sm.endpoint.clone(),
                    credentials: sm.credentials.as_ref().map(|c| GcpCredentials {
                        client_email: c.client_email.clone(),
                        client_id: c.client_id.clone(),
                        private_key_id: c.private_key_id.clone(),
                        private_key: c.private_key.clone(),
                    }),
                },
            });
        }
        KmsConfiguration::Azure(azure) => {
            let kv = &azure.keyvault;
            keys.azure = Some(Azure {
                keyvault: AzureKeyVault {
                    endpoint: kv.endpoint.clone(),
                    credentials: kv.credentials.as_ref().map(|c| AzureCredentials {
                        tenant_id: c.tenant_id.clone(),
                        client_id: c.client_id.clone(),
                        client_secret: c.client_secret.clone(),
                    }),
                },
            });
        }
    }
    Ok(keys)
}

/// Builds the server configuration and the files KES mounts to reach the KMS.
pub fn server_config(
    encryption: &EncryptionConfiguration,
) -> Result<(ServerConfig, BTreeMap<String, Vec<u8>>), Error> {
    // without a client pair the operator issues one and injects its identity
    let identity = match &encryption.client {
        Some(client) => client_identity(&decode("encryption.client.crt", &client.crt)?)?,
        None => OPERATOR_IDENTITY.to_owned(),
    };

    let mut client_files = BTreeMap::new();
    let keys = kms_keys(&encryption.kms, &mut client_files)?;
    Ok((ServerConfig::new(identity, keys), client_files))
}

/// Provisions the KES secrets under `secret_prefix` and returns the tenant's KES section.
pub async fn build(
    provisioner: &mut SecretProvisioner,
    encryption: &EncryptionConfiguration,
    secret_prefix: &str,
    default_image: &str,
) -> Result<KesConfig, Error> {
    // render first so a bad configuration creates nothing
    let (config, client_files) = server_config(encryption)?;
    let yaml = config.to_yaml().context(RenderSnafu)?;
    let security_context = encryption
        .security_context
        .as_ref()
        .map(compile_security_context)
        .transpose()?;

    let external_cert_secret = match &encryption.server {
        Some(server) => provisioner
            .key_pairs(
                &format!("{secret_prefix}-kes-external-cert"),
                std::slice::from_ref(server),
            )
            .await?
            .into_iter()
            .next(),
        None => None,
    };

    let client_cert_secret = if client_files.is_empty() {
        None
    } else {
        let name = format!("{secret_prefix}-kes-client-cert");
        let secret = provisioner.labeled_secret(&name, None, client_files);
        provisioner.create_or_replace(&secret).await?;
        Some(LocalCertificateReference {
            name,
            type_: None,
        })
    };

    let config_name = format!("{secret_prefix}-kes-configuration");
    let secret = provisioner.labeled_secret(
        &config_name,
        None,
        [(SERVER_CONFIG_KEY.to_owned(), yaml.into_bytes())],
    );
    provisioner.create_or_replace(&secret).await?;
    info!(secret = %config_name, "kes configuration stored");

    Ok(KesConfig {
        image: Some(
            encryption
                .image
                .clone()
                .filter(|image| !image.trim().is_empty())
                .unwrap_or_else(|| default_image.to_owned()),
        ),
        replicas: encryption.replicas.filter(|r| *r > 0).unwrap_or(1),
        kes_secret: corev1::LocalObjectReference { name: config_name },
        external_cert_secret,
        client_cert_secret,
        labels: encryption.labels.clone(),
        annotations: encryption.annotations.clone(),
        node_selector: encryption.node_selector.clone(),
        security_context,
    })
}
