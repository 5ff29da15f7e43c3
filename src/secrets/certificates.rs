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

use crate::models::KeyPairConfiguration;
use crate::secrets::{
    Base64Snafu, EmptyCertificateSnafu, Error, KeyPairSnafu, SECRET_TYPE_OPAQUE, SECRET_TYPE_TLS,
    SecretProvisioner,
};
use crate::types::v2::certificate::{CertificateSecretType, LocalCertificateReference};
use crate::utils::tls;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use snafu::{ResultExt, ensure};

pub const TLS_CERT_KEY: &str = "tls.crt";
pub const TLS_PRIVATE_KEY: &str = "tls.key";
pub const PUBLIC_CERT_KEY: &str = "public.crt";

pub fn decode(what: &str, value: &str) -> Result<Vec<u8>, Error> {
    BASE64
        .decode(value.trim())
        .context(Base64Snafu { what })
}

/// Decodes a base64 key pair and checks that the key belongs to the certificate.
pub fn decode_key_pair(
    what: &str,
    pair: &KeyPairConfiguration,
) -> Result<(Vec<u8>, Vec<u8>), Error> {
    ensure!(
        !pair.crt.trim().is_empty() && !pair.key.trim().is_empty(),
        EmptyCertificateSnafu { what }
    );

    let crt = decode(what, &pair.crt)?;
    let key = decode(what, &pair.key)?;
    tls::verify_key_pair(&crt, &key).context(KeyPairSnafu { what })?;

    Ok((crt, key))
}

impl SecretProvisioner {
    /// One `kubernetes.io/tls` secret per pair, named `<prefix>-<index>`.
    pub async fn key_pairs(
        &mut self,
        prefix: &str,
        pairs: &[KeyPairConfiguration],
    ) -> Result<Vec<LocalCertificateReference>, Error> {
        let mut references = Vec::with_capacity(pairs.len());
        for (i, pair) in pairs.iter().enumerate() {
            let name = format!("{prefix}-{i}");
            let (crt, key) = decode_key_pair(&name, pair)?;
            let secret = self.labeled_secret(
                &name,
                Some(SECRET_TYPE_TLS),
                [
                    (TLS_CERT_KEY.to_owned(), crt),
                    (TLS_PRIVATE_KEY.to_owned(), key),
                ],
            );
            self.create_or_replace(&secret).await?;
            references.push(LocalCertificateReference::new(
                name,
                CertificateSecretType::KubernetesTls,
            ));
        }
        Ok(references)
    }

    /// One Opaque secret per CA certificate, named `<prefix>-<index>`. Empty entries are skipped.
    pub async fn ca_certificates(
        &mut self,
        prefix: &str,
        certificates: &[String],
    ) -> Result<Vec<LocalCertificateReference>, Error> {
        let mut references = Vec::with_capacity(certificates.len());
        for (i, certificate) in certificates.iter().enumerate() {
            let name = format!("{prefix}-{i}");
            let content = decode(&name, certificate)?;
            if content.is_empty() {
                continue;
            }

            let secret = self.labeled_secret(
                &name,
                Some(SECRET_TYPE_OPAQUE),
                [(PUBLIC_CERT_KEY.to_owned(), content)],
            );
            self.create_or_replace(&secret).await?;
            references.push(LocalCertificateReference::new(
                name,
                CertificateSecretType::Opaque,
            ));
        }
        Ok(references)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::secrets::secret_value;
    use crate::tests::{FakeCluster, RSA_KEY_PEM, SAN_CERT_PEM, SAN_KEY_PEM, key_pair};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_key_pairs_are_tls_secrets() {
        let cluster = Arc::new(FakeCluster::new());
        let mut provisioner = SecretProvisioner::new(cluster.clone(), "default", "test-tenant");

        let refs = provisioner
            .key_pairs("test-tenant-secret-instance-external-certificates", &[key_pair()])
            .await
            .expect("Should create key pair secrets");

        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "test-tenant-secret-instance-external-certificates-0");
        assert_eq!(refs[0].type_.as_deref(), Some("kubernetes.io/tls"));

        let secret = cluster.secret("default", &refs[0].name).expect("Should be stored");
        assert_eq!(secret.type_.as_deref(), Some(SECRET_TYPE_TLS));
        assert_eq!(secret_value(&secret, TLS_CERT_KEY).as_deref(), Some(SAN_CERT_PEM));
        assert_eq!(secret_value(&secret, TLS_PRIVATE_KEY).as_deref(), Some(SAN_KEY_PEM));
    }

    // Test: empty, undecodable and mismatched pairs are rejected before anything is created
    #[tokio::test]
    async fn test_invalid_key_pairs_rejected() {
        let cluster = Arc::new(FakeCluster::new());
        let mut provisioner = SecretProvisioner::new(cluster.clone(), "default", "test-tenant");

        let empty = KeyPairConfiguration::default();
        assert!(matches!(
            provisioner.key_pairs("p", &[empty]).await,
            Err(Error::EmptyCertificate { .. })
        ));

        let garbage = KeyPairConfiguration {
            crt: "%%%".to_string(),
            key: "%%%".to_string(),
        };
        assert!(matches!(
            provisioner.key_pairs("p", &[garbage]).await,
            Err(Error::Base64 { .. })
        ));

        let mismatched = KeyPairConfiguration {
            crt: BASE64.encode(SAN_CERT_PEM),
            key: BASE64.encode(RSA_KEY_PEM),
        };
        assert!(matches!(
            provisioner.key_pairs("p", &[mismatched]).await,
            Err(Error::KeyPair { .. })
        ));

        assert!(cluster.secret_names("default").is_empty());
    }

    #[tokio::test]
    async fn test_ca_certificates() {
        let cluster = Arc::new(FakeCluster::new());
        let mut provisioner = SecretProvisioner::new(cluster.clone(), "default", "test-tenant");

        let refs = provisioner
            .ca_certificates(
                "test-tenant-ca-certificate",
                &[BASE64.encode(SAN_CERT_PEM), String::new()],
            )
            .await
            .expect("Should create CA secrets");

        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "test-tenant-ca-certificate-0");
        let secret = cluster.secret("default", &refs[0].name).expect("Should be stored");
        assert_eq!(secret.type_.as_deref(), Some(SECRET_TYPE_OPAQUE));
        assert!(secret_value(&secret, PUBLIC_CERT_KEY).is_some());
    }
}
