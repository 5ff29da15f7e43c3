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

//! Read-only view of the certificates attached to a tenant.
//!
//! Certificate data is informational here. A secret that does not hold a readable
//! certificate is left out of the result instead of failing the whole view.

use crate::context::{self, SecretStore};
use crate::models::TenantSecurityResponse;
use crate::models::tenant::SecurityCertificates;
use crate::types::v2::certificate::LocalCertificateReference;
use crate::types::v2::tenant::Tenant;
use crate::utils::tls;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snafu::Snafu;
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, warn};
use x509_cert::Certificate;
use x509_cert::der::Decode;
use x509_cert::ext::pkix::SubjectAltName;
use x509_cert::ext::pkix::name::GeneralName;

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("reading certificates of tenant {} timed out after {:?}", tenant, timeout))]
    Timeout { tenant: String, timeout: Duration },

    #[snafu(transparent)]
    Context { source: context::Error },

    #[snafu(transparent)]
    Types { source: crate::types::error::Error },
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CertificateInfo {
    pub serial_number: String,

    /// Secret the certificate was read from.
    pub name: String,

    /// DNS names followed by IP addresses.
    pub domains: Vec<String>,

    pub expiry: DateTime<Utc>,
}

/// Reads the certificates referenced by `references`.
///
/// A missing secret is an error; undecodable certificate content is skipped.
pub async fn inspect(
    store: &dyn SecretStore,
    namespace: &str,
    references: &[LocalCertificateReference],
) -> Result<Vec<CertificateInfo>, Error> {
    let mut certificates = Vec::with_capacity(references.len());
    for reference in references {
        let secret = store.get_secret(namespace, &reference.name).await?;
        let key = reference.secret_type().certificate_key();

        let Some(content) = secret.data.as_ref().and_then(|data| data.get(key)) else {
            debug!(secret = %reference.name, key, "secret holds no certificate");
            continue;
        };
        let Some(der) = tls::first_certificate(&content.0) else {
            debug!(secret = %reference.name, "certificate is not PEM encoded");
            continue;
        };

        match parse_certificate(&reference.name, der.as_ref()) {
            Ok(info) => certificates.push(info),
            Err(e) => warn!(secret = %reference.name, "failed to parse certificate: {}", e),
        }
    }
    Ok(certificates)
}

/// Extracts display data from a DER encoded certificate.
pub fn parse_certificate(name: &str, der: &[u8]) -> Result<CertificateInfo, x509_cert::der::Error> {
    let certificate = Certificate::from_der(der)?;
    let tbs = &certificate.tbs_certificate;

    let mut dns_names = Vec::new();
    let mut ip_addresses = Vec::new();
    if let Some((_, SubjectAltName(names))) = tbs.get::<SubjectAltName>()? {
        for general_name in names {
            match general_name {
                GeneralName::DnsName(dns) => dns_names.push(dns.to_string()),
                GeneralName::IpAddress(ip) => {
                    if let Some(ip) = ip_address(ip.as_bytes()) {
                        ip_addresses.push(ip.to_string());
                    }
                }
                _ => {}
            }
        }
    }
    dns_names.extend(ip_addresses);

    Ok(CertificateInfo {
        serial_number: serial_number(tbs.serial_number.as_bytes()),
        name: name.to_owned(),
        domains: dns_names,
        expiry: DateTime::<Utc>::from(tbs.validity.not_after.to_system_time()),
    })
}

fn ip_address(bytes: &[u8]) -> Option<IpAddr> {
    match bytes.len() {
        4 => <[u8; 4]>::try_from(bytes).ok().map(IpAddr::from),
        16 => <[u8; 16]>::try_from(bytes).ok().map(IpAddr::from),
        _ => None,
    }
}

/// Big-endian serial bytes in base 10. The DER sign padding is ignored.
fn serial_number(bytes: &[u8]) -> String {
    let mut value: Vec<u8> = bytes.iter().copied().skip_while(|b| *b == 0).collect();
    if value.is_empty() {
        return "0".to_owned();
    }

    let mut digits = Vec::new();
    while !value.is_empty() {
        let mut remainder = 0_u16;
        for byte in &mut value {
            let acc = (remainder << 8) | u16::from(*byte);
            *byte = (acc / 10) as u8;
            remainder = acc % 10;
        }
        digits.push(b'0' + remainder as u8);
        let leading = value.iter().take_while(|b| **b == 0).count();
        value.drain(..leading);
    }

    digits.iter().rev().map(|d| char::from(*d)).collect()
}

/// Server and CA certificates of a tenant, bounded by `timeout`.
pub async fn security(
    store: &dyn SecretStore,
    tenant: &Tenant,
    timeout: Duration,
) -> Result<TenantSecurityResponse, Error> {
    let namespace = tenant.namespace()?;
    let view = async {
        let minio = inspect(store, &namespace, &tenant.spec.external_cert_secret).await?;
        let minio_cas = inspect(store, &namespace, &tenant.spec.external_ca_cert_secret).await?;
        Ok::<_, Error>(SecurityCertificates { minio, minio_cas })
    };

    let custom_certificates = tokio::time::timeout(timeout, view)
        .await
        .map_err(|_| Error::Timeout {
            tenant: tenant.name(),
            timeout,
        })??;

    Ok(TenantSecurityResponse {
        auto_cert: tenant.auto_cert(),
        custom_certificates,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::secrets::SecretProvisioner;
    use crate::tests::{FakeCluster, SAN_CERT_PEM, create_test_tenant, key_pair};
    use crate::types::v2::certificate::CertificateSecretType;
    use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
    use chrono::TimeZone;
    use std::sync::Arc;

    #[test]
    fn test_parse_certificate() {
        let der = tls::first_certificate(SAN_CERT_PEM.as_bytes()).expect("Should decode PEM");
        let info = parse_certificate("server", der.as_ref()).expect("Should parse");

        assert_eq!(info.serial_number, "4660");
        assert_eq!(info.name, "server");
        assert_eq!(
            info.domains,
            vec![
                "minio.default.svc.cluster.local".to_string(),
                "*.test-tenant-hl.default.svc.cluster.local".to_string(),
                "10.0.0.1".to_string(),
            ]
        );
        assert_eq!(
            info.expiry,
            Utc.with_ymd_and_hms(2126, 9, 25, 3, 30, 57).unwrap()
        );
    }

    #[test]
    fn test_serial_number_formats() {
        assert_eq!(serial_number(&[0x12, 0x34]), "4660");
        assert_eq!(serial_number(&[]), "0");
        assert_eq!(serial_number(&[0x00]), "0");
        assert_eq!(
            serial_number(&[0xab; 17]),
            "58416474095415694810088967901698373430187"
        );
    }

    // Test: 20-byte serials with sign padding still print in base 10
    #[test]
    fn test_wide_serial_number() {
        let mut bytes = vec![0x00];
        bytes.extend([
            0x81, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0x01, 0x23, 0x45, 0x67, 0x89, 0xab,
            0xcd, 0xef, 0x01, 0x23, 0x45, 0x67,
        ]);
        assert_eq!(
            serial_number(&bytes),
            "737246381498033249764904308932776363144297792871"
        );
        assert_eq!(serial_number(&bytes[1..]), serial_number(&bytes));
    }

    // Test: unreadable entries are skipped while readable ones are reported
    #[tokio::test]
    async fn test_inspect_skips_bad_certificates() {
        let cluster = Arc::new(FakeCluster::new());
        let mut provisioner = SecretProvisioner::new(cluster.clone(), "default", "test-tenant");

        let mut refs = provisioner
            .key_pairs("server", &[key_pair()])
            .await
            .expect("Should create key pair");
        refs.extend(
            provisioner
                .ca_certificates("ca", &[BASE64.encode("not a certificate")])
                .await
                .expect("Should create CA secret"),
        );
        let bogus_der = "-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n";
        refs.extend(
            provisioner
                .ca_certificates("bogus", &[BASE64.encode(bogus_der)])
                .await
                .expect("Should create CA secret"),
        );

        let infos = inspect(cluster.as_ref(), "default", &refs)
            .await
            .expect("Should inspect");
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].name, "server-0");
    }

    #[tokio::test]
    async fn test_inspect_missing_secret_is_error() {
        let cluster = FakeCluster::new();
        let refs = vec![LocalCertificateReference::new(
            "absent",
            CertificateSecretType::Opaque,
        )];
        assert!(inspect(&cluster, "default", &refs).await.is_err());
    }

    #[tokio::test]
    async fn test_security_view() {
        let cluster = Arc::new(FakeCluster::new());
        let mut provisioner = SecretProvisioner::new(cluster.clone(), "default", "test-tenant");
        let servers = provisioner
            .key_pairs("test-tenant-secret-instance-external-certificates", &[key_pair()])
            .await
            .expect("Should create key pair");
        let cas = provisioner
            .ca_certificates("test-tenant-ca-certificate", &[BASE64.encode(SAN_CERT_PEM)])
            .await
            .expect("Should create CA");

        let mut tenant = create_test_tenant();
        tenant.spec.request_auto_cert = Some(true);
        tenant.spec.external_cert_secret = servers;
        tenant.spec.external_ca_cert_secret = cas;

        let view = security(cluster.as_ref(), &tenant, Duration::from_secs(5))
            .await
            .expect("Should build security view");
        assert!(view.auto_cert);
        assert_eq!(view.custom_certificates.minio.len(), 1);
        assert_eq!(view.custom_certificates.minio_cas.len(), 1);
        assert_eq!(
            view.custom_certificates.minio_cas[0].name,
            "test-tenant-ca-certificate-0"
        );
    }
}
