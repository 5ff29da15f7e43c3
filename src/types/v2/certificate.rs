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

use kube::KubeSchema;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Secret types a certificate reference may point at.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum CertificateSecretType {
    #[strum(to_string = "Opaque")]
    Opaque,

    #[strum(to_string = "kubernetes.io/tls")]
    KubernetesTls,

    #[strum(to_string = "cert-manager.io/v1alpha2")]
    CertManager,
}

impl CertificateSecretType {
    /// Data key holding the public certificate for secrets of this type.
    pub fn certificate_key(&self) -> &'static str {
        match self {
            CertificateSecretType::Opaque => "public.crt",
            CertificateSecretType::KubernetesTls | CertificateSecretType::CertManager => "tls.crt",
        }
    }

    pub fn from_secret_type(type_: &str) -> Self {
        match type_ {
            "kubernetes.io/tls" => CertificateSecretType::KubernetesTls,
            "cert-manager.io/v1alpha2" => CertificateSecretType::CertManager,
            _ => CertificateSecretType::Opaque,
        }
    }
}

/// Reference to a secret holding certificate material in the tenant's namespace.
#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LocalCertificateReference {
    pub name: String,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
}

impl LocalCertificateReference {
    pub fn new(name: impl Into<String>, type_: CertificateSecretType) -> Self {
        Self {
            name: name.into(),
            type_: Some(type_.to_string()),
        }
    }

    pub fn secret_type(&self) -> CertificateSecretType {
        self.type_
            .as_deref()
            .map(CertificateSecretType::from_secret_type)
            .unwrap_or(CertificateSecretType::Opaque)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test: payload key follows the declared secret type
    #[test]
    fn test_certificate_key_by_type() {
        let tls = LocalCertificateReference::new("a", CertificateSecretType::KubernetesTls);
        assert_eq!(tls.secret_type().certificate_key(), "tls.crt");

        let cm = LocalCertificateReference {
            name: "b".to_string(),
            type_: Some("cert-manager.io/v1alpha2".to_string()),
        };
        assert_eq!(cm.secret_type().certificate_key(), "tls.crt");

        let untyped = LocalCertificateReference {
            name: "c".to_string(),
            type_: None,
        };
        assert_eq!(untyped.secret_type().certificate_key(), "public.crt");
    }
}
