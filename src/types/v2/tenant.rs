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

use crate::types;
use crate::types::error::NoNamespaceSnafu;
use crate::types::v2::certificate::LocalCertificateReference;
use crate::types::v2::kes::KesConfig;
use crate::types::v2::observability::{ExposeServices, LogConfig, PrometheusConfig};
use crate::types::v2::pool::Pool;
use crate::types::v2::MINIO_PORT;
use k8s_openapi::api::core::v1 as corev1;
use kube::{CustomResource, KubeSchema, ResourceExt};
use serde::{Deserialize, Serialize};
use snafu::OptionExt;

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, KubeSchema, Default, PartialEq)]
#[kube(
    group = "minio.min.io",
    version = "v2",
    kind = "Tenant",
    namespaced,
    status = "crate::types::v2::status::TenantStatus",
    shortname = "tenant",
    plural = "tenants",
    singular = "tenant",
    printcolumn = r#"{"name":"State", "type":"string", "jsonPath":".status.currentState"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#,
    crates(serde_json = "k8s_openapi::serde_json")
)]
#[serde(rename_all = "camelCase")]
pub struct TenantSpec {
    #[serde(default)]
    pub pools: Vec<Pool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_secret: Option<corev1::LocalObjectReference>,

    /// Legacy root credential secret. Real credentials live in `configuration`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creds_secret: Option<corev1::LocalObjectReference>,

    /// Secret carrying `config.env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<corev1::LocalObjectReference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<corev1::EnvVar>,

    /// Console users provisioned for the built-in identity provider.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<corev1::LocalObjectReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_auto_cert: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_cert_secret: Vec<LocalCertificateReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_client_cert_secret: Option<LocalCertificateReference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_client_cert_secrets: Vec<LocalCertificateReference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_ca_cert_secret: Vec<LocalCertificateReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kes: Option<KesConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<LogConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prometheus: Option<PrometheusConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expose_services: Option<ExposeServices>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Features>,
}

#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<TenantDomains>,
}

#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TenantDomains {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub minio: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console: Option<String>,
}

impl Tenant {
    pub fn namespace(&self) -> Result<String, types::error::Error> {
        ResourceExt::namespace(self).context(NoNamespaceSnafu)
    }

    pub fn name(&self) -> String {
        ResourceExt::name_any(self)
    }

    /// Name of the `config.env` secret, if the tenant has one.
    pub fn configuration_secret(&self) -> Option<&str> {
        self.spec
            .configuration
            .as_ref()
            .map(|c| c.name.as_str())
            .filter(|name| !name.is_empty())
    }

    pub fn auto_cert(&self) -> bool {
        self.spec.request_auto_cert.unwrap_or(false)
    }

    /// TLS is active when the operator issues certificates or external ones are attached.
    pub fn tls_enabled(&self) -> bool {
        self.auto_cert() || !self.spec.external_cert_secret.is_empty()
    }

    /// In-cluster S3 endpoint of the tenant.
    pub fn service_url(&self) -> String {
        service_url(
            &ResourceExt::namespace(self).unwrap_or_default(),
            self.tls_enabled(),
        )
    }
}

pub fn service_url(namespace: &str, tls: bool) -> String {
    let (scheme, port) = if tls { ("https", 443) } else { ("http", 80) };
    format!("{scheme}://minio.{namespace}.svc.cluster.local:{port}")
}

/// Port as rendered into the Prometheus port annotation.
pub fn minio_port() -> String {
    MINIO_PORT.to_string()
}
