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

use std::time::Duration;

pub const DEFAULT_TENANT_IMAGE: &str = "quay.io/minio/minio:RELEASE.2024-05-10T01-41-38Z";
pub const DEFAULT_KES_IMAGE: &str = "minio/kes:2023-05-02T22-48-10Z";
pub const DEFAULT_OPERATOR_NAMESPACE: &str = "minio-operator";
pub const OPERATOR_LICENSE_SECRET: &str = "operator-subnet-license";

/// Runtime settings, read once at start-up and handed to the components that need them.
#[derive(Debug, Clone)]
pub struct Config {
    /// Image used when a request names none and no newer one can be resolved.
    pub default_image: String,

    pub kes_image: String,

    pub log_search_image: Option<String>,

    pub prometheus_image: Option<String>,

    /// Namespace holding the operator-wide license secret.
    pub operator_namespace: String,

    pub license_secret: String,

    pub license_refresh_interval: Duration,

    pub detail_timeout: Duration,

    /// Deadline for installing or injecting a license.
    pub subscription_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_image: DEFAULT_TENANT_IMAGE.to_owned(),
            kes_image: DEFAULT_KES_IMAGE.to_owned(),
            log_search_image: None,
            prometheus_image: None,
            operator_namespace: DEFAULT_OPERATOR_NAMESPACE.to_owned(),
            license_secret: OPERATOR_LICENSE_SECRET.to_owned(),
            license_refresh_interval: Duration::from_secs(24 * 60 * 60),
            detail_timeout: Duration::from_secs(5),
            subscription_timeout: Duration::from_secs(20),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            default_image: non_empty("TENANT_CONSOLE_DEFAULT_IMAGE")
                .unwrap_or(defaults.default_image),
            kes_image: non_empty("TENANT_CONSOLE_KES_IMAGE").unwrap_or(defaults.kes_image),
            log_search_image: non_empty("TENANT_CONSOLE_LOG_SEARCH_IMAGE"),
            prometheus_image: non_empty("TENANT_CONSOLE_PROMETHEUS_IMAGE"),
            operator_namespace: non_empty("OPERATOR_NAMESPACE")
                .or_else(|| non_empty("TENANT_CONSOLE_NAMESPACE"))
                .unwrap_or(defaults.operator_namespace),
            license_secret: defaults.license_secret,
            license_refresh_interval: non_empty("TENANT_CONSOLE_LICENSE_REFRESH_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.license_refresh_interval),
            ..defaults
        }
    }
}
