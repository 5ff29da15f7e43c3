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

//! Subscription license distribution to tenants.
//!
//! A tenant with a configuration secret gets the license written into `config.env`,
//! which needs no restart. Otherwise it lands in the container environment and the
//! resulting update rolls the tenant's pods.

pub mod refresh;
pub mod validator;

pub use refresh::LicenseRefresher;
pub use validator::{JwtLicenseValidator, LicenseInfo, LicenseValidator};

use crate::config::Config;
use crate::context::{self, SecretStore, TenantStore};
use crate::secrets::{self, configuration_env, secret_value, set_configuration_env};
use crate::types::{self, v2::tenant::Tenant};
use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1 as corev1;
use snafu::Snafu;
use std::time::Duration;
use tracing::info;

/// Variable the tenant reads its license from.
pub const LICENSE_ENV: &str = "MINIO_SUBNET_LICENSE";

/// Key of the license in the operator-wide license secret.
pub const OPERATOR_LICENSE_KEY: &str = "CONSOLE_SUBNET_LICENSE";

/// Left behind by older parsers and not used by tenants.
const LEGACY_CREDENTIAL_KEYS: [&str; 2] = ["accesskey", "secretkey"];

#[derive(Snafu, Debug)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("no license found in secret {}/{}", namespace, secret))]
    NoLicense { namespace: String, secret: String },

    #[snafu(display("invalid license verification key: {}", source))]
    InvalidKey { source: jsonwebtoken::errors::Error },

    #[snafu(display("invalid license: {}", source))]
    InvalidToken { source: jsonwebtoken::errors::Error },

    #[snafu(display("license expiry is out of range"))]
    InvalidExpiry,

    #[snafu(display("license expired at {}", expires_at))]
    Expired { expires_at: DateTime<Utc> },

    #[snafu(display("license operation timed out after {:?}", timeout))]
    Timeout { timeout: Duration },

    #[snafu(transparent)]
    Secrets { source: secrets::Error },

    #[snafu(transparent)]
    Context { source: context::Error },

    #[snafu(transparent)]
    Types { source: types::error::Error },
}

/// The license stored for the operator, `None` when no license secret exists.
pub async fn operator_license(
    store: &dyn SecretStore,
    config: &Config,
) -> Result<Option<String>, Error> {
    let secret = match store
        .get_secret(&config.operator_namespace, &config.license_secret)
        .await
    {
        Ok(secret) => secret,
        Err(e) if e.is_not_found() => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    match secret_value(&secret, OPERATOR_LICENSE_KEY).filter(|v| !v.trim().is_empty()) {
        Some(license) => Ok(Some(license.trim().to_owned())),
        None => NoLicenseSnafu {
            namespace: config.operator_namespace.clone(),
            secret: config.license_secret.clone(),
        }
        .fail(),
    }
}

/// Overrides the license variable in place, or appends it.
fn set_license_var(vars: &mut Vec<corev1::EnvVar>, license: &str) {
    match vars.iter_mut().find(|var| var.name == LICENSE_ENV) {
        Some(var) => {
            var.value = Some(license.to_owned());
            var.value_from = None;
        }
        None => vars.push(corev1::EnvVar {
            name: LICENSE_ENV.to_owned(),
            value: Some(license.to_owned()),
            ..Default::default()
        }),
    }
}

/// Writes `license` into `tenant`. Injecting the same license twice leaves the same result.
pub async fn inject(
    secrets: &dyn SecretStore,
    tenants: &dyn TenantStore,
    license: &str,
    tenant: &Tenant,
) -> Result<(), Error> {
    let namespace = tenant.namespace()?;
    let name = tenant.name();

    match tenant.configuration_secret() {
        Some(secret_name) => {
            let mut secret = secrets.get_secret(&namespace, secret_name).await?;
            let mut env = configuration_env(&secret)?;
            env.set(LICENSE_ENV, license);
            for key in LEGACY_CREDENTIAL_KEYS {
                env.remove(key);
            }
            set_configuration_env(&mut secret, &env);
            secrets.update_secret(&namespace, &secret).await?;
            info!(tenant = %name, %namespace, secret = %secret_name, "license written to tenant configuration");
        }
        None => {
            let mut updated = tenant.clone();
            set_license_var(&mut updated.spec.env, license);
            tenants.update_tenant(&namespace, &updated).await?;
            info!(tenant = %name, %namespace, "license set in tenant environment");
        }
    }
    Ok(())
}

/// [`inject`] bounded by `timeout`.
pub async fn inject_within(
    secrets: &dyn SecretStore,
    tenants: &dyn TenantStore,
    license: &str,
    tenant: &Tenant,
    timeout: Duration,
) -> Result<(), Error> {
    tokio::time::timeout(timeout, inject(secrets, tenants, license, tenant))
        .await
        .map_err(|_| Error::Timeout { timeout })?
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::secrets::{CONFIG_ENV_KEY, ConfigEnv};
    use crate::tests::{FakeCluster, create_test_tenant};
    use async_trait::async_trait;
    use k8s_openapi::api::core::v1::Secret;
    use std::sync::Arc;

    /// A secret store whose calls never complete.
    struct Stalled;

    #[async_trait]
    impl SecretStore for Stalled {
        async fn get_secret(&self, _: &str, _: &str) -> Result<Secret, context::Error> {
            std::future::pending().await
        }

        async fn create_secret(&self, _: &str, _: &Secret) -> Result<Secret, context::Error> {
            std::future::pending().await
        }

        async fn update_secret(&self, _: &str, _: &Secret) -> Result<Secret, context::Error> {
            std::future::pending().await
        }

        async fn delete_secret(&self, _: &str, _: &str) -> Result<(), context::Error> {
            std::future::pending().await
        }
    }

    fn tenant_with_configuration(cluster: &FakeCluster, config_env: &str) -> Tenant {
        let mut tenant = create_test_tenant();
        tenant.spec.configuration = Some(corev1::LocalObjectReference {
            name: "test-tenant-env-configuration".to_string(),
        });
        cluster.insert_tenant(&tenant);
        cluster.insert_secret(
            "default",
            "test-tenant-env-configuration",
            &[(CONFIG_ENV_KEY, config_env)],
        );
        tenant
    }

    fn stored_env(cluster: &FakeCluster) -> ConfigEnv {
        let secret = cluster
            .secret("default", "test-tenant-env-configuration")
            .expect("Should store configuration");
        ConfigEnv::parse(&secret_value(&secret, CONFIG_ENV_KEY).unwrap())
    }

    // Test: only the license key is added to an existing configuration
    #[tokio::test]
    async fn test_inject_adds_exactly_license() {
        let cluster = Arc::new(FakeCluster::new());
        let tenant = tenant_with_configuration(
            &cluster,
            "export MINIO_ROOT_USER=\"root\"\nexport MINIO_BROWSER=\"on\"\n",
        );
        let before = stored_env(&cluster);

        inject(&*cluster, &*cluster, "jwt-license", &tenant)
            .await
            .expect("Should inject");

        let mut expected = before.clone();
        expected.set(LICENSE_ENV, "jwt-license");
        assert_eq!(stored_env(&cluster), expected);
        assert_eq!(stored_env(&cluster).len(), before.len() + 1);
    }

    // Test: injecting twice gives the same config.env
    #[tokio::test]
    async fn test_inject_is_idempotent() {
        let cluster = Arc::new(FakeCluster::new());
        let tenant = tenant_with_configuration(
            &cluster,
            "export MINIO_ROOT_USER=\"root\"\nexport accesskey=\"\"\n",
        );

        inject(&*cluster, &*cluster, "jwt-license", &tenant)
            .await
            .expect("Should inject");
        let first = stored_env(&cluster);
        inject(&*cluster, &*cluster, "jwt-license", &tenant)
            .await
            .expect("Should inject again");

        assert_eq!(stored_env(&cluster), first);
        assert!(!first.contains_key("accesskey"));
    }

    // Test: a configuration secret without config.env is an error
    #[tokio::test]
    async fn test_inject_wrong_format() {
        let cluster = Arc::new(FakeCluster::new());
        let mut tenant = create_test_tenant();
        tenant.spec.configuration = Some(corev1::LocalObjectReference {
            name: "broken".to_string(),
        });
        cluster.insert_tenant(&tenant);
        cluster.insert_secret("default", "broken", &[("other", "x")]);

        let err = inject(&*cluster, &*cluster, "jwt-license", &tenant)
            .await
            .expect_err("Should reject");
        assert!(err.to_string().contains("tenant configuration secret has wrong format"));
    }

    // Test: without a configuration secret the license is overridden or appended in spec.env
    #[tokio::test]
    async fn test_inject_into_env() {
        let cluster = Arc::new(FakeCluster::new());
        let mut tenant = create_test_tenant();
        tenant.spec.env = vec![corev1::EnvVar {
            name: "MINIO_DOMAIN".to_string(),
            value: Some("example.com".to_string()),
            ..Default::default()
        }];
        cluster.insert_tenant(&tenant);

        inject(&*cluster, &*cluster, "first", &tenant)
            .await
            .expect("Should append");
        let stored = cluster.tenant("default", "test-tenant").unwrap();
        inject(&*cluster, &*cluster, "second", &stored)
            .await
            .expect("Should override");

        let env = cluster.tenant("default", "test-tenant").unwrap().spec.env;
        assert_eq!(env.len(), 2);
        assert_eq!(env[1].name, LICENSE_ENV);
        assert_eq!(env[1].value.as_deref(), Some("second"));
    }

    // Test: an injection that does not finish in time reports the deadline
    #[tokio::test]
    async fn test_inject_within_deadline() {
        let cluster = Arc::new(FakeCluster::new());
        let tenant = tenant_with_configuration(&cluster, "");
        let timeout = Duration::from_millis(20);

        let result = inject_within(&Stalled, &*cluster, "LICENSE", &tenant, timeout).await;
        assert!(matches!(result, Err(Error::Timeout { timeout: t }) if t == timeout));

        inject_within(&*cluster, &*cluster, "LICENSE", &tenant, timeout)
            .await
            .expect("Should inject in time");
        assert_eq!(stored_env(&cluster).get(LICENSE_ENV), Some("LICENSE"));
    }

    #[tokio::test]
    async fn test_operator_license() {
        let cluster = Arc::new(FakeCluster::new());
        let config = Config::default();
        assert_eq!(
            operator_license(&*cluster, &config).await.expect("Should read"),
            None
        );

        cluster.insert_secret(
            "minio-operator",
            "operator-subnet-license",
            &[(OPERATOR_LICENSE_KEY, "token\n")],
        );
        assert_eq!(
            operator_license(&*cluster, &config).await.expect("Should read"),
            Some("token".to_string())
        );

        cluster.insert_secret("minio-operator", "operator-subnet-license", &[]);
        assert!(matches!(
            operator_license(&*cluster, &config).await,
            Err(Error::NoLicense { .. })
        ));
    }
}
