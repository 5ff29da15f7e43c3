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

use crate::config::Config;
use crate::context::{SecretStore, TenantStore};
use crate::license::{
    Error, LicenseInfo, LicenseValidator, NoLicenseSnafu, OPERATOR_LICENSE_KEY, inject,
    operator_license,
};
use k8s_openapi::ByteString;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use snafu::OptionExt;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Keeps the operator license valid and every tenant carrying it.
pub struct LicenseRefresher {
    secrets: Arc<dyn SecretStore>,
    tenants: Arc<dyn TenantStore>,
    validator: Arc<dyn LicenseValidator>,
    config: Arc<Config>,
}

impl LicenseRefresher {
    pub fn new<C>(cluster: Arc<C>, validator: Arc<dyn LicenseValidator>, config: Arc<Config>) -> Self
    where
        C: SecretStore + TenantStore + 'static,
    {
        Self {
            secrets: cluster.clone(),
            tenants: cluster,
            validator,
            config,
        }
    }

    /// Validates the stored license and distributes it again.
    pub async fn refresh(&self) -> Result<LicenseInfo, Error> {
        let license = operator_license(&*self.secrets, &self.config)
            .await?
            .context(NoLicenseSnafu {
                namespace: self.config.operator_namespace.clone(),
                secret: self.config.license_secret.clone(),
            })?;
        self.install(&license).await
    }

    /// Validates `license`, stores it for the operator and injects it into every tenant,
    /// bounded by the subscription deadline.
    ///
    /// A tenant that cannot be updated is logged and skipped.
    pub async fn install(&self, license: &str) -> Result<LicenseInfo, Error> {
        let timeout = self.config.subscription_timeout;
        tokio::time::timeout(timeout, self.distribute(license))
            .await
            .map_err(|_| Error::Timeout { timeout })?
    }

    async fn distribute(&self, license: &str) -> Result<LicenseInfo, Error> {
        let info = self.validator.validate(license)?;
        self.save(license).await?;

        let tenants = self.tenants.list_tenants(None).await?;
        let mut failed = 0;
        for tenant in &tenants {
            if let Err(e) = inject(&*self.secrets, &*self.tenants, license, tenant).await {
                failed += 1;
                warn!(
                    tenant = %tenant.name(),
                    namespace = ?tenant.metadata.namespace,
                    "failed to inject license: {}",
                    e
                );
            }
        }

        info!(
            tenants = tenants.len(),
            failed,
            plan = %info.plan,
            expires_at = %info.expires_at,
            "license distributed"
        );
        Ok(info)
    }

    /// Stores `license` in the operator license secret, creating it when missing.
    pub async fn save(&self, license: &str) -> Result<(), Error> {
        let namespace = &self.config.operator_namespace;
        let name = &self.config.license_secret;
        let data = BTreeMap::from([(
            OPERATOR_LICENSE_KEY.to_owned(),
            ByteString(license.as_bytes().to_vec()),
        )]);

        match self.secrets.get_secret(namespace, name).await {
            Ok(mut secret) => {
                secret.data = Some(data);
                self.secrets.update_secret(namespace, &secret).await?;
            }
            Err(e) if e.is_not_found() => {
                let secret = Secret {
                    metadata: metav1::ObjectMeta {
                        name: Some(name.clone()),
                        namespace: Some(namespace.clone()),
                        ..Default::default()
                    },
                    data: Some(data),
                    ..Default::default()
                };
                self.secrets.create_secret(namespace, &secret).await?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    /// Refreshes on the configured interval until the task is dropped.
    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.config.license_refresh_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match self.refresh().await {
                Ok(info) => info!(plan = %info.plan, expires_at = %info.expires_at, "license refreshed"),
                Err(e) => error!("license refresh failed: {}", e),
            }
        }
    }
}
