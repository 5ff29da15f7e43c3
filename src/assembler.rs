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

//! Turns tenant requests into `Tenant` resources and merge patches.
//!
//! Every operation validates its input before touching the cluster. Secrets created on
//! the way are tracked by a [`SecretProvisioner`] and removed again if a later step
//! fails.

mod create;
pub mod patch;
mod security;
mod update;

use crate::config::Config;
use crate::context::{self, SecretStore, TenantStore};
use crate::models::TenantSecurityResponse;
use crate::secrets::{self, SecretProvisioner};
use crate::types::v2::tenant::{Tenant, minio_port};
use crate::types::v2::{
    PROMETHEUS_METRICS_PATH, PROMETHEUS_PATH_ANNOTATION, PROMETHEUS_PORT_ANNOTATION,
    PROMETHEUS_SCRAPE_ANNOTATION,
};
use crate::utils::credentials::{CredentialGenerator, RandomCredentials};
use crate::utils::image::{ConfiguredImage, ImageResolver};
use crate::{certificate, compile, kes, license, types};
use snafu::{ResultExt, Snafu};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Snafu, Debug)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("erasure coding parity must be between 2 and 8, got {}", parity))]
    InvalidErasureCodingParity { parity: i32 },

    #[snafu(display("encryption requires TLS, enable auto certificates or provide server certificates"))]
    EncryptionRequiresTls,

    #[snafu(display("tenant {} already exists in namespace {}", name, namespace))]
    TenantExists { namespace: String, name: String },

    #[snafu(display("tenant YAML is not valid: {}", source))]
    TenantYaml { source: serde_yaml_ng::Error },

    #[snafu(display("failed to compute tenant patch: {}", source))]
    Patch { source: serde_json::Error },

    #[snafu(transparent)]
    Compile { source: compile::Error },

    #[snafu(transparent)]
    Secrets { source: secrets::Error },

    #[snafu(transparent)]
    Kes { source: kes::Error },

    #[snafu(transparent)]
    Certificate { source: certificate::Error },

    #[snafu(transparent)]
    License { source: license::Error },

    #[snafu(transparent)]
    Context { source: context::Error },

    #[snafu(transparent)]
    Types { source: types::error::Error },
}

/// Builds and submits tenant resources against a cluster.
pub struct Assembler {
    secrets: Arc<dyn SecretStore>,
    tenants: Arc<dyn TenantStore>,
    config: Arc<Config>,
    credentials: Arc<dyn CredentialGenerator>,
    images: Arc<dyn ImageResolver>,
}

impl Assembler {
    pub fn new<C>(cluster: Arc<C>, config: Arc<Config>) -> Self
    where
        C: SecretStore + TenantStore + 'static,
    {
        let images = Arc::new(ConfiguredImage::new(config.default_image.clone()));
        Self {
            secrets: cluster.clone(),
            tenants: cluster,
            config,
            credentials: Arc::new(RandomCredentials),
            images,
        }
    }

    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialGenerator>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_image_resolver(mut self, images: Arc<dyn ImageResolver>) -> Self {
        self.images = images;
        self
    }

    fn provisioner(&self, namespace: &str, tenant: &str) -> SecretProvisioner {
        SecretProvisioner::new(self.secrets.clone(), namespace, tenant)
    }

    /// The latest known tenant image, or `None` when it cannot be resolved.
    async fn latest_image(&self) -> Option<String> {
        match self.images.latest_image().await {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("failed to resolve latest tenant image: {}", e);
                None
            }
        }
    }

    async fn fetch(&self, namespace: &str, name: &str) -> Result<Tenant, Error> {
        Ok(self.tenants.get_tenant(namespace, name).await?)
    }

    /// Sends the merge patch turning `original` into `updated`.
    ///
    /// Nothing is sent when the owned fields are unchanged.
    async fn submit(&self, original: &Tenant, updated: &Tenant) -> Result<Tenant, Error> {
        let namespace = original.namespace()?;
        let name = original.name();

        let Some(body) = patch::tenant_patch(original, updated).context(PatchSnafu)? else {
            debug!(tenant = %name, %namespace, "tenant unchanged, skipping patch");
            return Ok(original.clone());
        };

        let patched = self.tenants.patch_tenant(&namespace, &name, &body).await?;
        info!(tenant = %name, %namespace, "tenant patched");
        Ok(patched)
    }

    /// Certificates attached to a tenant, bounded by the detail read deadline.
    pub async fn security(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<TenantSecurityResponse, Error> {
        let tenant = self.fetch(namespace, name).await?;
        Ok(certificate::security(&*self.secrets, &tenant, self.config.detail_timeout).await?)
    }
}

/// Keeps the secrets `provisioner` created when `result` is Ok and removes them otherwise.
async fn settle<T>(
    provisioner: &mut SecretProvisioner,
    result: Result<T, Error>,
) -> Result<T, Error> {
    match result {
        Ok(value) => {
            provisioner.commit();
            Ok(value)
        }
        Err(e) => {
            if provisioner.created() > 0 {
                warn!(
                    tenant = %provisioner.tenant(),
                    namespace = %provisioner.namespace(),
                    created = provisioner.created(),
                    "removing secrets created for failed request: {}",
                    e
                );
            }
            provisioner.rollback().await;
            Err(e)
        }
    }
}

fn prometheus_annotations() -> [(&'static str, String); 3] {
    [
        (PROMETHEUS_PATH_ANNOTATION, PROMETHEUS_METRICS_PATH.to_owned()),
        (PROMETHEUS_PORT_ANNOTATION, minio_port()),
        (PROMETHEUS_SCRAPE_ANNOTATION, "true".to_owned()),
    ]
}

fn toggle_annotations(annotations: &mut BTreeMap<String, String>, enabled: bool) {
    for (key, value) in prometheus_annotations() {
        if enabled {
            annotations.insert(key.to_owned(), value);
        } else {
            annotations.remove(key);
        }
    }
}

/// Adds or removes the Prometheus scrape annotations on the tenant and on every pool's
/// volume claim template. Other annotations are left alone.
pub fn set_prometheus_annotations(tenant: &mut Tenant, enabled: bool) {
    if enabled {
        toggle_annotations(
            tenant.metadata.annotations.get_or_insert_with(BTreeMap::new),
            true,
        );
        for pool in &mut tenant.spec.pools {
            toggle_annotations(pool.volume_annotations_mut(), true);
        }
    } else {
        if let Some(annotations) = tenant.metadata.annotations.as_mut() {
            toggle_annotations(annotations, false);
        }
        for pool in &mut tenant.spec.pools {
            if let Some(annotations) = pool.volume_claim_template.metadata.annotations.as_mut() {
                toggle_annotations(annotations, false);
            }
        }
    }
}
