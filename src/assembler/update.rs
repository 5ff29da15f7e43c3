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

use super::create::{compile_pools, free_pool_name, non_empty, tenant_domains};
use super::{Assembler, Error, TenantYamlSnafu, set_prometheus_annotations, settle};
use crate::compile::compile_pool;
use crate::models::tenant::{PoolUpdateRequest, UpdateDomainsRequest, UpdateIdentityProviderRequest};
use crate::models::{IdentityProvider, Pool, UpdateTenantRequest};
use crate::secrets::identity::{IDENTITY_PREFIX, identity_environment};
use crate::secrets::{ConfigEnv, SecretProvisioner, configuration_env, set_configuration_env};
use crate::types::v2::tenant::Tenant;
use k8s_openapi::api::core::v1 as corev1;
use snafu::ResultExt;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Drops every identity setting and applies `idp_env` in its place.
fn replace_identity(env: &mut ConfigEnv, idp_env: &ConfigEnv) {
    env.retain(|key, _| !key.starts_with(IDENTITY_PREFIX));
    env.extend(idp_env.iter());
}

fn replace_identity_vars(vars: &mut Vec<corev1::EnvVar>, idp_env: &ConfigEnv) {
    vars.retain(|var| !var.name.starts_with(IDENTITY_PREFIX));
    vars.extend(idp_env.iter().map(|(name, value)| corev1::EnvVar {
        name: name.to_owned(),
        value: Some(value.to_owned()),
        ..Default::default()
    }));
}

/// First `pool-<index>` name not taken by an existing pool.
fn next_pool_name(tenant: &Tenant) -> String {
    let taken: BTreeSet<String> = tenant.spec.pools.iter().map(|p| p.name.clone()).collect();
    free_pool_name(&taken, tenant.spec.pools.len())
}

impl Assembler {
    /// Image, pull secret and Prometheus annotations.
    ///
    /// Without an explicit image the latest known one is used. When that cannot be
    /// resolved the current image stays.
    pub async fn update_tenant(
        &self,
        namespace: &str,
        name: &str,
        request: &UpdateTenantRequest,
    ) -> Result<Tenant, Error> {
        let original = self.fetch(namespace, name).await?;
        let mut tenant = original.clone();

        match non_empty(request.image.as_ref()) {
            Some(image) => tenant.spec.image = Some(image),
            None => {
                if let Some(image) = self.latest_image().await {
                    tenant.spec.image = Some(image);
                }
            }
        }
        set_prometheus_annotations(&mut tenant, request.enable_prometheus);

        let mut provisioner = self.provisioner(namespace, name);
        let result = self
            .apply_pull_secret(&mut provisioner, request, &original, tenant)
            .await;
        settle(&mut provisioner, result).await
    }

    async fn apply_pull_secret(
        &self,
        provisioner: &mut SecretProvisioner,
        request: &UpdateTenantRequest,
        original: &Tenant,
        mut tenant: Tenant,
    ) -> Result<Tenant, Error> {
        let pull_secret = match non_empty(request.image_pull_secret.as_ref()) {
            Some(secret) => Some(secret),
            None => {
                provisioner
                    .image_registry(request.image_registry.as_ref())
                    .await?
            }
        };
        if let Some(name) = pull_secret {
            tenant.spec.image_pull_secret = Some(corev1::LocalObjectReference { name });
        }

        self.submit(original, &tenant).await
    }

    /// Replaces the pool list wholesale. Pools are reordered or removed as a whole, never
    /// merged field by field.
    pub async fn update_pools(
        &self,
        namespace: &str,
        name: &str,
        request: &PoolUpdateRequest,
    ) -> Result<Tenant, Error> {
        let pools = compile_pools(&request.pools)?;

        let original = self.fetch(namespace, name).await?;
        let mut tenant = original.clone();
        tenant.spec.pools = pools;

        let updated = self.submit(&original, &tenant).await?;
        info!(tenant = %name, %namespace, pools = updated.spec.pools.len(), "pools replaced");
        Ok(updated)
    }

    /// Appends one pool, naming it after its position when the request leaves it unnamed.
    pub async fn add_pool(&self, namespace: &str, name: &str, pool: &Pool) -> Result<Tenant, Error> {
        let mut compiled = compile_pool(pool)?;

        let original = self.fetch(namespace, name).await?;
        if compiled.name.is_empty() {
            compiled.name = next_pool_name(&original);
        }
        let mut tenant = original.clone();
        tenant.spec.pools.push(compiled);

        self.submit(&original, &tenant).await
    }

    pub async fn update_domains(
        &self,
        namespace: &str,
        name: &str,
        request: &UpdateDomainsRequest,
    ) -> Result<Tenant, Error> {
        let original = self.fetch(namespace, name).await?;
        let mut tenant = original.clone();

        let domains = tenant_domains(&request.domains).domains;
        tenant.spec.features.get_or_insert_with(Default::default).domains = domains;

        self.submit(&original, &tenant).await
    }

    /// Takes labels, annotations, finalizers and the spec from a full `Tenant` document.
    /// Everything else in the document, status included, is ignored.
    pub async fn update_from_yaml(
        &self,
        namespace: &str,
        name: &str,
        yaml: &str,
    ) -> Result<Tenant, Error> {
        let incoming: Tenant = serde_yaml_ng::from_str(yaml).context(TenantYamlSnafu)?;

        let original = self.fetch(namespace, name).await?;
        let mut tenant = original.clone();
        tenant.metadata.labels = incoming.metadata.labels;
        tenant.metadata.annotations = incoming.metadata.annotations;
        tenant.metadata.finalizers = incoming.metadata.finalizers;
        tenant.spec = incoming.spec;

        self.submit(&original, &tenant).await
    }

    /// Switches the tenant to another identity provider.
    ///
    /// Identity settings are rewritten in `config.env` when the tenant has a configuration
    /// secret and in the container environment otherwise. User secrets are provisioned
    /// again and the ones no longer referenced are deleted after the patch. A failed patch
    /// puts the previous user secrets and configuration back.
    pub async fn update_identity_provider(
        &self,
        namespace: &str,
        name: &str,
        request: &UpdateIdentityProviderRequest,
    ) -> Result<Tenant, Error> {
        let original = self.fetch(namespace, name).await?;

        let mut provisioner = self.provisioner(namespace, name);
        let result = self
            .apply_identity_provider(&mut provisioner, &original, &request.idp)
            .await;
        let updated = settle(&mut provisioner, result).await?;

        let current: BTreeSet<&str> = updated.spec.users.iter().map(|u| u.name.as_str()).collect();
        for stale in original
            .spec
            .users
            .iter()
            .filter(|user| !current.contains(user.name.as_str()))
        {
            if let Err(e) = self.secrets.delete_secret(namespace, &stale.name).await {
                warn!(secret = %stale.name, tenant = %name, "failed to delete user secret: {}", e);
            }
        }

        info!(tenant = %name, %namespace, external = request.idp.is_external(), "identity provider updated");
        Ok(updated)
    }

    async fn apply_identity_provider(
        &self,
        provisioner: &mut SecretProvisioner,
        original: &Tenant,
        idp: &IdentityProvider,
    ) -> Result<Tenant, Error> {
        let namespace = original.namespace()?;
        let idp_env = identity_environment(idp);
        let mut tenant = original.clone();

        tenant.spec.users = provisioner.identity_users(idp).await?;

        match original.configuration_secret() {
            Some(secret_name) => {
                let current = self.secrets.get_secret(&namespace, secret_name).await?;
                let mut env = configuration_env(&current)?;
                replace_identity(&mut env, &idp_env);
                let mut secret = current.clone();
                set_configuration_env(&mut secret, &env);
                provisioner.update(&current, &secret).await?;
            }
            None => replace_identity_vars(&mut tenant.spec.env, &idp_env),
        }

        self.submit(original, &tenant).await
    }
}
