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

//! Provisioning of the Secrets a tenant depends on.
//!
//! Every secret is labelled with the owning tenant and registered on the provisioner's
//! [`Rollback`] as soon as it exists, so a failed request can undo what it changed.

pub mod certificates;
pub mod config_env;
pub mod identity;
pub mod registry;
pub mod rollback;

pub use config_env::ConfigEnv;
pub use rollback::Rollback;

use crate::context::{self, SecretStore};
use crate::types::v2::TENANT_LABEL;
use futures::FutureExt;
use k8s_openapi::ByteString;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use snafu::{OptionExt, Snafu};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

pub const CONFIG_ENV_KEY: &str = "config.env";

pub const SECRET_TYPE_OPAQUE: &str = "Opaque";
pub const SECRET_TYPE_TLS: &str = "kubernetes.io/tls";
pub const SECRET_TYPE_DOCKER_CONFIG: &str = "kubernetes.io/dockerconfigjson";

#[derive(Snafu, Debug)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("{} is not valid base64: {}", what, source))]
    Base64 {
        what: String,
        source: base64::DecodeError,
    },

    #[snafu(display("certificate files must not be empty: {}", what))]
    EmptyCertificate { what: String },

    #[snafu(display("certificate and key for {} do not match: {}", what, source))]
    KeyPair {
        what: String,
        source: crate::utils::tls::Error,
    },

    #[snafu(display("tenant configuration secret has wrong format: {}", secret))]
    ConfigurationFormat { secret: String },

    #[snafu(display("failed to encode registry credentials: {}", source))]
    RegistryCredentials { source: serde_json::Error },

    #[snafu(transparent)]
    Context { source: context::Error },
}

pub fn root_secret_name(tenant: &str) -> String {
    format!("{tenant}-secret")
}

pub fn configuration_secret_name(tenant: &str) -> String {
    format!("{tenant}-env-configuration")
}

/// Creates secrets for one tenant in one namespace and remembers how to remove them.
pub struct SecretProvisioner {
    store: Arc<dyn SecretStore>,
    namespace: String,
    tenant: String,
    rollback: Rollback,
}

impl SecretProvisioner {
    pub fn new(
        store: Arc<dyn SecretStore>,
        namespace: impl Into<String>,
        tenant: impl Into<String>,
    ) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            tenant: tenant.into(),
            rollback: Rollback::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    pub fn store(&self) -> &Arc<dyn SecretStore> {
        &self.store
    }

    /// Number of secret changes a rollback would undo.
    pub fn created(&self) -> usize {
        self.rollback.len()
    }

    /// Keeps everything created so far.
    pub fn commit(&mut self) {
        self.rollback.commit();
    }

    /// Undoes every secret change made through this provisioner, newest first.
    pub async fn rollback(&mut self) {
        self.rollback.run().await;
    }

    /// An immutable secret carrying the tenant label.
    pub fn labeled_secret(
        &self,
        name: &str,
        type_: Option<&str>,
        data: impl IntoIterator<Item = (String, Vec<u8>)>,
    ) -> Secret {
        Secret {
            metadata: metav1::ObjectMeta {
                name: Some(name.to_owned()),
                namespace: Some(self.namespace.clone()),
                labels: Some(BTreeMap::from([(
                    TENANT_LABEL.to_owned(),
                    self.tenant.clone(),
                )])),
                ..Default::default()
            },
            type_: type_.map(str::to_owned),
            immutable: Some(true),
            data: Some(
                data.into_iter()
                    .map(|(key, value)| (key, ByteString(value)))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    async fn create(&mut self, secret: &Secret) -> Result<String, Error> {
        self.create_over(secret, None).await
    }

    /// Creates `secret`. Rolling back deletes it and recreates `previous`, the secret it
    /// replaced, when there was one.
    async fn create_over(
        &mut self,
        secret: &Secret,
        previous: Option<Secret>,
    ) -> Result<String, Error> {
        let name = secret.metadata.name.clone().unwrap_or_default();
        debug!(secret = %name, namespace = %self.namespace, "creating secret");
        if let Err(e) = self.store.create_secret(&self.namespace, secret).await {
            if let Some(previous) = previous {
                if let Err(restore) = self.store.create_secret(&self.namespace, &previous).await {
                    warn!(secret = %name, "failed to restore replaced secret: {}", restore);
                }
            }
            return Err(e.into());
        }

        let store = self.store.clone();
        let namespace = self.namespace.clone();
        let target = name.clone();
        self.rollback.push(format!("secret/{name}"), move || {
            async move {
                store.delete_secret(&namespace, &target).await?;
                if let Some(previous) = previous {
                    store.create_secret(&namespace, &previous).await?;
                }
                Ok::<(), context::Error>(())
            }
            .boxed()
        });

        Ok(name)
    }

    /// Deletes any secret of the same name, then creates `secret`.
    ///
    /// The replaced secret is kept aside and put back if the request is rolled back.
    pub async fn create_or_replace(&mut self, secret: &Secret) -> Result<String, Error> {
        let name = secret.metadata.name.clone().unwrap_or_default();
        let previous = match self.store.get_secret(&self.namespace, &name).await {
            Ok(existing) => Some(restorable(existing)),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e.into()),
        };

        if previous.is_some() {
            match self.store.delete_secret(&self.namespace, &name).await {
                Ok(()) => debug!(secret = %name, "replacing existing secret"),
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e.into()),
            }
        }

        self.create_over(secret, previous).await
    }

    /// Updates an existing secret. Rolling back writes `previous` back over it.
    pub async fn update(&mut self, previous: &Secret, secret: &Secret) -> Result<String, Error> {
        let name = secret.metadata.name.clone().unwrap_or_default();
        self.store.update_secret(&self.namespace, secret).await?;

        let store = self.store.clone();
        let namespace = self.namespace.clone();
        let mut restore = previous.clone();
        restore.metadata.resource_version = None;
        self.rollback.push(format!("secret/{name}"), move || {
            async move { store.update_secret(&namespace, &restore).await.map(|_| ()) }.boxed()
        });

        Ok(name)
    }

    /// Updates the secret in place when it exists, creates it otherwise.
    pub async fn create_or_update(&mut self, secret: &Secret) -> Result<String, Error> {
        let name = secret.metadata.name.clone().unwrap_or_default();
        match self.store.get_secret(&self.namespace, &name).await {
            Ok(existing) => {
                let mut updated = secret.clone();
                updated.metadata.resource_version = existing.metadata.resource_version;
                self.store.update_secret(&self.namespace, &updated).await?;
                Ok(name)
            }
            Err(e) if e.is_not_found() => self.create(secret).await,
            Err(e) => Err(e.into()),
        }
    }

    /// The legacy root credential secret, written with blank keys.
    ///
    /// Real credentials live in the configuration secret; the operator still expects this
    /// one to exist.
    pub async fn root_credentials(&mut self) -> Result<String, Error> {
        let secret = self.labeled_secret(
            &root_secret_name(&self.tenant),
            None,
            [
                ("accesskey".to_owned(), Vec::new()),
                ("secretkey".to_owned(), Vec::new()),
            ],
        );
        self.create_or_replace(&secret).await
    }

    /// The `config.env` secret. Left mutable so later updates can rewrite it in place.
    pub async fn configuration(&mut self, env: &ConfigEnv) -> Result<String, Error> {
        let mut secret = self.labeled_secret(
            &configuration_secret_name(&self.tenant),
            None,
            [(CONFIG_ENV_KEY.to_owned(), env.render().into_bytes())],
        );
        secret.immutable = None;
        self.create_or_replace(&secret).await
    }
}

/// A copy of a stored secret that can be created again.
fn restorable(mut secret: Secret) -> Secret {
    let metadata = &mut secret.metadata;
    metadata.resource_version = None;
    metadata.uid = None;
    metadata.creation_timestamp = None;
    metadata.deletion_timestamp = None;
    metadata.generation = None;
    metadata.managed_fields = None;
    secret
}

/// Parses the `config.env` payload of a tenant configuration secret.
pub fn configuration_env(secret: &Secret) -> Result<ConfigEnv, Error> {
    let content = secret_value(secret, CONFIG_ENV_KEY).context(ConfigurationFormatSnafu {
        secret: secret.metadata.name.clone().unwrap_or_default(),
    })?;
    Ok(ConfigEnv::parse(&content))
}

/// Replaces the `config.env` payload, keeping every other key of the secret.
pub fn set_configuration_env(secret: &mut Secret, env: &ConfigEnv) {
    secret.data.get_or_insert_with(BTreeMap::new).insert(
        CONFIG_ENV_KEY.to_owned(),
        ByteString(env.render().into_bytes()),
    );
}

/// Reads a string value out of a secret's data.
pub fn secret_value(secret: &Secret, key: &str) -> Option<String> {
    secret
        .data
        .as_ref()?
        .get(key)
        .map(|value| String::from_utf8_lossy(&value.0).into_owned())
}
