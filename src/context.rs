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
use crate::types::v2::tenant::Tenant;
use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{DeleteParams, ListParams, Patch, PatchParams, PostParams};
use kube::{Resource, api::Api};
use serde::Serialize;
use serde::de::DeserializeOwned;
use snafu::Snafu;
use std::fmt::Debug;
use tracing::debug;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("{} '{}' not found", kind, name))]
    NotFound { kind: String, name: String },

    #[snafu(display("Kubernetes API error: {}", source))]
    Kube { source: kube::Error },

    #[snafu(transparent)]
    Types { source: types::error::Error },

    #[snafu(transparent)]
    Serde { source: serde_json::Error },
}

impl Error {
    fn from_kube(kind: &str, name: &str, source: kube::Error) -> Self {
        match source {
            kube::Error::Api(ref response) if response.code == 404 => Error::NotFound {
                kind: kind.to_owned(),
                name: name.to_owned(),
            },
            source => Error::Kube { source },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// Secret operations the tenant console needs, scoped by namespace.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, Error>;

    async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<Secret, Error>;

    async fn update_secret(&self, namespace: &str, secret: &Secret) -> Result<Secret, Error>;

    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<(), Error>;
}

/// Tenant custom resource operations.
#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn get_tenant(&self, namespace: &str, name: &str) -> Result<Tenant, Error>;

    async fn create_tenant(&self, namespace: &str, tenant: &Tenant) -> Result<Tenant, Error>;

    /// Applies an RFC 7396 JSON merge patch.
    async fn patch_tenant(
        &self,
        namespace: &str,
        name: &str,
        patch: &serde_json::Value,
    ) -> Result<Tenant, Error>;

    /// Full replace, subject to resource-version conflicts.
    async fn update_tenant(&self, namespace: &str, tenant: &Tenant) -> Result<Tenant, Error>;

    /// Tenants in `namespace`, or in every namespace when `None`.
    async fn list_tenants(&self, namespace: Option<&str>) -> Result<Vec<Tenant>, Error>;
}

#[derive(Clone)]
pub struct Context {
    pub(crate) client: kube::Client,
}

impl Context {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }

    pub async fn get<T>(&self, name: &str, namespace: &str) -> Result<T, Error>
    where
        T: Clone + DeserializeOwned + Debug + Resource<Scope = NamespaceResourceScope>,
        <T as kube::Resource>::DynamicType: Default,
    {
        let api: Api<T> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .map_err(|source| Error::from_kube(&T::kind(&Default::default()), name, source))
    }

    pub async fn create<T>(&self, resource: &T, namespace: &str) -> Result<T, Error>
    where
        T: Clone + Serialize + DeserializeOwned + Debug + Resource<Scope = NamespaceResourceScope>,
        <T as kube::Resource>::DynamicType: Default,
    {
        let api: Api<T> = Api::namespaced(self.client.clone(), namespace);
        let name = resource.meta().name.clone().unwrap_or_default();
        api.create(&PostParams::default(), resource)
            .await
            .map_err(|source| Error::from_kube(&T::kind(&Default::default()), &name, source))
    }

    pub async fn replace<T>(&self, resource: &T, namespace: &str) -> Result<T, Error>
    where
        T: Clone + Serialize + DeserializeOwned + Debug + Resource<Scope = NamespaceResourceScope>,
        <T as kube::Resource>::DynamicType: Default,
    {
        let api: Api<T> = Api::namespaced(self.client.clone(), namespace);
        let name = resource.meta().name.clone().unwrap_or_default();
        api.replace(&name, &PostParams::default(), resource)
            .await
            .map_err(|source| Error::from_kube(&T::kind(&Default::default()), &name, source))
    }

    pub async fn patch_merge<T, P>(&self, name: &str, namespace: &str, patch: &P) -> Result<T, Error>
    where
        T: Clone + DeserializeOwned + Debug + Resource<Scope = NamespaceResourceScope>,
        <T as kube::Resource>::DynamicType: Default,
        P: Serialize + Debug,
    {
        let api: Api<T> = Api::namespaced(self.client.clone(), namespace);
        api.patch(name, &PatchParams::default(), &Patch::Merge(patch))
            .await
            .map_err(|source| Error::from_kube(&T::kind(&Default::default()), name, source))
    }

    pub async fn delete<T>(&self, name: &str, namespace: &str) -> Result<(), Error>
    where
        T: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        <T as kube::Resource>::DynamicType: Default,
    {
        let api: Api<T> = Api::namespaced(self.client.clone(), namespace);
        api.delete(name, &DeleteParams::default())
            .await
            .map_err(|source| Error::from_kube(&T::kind(&Default::default()), name, source))?;
        Ok(())
    }
}

#[async_trait]
impl SecretStore for Context {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, Error> {
        self.get(name, namespace).await
    }

    async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<Secret, Error> {
        debug!(secret = ?secret.metadata.name, %namespace, "creating secret");
        self.create(secret, namespace).await
    }

    async fn update_secret(&self, namespace: &str, secret: &Secret) -> Result<Secret, Error> {
        self.replace(secret, namespace).await
    }

    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<(), Error> {
        self.delete::<Secret>(name, namespace).await
    }
}

#[async_trait]
impl TenantStore for Context {
    async fn get_tenant(&self, namespace: &str, name: &str) -> Result<Tenant, Error> {
        self.get(name, namespace).await
    }

    async fn create_tenant(&self, namespace: &str, tenant: &Tenant) -> Result<Tenant, Error> {
        self.create(tenant, namespace).await
    }

    async fn patch_tenant(
        &self,
        namespace: &str,
        name: &str,
        patch: &serde_json::Value,
    ) -> Result<Tenant, Error> {
        self.patch_merge(name, namespace, patch).await
    }

    async fn update_tenant(&self, namespace: &str, tenant: &Tenant) -> Result<Tenant, Error> {
        self.replace(tenant, namespace).await
    }

    async fn list_tenants(&self, namespace: Option<&str>) -> Result<Vec<Tenant>, Error> {
        let api: Api<Tenant> = match namespace {
            Some(namespace) => Api::namespaced(self.client.clone(), namespace),
            None => Api::all(self.client.clone()),
        };
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|source| Error::Kube { source })?;
        Ok(list.items)
    }
}
