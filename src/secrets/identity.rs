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

use crate::models::IdentityProvider;
use crate::models::identity::BuiltinKey;
use crate::secrets::{ConfigEnv, Error, SecretProvisioner};
use k8s_openapi::api::core::v1 as corev1;

pub const CONSOLE_ACCESS_KEY: &str = "CONSOLE_ACCESS_KEY";
pub const CONSOLE_SECRET_KEY: &str = "CONSOLE_SECRET_KEY";

/// Every configuration key owned by an identity provider starts with this prefix.
pub const IDENTITY_PREFIX: &str = "MINIO_IDENTITY_";

const DEFAULT_OIDC_SCOPES: &str = "openid,profile,email";

pub fn user_secret_name(tenant: &str, index: usize) -> String {
    format!("{tenant}-user-{index}")
}

impl SecretProvisioner {
    /// Console users for the built-in identity provider.
    pub async fn builtin_users(
        &mut self,
        keys: &[BuiltinKey],
    ) -> Result<Vec<corev1::LocalObjectReference>, Error> {
        let mut users = Vec::with_capacity(keys.len());
        for (i, key) in keys.iter().enumerate() {
            let name = user_secret_name(self.tenant(), i);
            let secret = self.labeled_secret(
                &name,
                None,
                [
                    (CONSOLE_ACCESS_KEY.to_owned(), key.access_key.clone().into_bytes()),
                    (CONSOLE_SECRET_KEY.to_owned(), key.secret_key.clone().into_bytes()),
                ],
            );
            self.create_or_replace(&secret).await?;
            users.push(corev1::LocalObjectReference { name });
        }
        Ok(users)
    }

    /// Directory users granted console access. They authenticate against the directory,
    /// so only the access key is stored.
    pub async fn directory_users(
        &mut self,
        user_dns: &[String],
    ) -> Result<Vec<corev1::LocalObjectReference>, Error> {
        let mut users = Vec::with_capacity(user_dns.len());
        for (i, dn) in user_dns.iter().enumerate() {
            let name = user_secret_name(self.tenant(), i);
            let secret = self.labeled_secret(
                &name,
                None,
                [(CONSOLE_ACCESS_KEY.to_owned(), dn.clone().into_bytes())],
            );
            self.create_or_replace(&secret).await?;
            users.push(corev1::LocalObjectReference { name });
        }
        Ok(users)
    }

    /// User secrets for `idp`. OIDC users are managed by the provider itself.
    pub async fn identity_users(
        &mut self,
        idp: &IdentityProvider,
    ) -> Result<Vec<corev1::LocalObjectReference>, Error> {
        match idp {
            IdentityProvider::ActiveDirectory(ad) => self.directory_users(&ad.user_dns).await,
            IdentityProvider::Oidc(_) => Ok(Vec::new()),
            IdentityProvider::Keys(keys) => self.builtin_users(keys).await,
        }
    }
}

/// `MINIO_IDENTITY_*` settings for an external provider. Built-in keys produce none.
pub fn identity_environment(idp: &IdentityProvider) -> ConfigEnv {
    let mut env = ConfigEnv::new();
    let on = |flag: bool| flag.then_some("on");

    match idp {
        IdentityProvider::ActiveDirectory(ad) => {
            env.set("MINIO_IDENTITY_LDAP_SERVER_ADDR", ad.url.as_str());
            if let Some(v) = on(ad.skip_tls_verification) {
                env.set("MINIO_IDENTITY_LDAP_TLS_SKIP_VERIFY", v);
            }
            if let Some(v) = on(ad.server_insecure) {
                env.set("MINIO_IDENTITY_LDAP_SERVER_INSECURE", v);
            }
            if let Some(v) = on(ad.server_start_tls) {
                env.set("MINIO_IDENTITY_LDAP_SERVER_STARTTLS", v);
            }
            env.set("MINIO_IDENTITY_LDAP_LOOKUP_BIND_DN", ad.lookup_bind_dn.as_str());
            env.set(
                "MINIO_IDENTITY_LDAP_LOOKUP_BIND_PASSWORD",
                ad.lookup_bind_password.as_str(),
            );
            env.set(
                "MINIO_IDENTITY_LDAP_USER_DN_SEARCH_BASE_DN",
                ad.user_dn_search_base_dn.as_str(),
            );
            env.set(
                "MINIO_IDENTITY_LDAP_USER_DN_SEARCH_FILTER",
                ad.user_dn_search_filter.as_str(),
            );
            env.set(
                "MINIO_IDENTITY_LDAP_GROUP_SEARCH_BASE_DN",
                ad.group_search_base_dn.as_str(),
            );
            env.set(
                "MINIO_IDENTITY_LDAP_GROUP_SEARCH_FILTER",
                ad.group_search_filter.as_str(),
            );
        }
        IdentityProvider::Oidc(oidc) => {
            env.set("MINIO_IDENTITY_OPENID_CONFIG_URL", oidc.configuration_url.as_str());
            env.set("MINIO_IDENTITY_OPENID_CLIENT_ID", oidc.client_id.as_str());
            env.set("MINIO_IDENTITY_OPENID_CLIENT_SECRET", oidc.secret_id.as_str());
            env.set("MINIO_IDENTITY_OPENID_CLAIM_NAME", oidc.claim_name.as_str());
            env.set("MINIO_IDENTITY_OPENID_REDIRECT_URI", oidc.redirect_url.as_str());
            let scopes = oidc
                .scopes
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(DEFAULT_OIDC_SCOPES);
            env.set("MINIO_IDENTITY_OPENID_SCOPES", scopes);
        }
        IdentityProvider::Keys(_) => {}
    }

    env
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::identity::{ActiveDirectoryConfiguration, OidcConfiguration};
    use crate::secrets::secret_value;
    use crate::tests::FakeCluster;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_builtin_users() {
        let cluster = Arc::new(FakeCluster::new());
        let mut provisioner = SecretProvisioner::new(cluster.clone(), "default", "test-tenant");

        let users = provisioner
            .identity_users(&IdentityProvider::Keys(vec![BuiltinKey {
                access_key: "console".to_string(),
                secret_key: "console123".to_string(),
            }]))
            .await
            .expect("Should create user secrets");

        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "test-tenant-user-0");
        let secret = cluster.secret("default", "test-tenant-user-0").expect("Should be stored");
        assert_eq!(secret_value(&secret, CONSOLE_ACCESS_KEY).as_deref(), Some("console"));
        assert_eq!(secret_value(&secret, CONSOLE_SECRET_KEY).as_deref(), Some("console123"));
    }

    // Test: directory users carry only the access key
    #[tokio::test]
    async fn test_directory_users() {
        let cluster = Arc::new(FakeCluster::new());
        let mut provisioner = SecretProvisioner::new(cluster.clone(), "default", "test-tenant");

        let idp = IdentityProvider::ActiveDirectory(ActiveDirectoryConfiguration {
            url: "ldap.example.com:636".to_string(),
            user_dns: vec!["cn=admin,dc=example,dc=com".to_string()],
            ..Default::default()
        });
        provisioner.identity_users(&idp).await.expect("Should create user secrets");

        let secret = cluster.secret("default", "test-tenant-user-0").expect("Should be stored");
        assert_eq!(
            secret_value(&secret, CONSOLE_ACCESS_KEY).as_deref(),
            Some("cn=admin,dc=example,dc=com")
        );
        assert!(secret_value(&secret, CONSOLE_SECRET_KEY).is_none());
    }

    #[test]
    fn test_oidc_environment_defaults_scopes() {
        let env = identity_environment(&IdentityProvider::Oidc(OidcConfiguration {
            configuration_url: "https://idp/.well-known/openid-configuration".to_string(),
            client_id: "minio".to_string(),
            secret_id: "secret".to_string(),
            ..Default::default()
        }));

        assert_eq!(env.get("MINIO_IDENTITY_OPENID_SCOPES"), Some("openid,profile,email"));
        assert_eq!(env.get("MINIO_IDENTITY_OPENID_CLIENT_ID"), Some("minio"));
        assert!(env.iter().all(|(key, _)| key.starts_with(IDENTITY_PREFIX)));
    }

    #[test]
    fn test_ldap_flags_only_when_set() {
        let env = identity_environment(&IdentityProvider::ActiveDirectory(
            ActiveDirectoryConfiguration {
                url: "ldap:636".to_string(),
                server_start_tls: true,
                ..Default::default()
            },
        ));

        assert_eq!(env.get("MINIO_IDENTITY_LDAP_SERVER_STARTTLS"), Some("on"));
        assert!(!env.contains_key("MINIO_IDENTITY_LDAP_TLS_SKIP_VERIFY"));
        assert!(identity_environment(&IdentityProvider::Keys(vec![])).is_empty());
    }
}
