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

use serde::{Deserialize, Serialize};

/// The identity provider a tenant authenticates console users against.
///
/// Exactly one variant can be expressed, so a request can never carry conflicting providers.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum IdentityProvider {
    ActiveDirectory(ActiveDirectoryConfiguration),
    Oidc(OidcConfiguration),
    /// Built-in access/secret key pairs.
    Keys(Vec<BuiltinKey>),
}

impl IdentityProvider {
    pub fn is_external(&self) -> bool {
        !matches!(self, IdentityProvider::Keys(_))
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ActiveDirectoryConfiguration {
    pub url: String,

    #[serde(default)]
    pub skip_tls_verification: bool,

    #[serde(default)]
    pub server_insecure: bool,

    #[serde(default)]
    pub server_start_tls: bool,

    #[serde(default)]
    pub lookup_bind_dn: String,

    #[serde(default)]
    pub lookup_bind_password: String,

    #[serde(default)]
    pub user_dn_search_base_dn: String,

    #[serde(default)]
    pub user_dn_search_filter: String,

    #[serde(default)]
    pub group_search_base_dn: String,

    #[serde(default)]
    pub group_search_filter: String,

    /// Directory users granted console access.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_dns: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OidcConfiguration {
    pub configuration_url: String,

    pub client_id: String,

    pub secret_id: String,

    #[serde(default)]
    pub claim_name: String,

    #[serde(default)]
    pub redirect_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BuiltinKey {
    pub access_key: String,
    pub secret_key: String,
}
