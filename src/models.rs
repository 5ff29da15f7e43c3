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

//! Request and response shapes exchanged with the console API layer.
//!
//! These arrive already structurally validated; only cross-field semantics are checked
//! by the assembler.

pub mod encryption;
pub mod identity;
pub mod pool;
pub mod tenant;

pub use encryption::EncryptionConfiguration;
pub use identity::IdentityProvider;
pub use pool::Pool;
pub use tenant::{
    CreateTenantResponse, TenantCreateRequest, TenantSecurityResponse, UpdateTenantRequest,
    UpdateTenantSecurityRequest,
};

use serde::{Deserialize, Serialize};

/// A base64 encoded PEM certificate and private key.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct KeyPairConfiguration {
    pub crt: String,
    pub key: String,
}

/// Pod security context with ids carried as strings, as the UI submits them.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SecurityContext {
    pub run_as_user: String,

    pub run_as_group: String,

    #[serde(default)]
    pub run_as_non_root: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fs_group: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentVariable {
    pub key: String,
    pub value: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImageRegistry {
    pub registry: String,
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DomainsConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub minio: Vec<String>,
}
