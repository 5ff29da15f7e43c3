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

use crate::models::ImageRegistry;
use crate::secrets::{Error, RegistryCredentialsSnafu, SECRET_TYPE_DOCKER_CONFIG, SecretProvisioner};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::Serialize;
use snafu::ResultExt;
use std::collections::BTreeMap;

pub const DOCKER_CONFIG_KEY: &str = ".dockerconfigjson";

#[derive(Serialize)]
struct DockerConfig<'a> {
    auths: BTreeMap<&'a str, DockerAuth<'a>>,
}

#[derive(Serialize)]
struct DockerAuth<'a> {
    username: &'a str,
    password: &'a str,
    auth: String,
}

pub fn registry_secret_name(tenant: &str) -> String {
    format!("{tenant}-regcred")
}

/// `.dockerconfigjson` payload for a single registry.
pub fn docker_config_json(registry: &ImageRegistry) -> Result<Vec<u8>, Error> {
    let config = DockerConfig {
        auths: BTreeMap::from([(
            registry.registry.as_str(),
            DockerAuth {
                username: &registry.username,
                password: &registry.password,
                auth: BASE64.encode(format!("{}:{}", registry.username, registry.password)),
            },
        )]),
    };
    serde_json::to_vec(&config).context(RegistryCredentialsSnafu)
}

impl SecretProvisioner {
    /// Stores pull credentials as `<tenant>-regcred`, updating an existing secret in place.
    /// Returns `None` when no registry is given.
    pub async fn image_registry(
        &mut self,
        registry: Option<&ImageRegistry>,
    ) -> Result<Option<String>, Error> {
        let Some(registry) = registry.filter(|r| !r.registry.trim().is_empty()) else {
            return Ok(None);
        };

        let mut secret = self.labeled_secret(
            &registry_secret_name(self.tenant()),
            Some(SECRET_TYPE_DOCKER_CONFIG),
            [(DOCKER_CONFIG_KEY.to_owned(), docker_config_json(registry)?)],
        );
        secret.immutable = None;

        self.create_or_update(&secret).await.map(Some)
    }
}
