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

use async_trait::async_trait;
use snafu::Snafu;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("no tenant image could be resolved"))]
    Unresolved,
}

/// Looks up the newest tenant image. Callers treat failures as non-fatal.
#[async_trait]
pub trait ImageResolver: Send + Sync {
    async fn latest_image(&self) -> Result<String, Error>;
}

/// Resolves to the image configured for this deployment.
#[derive(Debug, Clone)]
pub struct ConfiguredImage {
    image: Option<String>,
}

impl ConfiguredImage {
    pub fn new(image: impl Into<String>) -> Self {
        let image = image.into();
        Self {
            image: (!image.trim().is_empty()).then_some(image),
        }
    }
}

#[async_trait]
impl ImageResolver for ConfiguredImage {
    async fn latest_image(&self) -> Result<String, Error> {
        self.image.clone().ok_or(Error::Unresolved)
    }
}
