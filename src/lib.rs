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

use crate::context::Context;
use crate::types::v2::tenant::Tenant;
use kube::Client;
use kube::CustomResourceExt;
use serde::de::DeserializeOwned;
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing_subscriber::EnvFilter;

pub mod assembler;
pub mod certificate;
pub mod compile;
pub mod config;
pub mod context;
pub mod kes;
pub mod license;
pub mod models;
pub mod secrets;
pub mod types;
pub mod utils;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();
}

/// A context over the client configured by the environment (kubeconfig or in-cluster).
pub async fn connect() -> Result<Arc<Context>, Box<dyn std::error::Error>> {
    let client = Client::try_default().await?;
    Ok(Arc::new(Context::new(client)))
}

/// Reads a request body from a YAML or JSON file.
pub async fn read_request<T: DeserializeOwned>(
    path: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_yaml_ng::from_str(&raw)?)
}

pub async fn crd(file: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer: Pin<Box<dyn AsyncWrite + Send>> = if let Some(file) = file {
        Box::pin(
            tokio::fs::OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(file)
                .await?,
        )
    } else {
        Box::pin(tokio::io::stdout())
    };

    writer
        .write_all(serde_yaml_ng::to_string(&Tenant::crd())?.as_bytes())
        .await?;
    writer.flush().await?;

    Ok(())
}
