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

use clap::{Parser, Subcommand};
use std::sync::Arc;
use tenant_console::assembler::Assembler;
use tenant_console::config::Config;
use tenant_console::context::TenantStore;
use tenant_console::license::{self, JwtLicenseValidator, LicenseRefresher};
use tenant_console::models::tenant::{
    PoolUpdateRequest, UpdateDomainsRequest, UpdateIdentityProviderRequest,
};
use tenant_console::models::{
    Pool, TenantCreateRequest, UpdateTenantRequest, UpdateTenantSecurityRequest,
};
use tenant_console::{connect, crd, init_tracing, read_request};
use tracing::info;

shadow_rs::shadow!(build);

#[derive(Parser)]
#[command(name = "tenant-console")]
#[command(about = "Compiles tenant requests into Tenant resources and keeps them updated", long_about = None)]
#[command(version = build::CLAP_LONG_VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Selects an existing tenant.
#[derive(clap::Args)]
struct TenantArgs {
    #[arg(short, long)]
    namespace: String,

    #[arg(short, long)]
    tenant: String,
}

/// A tenant and the request file to apply to it.
#[derive(clap::Args)]
struct UpdateArgs {
    #[command(flatten)]
    target: TenantArgs,

    /// Request body, YAML or JSON.
    #[arg(short, long)]
    file: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Output CRDs in YAML
    Crd {
        /// Optional output path. If not set, the output will be written to stdout.
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Create a tenant and its secrets from a create request
    Create {
        #[arg(short, long)]
        file: String,
    },

    /// Update image, registry credentials and monitoring annotations
    Update(UpdateArgs),

    /// Replace the pool list
    UpdatePools(UpdateArgs),

    /// Append a pool
    AddPool(UpdateArgs),

    /// Replace custom certificates and toggle auto-cert
    UpdateSecurity(UpdateArgs),

    UpdateDomains(UpdateArgs),

    /// Switch the identity provider
    UpdateIdp(UpdateArgs),

    /// Apply labels, annotations, finalizers and spec from a Tenant manifest
    UpdateYaml(UpdateArgs),

    /// Print the certificates a tenant serves
    Security(TenantArgs),

    /// Subscription license distribution
    License {
        #[command(subcommand)]
        command: LicenseCommands,
    },
}

#[derive(Subcommand)]
enum LicenseCommands {
    /// Write a license into a single tenant
    Inject {
        #[command(flatten)]
        target: TenantArgs,

        /// File holding the license token.
        #[arg(long)]
        license: String,
    },

    /// Validate the operator license and distribute it to every tenant
    Refresh {
        /// PEM public key the license is signed with.
        #[arg(long)]
        public_key: String,

        /// Refresh once and exit instead of on the configured interval.
        #[arg(long)]
        once: bool,
    },
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crd { file } => crd(file).await,
        command => {
            init_tracing();
            run(command).await
        }
    }
}

async fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(Config::from_env());
    let cluster = connect().await?;
    let assembler = Assembler::new(cluster.clone(), config.clone());

    match command {
        Commands::Crd { file } => crd(file).await?,
        Commands::Create { file } => {
            let request: TenantCreateRequest = read_request(&file).await?;
            print_json(&assembler.create(&request).await?)?;
        }
        Commands::Update(args) => {
            let request: UpdateTenantRequest = read_request(&args.file).await?;
            let tenant = assembler
                .update_tenant(&args.target.namespace, &args.target.tenant, &request)
                .await?;
            print_json(&tenant)?;
        }
        Commands::UpdatePools(args) => {
            let request: PoolUpdateRequest = read_request(&args.file).await?;
            let tenant = assembler
                .update_pools(&args.target.namespace, &args.target.tenant, &request)
                .await?;
            print_json(&tenant)?;
        }
        Commands::AddPool(args) => {
            let pool: Pool = read_request(&args.file).await?;
            let tenant = assembler
                .add_pool(&args.target.namespace, &args.target.tenant, &pool)
                .await?;
            print_json(&tenant)?;
        }
        Commands::UpdateSecurity(args) => {
            let request: UpdateTenantSecurityRequest = read_request(&args.file).await?;
            let tenant = assembler
                .update_security(&args.target.namespace, &args.target.tenant, &request)
                .await?;
            print_json(&tenant)?;
        }
        Commands::UpdateDomains(args) => {
            let request: UpdateDomainsRequest = read_request(&args.file).await?;
            let tenant = assembler
                .update_domains(&args.target.namespace, &args.target.tenant, &request)
                .await?;
            print_json(&tenant)?;
        }
        Commands::UpdateIdp(args) => {
            let request: UpdateIdentityProviderRequest = read_request(&args.file).await?;
            let tenant = assembler
                .update_identity_provider(&args.target.namespace, &args.target.tenant, &request)
                .await?;
            print_json(&tenant)?;
        }
        Commands::UpdateYaml(args) => {
            let yaml = tokio::fs::read_to_string(&args.file).await?;
            let tenant = assembler
                .update_from_yaml(&args.target.namespace, &args.target.tenant, &yaml)
                .await?;
            print_json(&tenant)?;
        }
        Commands::Security(target) => {
            let view = assembler.security(&target.namespace, &target.tenant).await?;
            print_json(&view)?;
        }
        Commands::License { command } => match command {
            LicenseCommands::Inject { target, license } => {
                let token = tokio::fs::read_to_string(&license).await?;
                let tenant = cluster.get_tenant(&target.namespace, &target.tenant).await?;
                license::inject_within(
                    &*cluster,
                    &*cluster,
                    token.trim(),
                    &tenant,
                    config.subscription_timeout,
                )
                .await?;
            }
            LicenseCommands::Refresh { public_key, once } => {
                let key = tokio::fs::read(&public_key).await?;
                let validator = Arc::new(JwtLicenseValidator::from_ec_pem(&key)?);
                let refresher = LicenseRefresher::new(cluster, validator, config);
                if once {
                    let info = refresher.refresh().await?;
                    info!(email = %info.email, expires_at = %info.expires_at, "license refreshed");
                } else {
                    refresher.run().await;
                }
            }
        },
    }

    Ok(())
}
