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

use super::{
    Assembler, EncryptionRequiresTlsSnafu, Error, InvalidErasureCodingParitySnafu,
    TenantExistsSnafu, settle, toggle_annotations,
};
use crate::compile::quantity::binary_si;
use crate::compile::security_context::compile_security_context;
use crate::compile::{self, compile_pool};
use crate::config::Config;
use crate::kes;
use crate::license::{self, LICENSE_ENV};
use crate::models::tenant::{
    LogSearchConfiguration, PrometheusConfiguration, TenantCredentials,
};
use crate::models::{
    CreateTenantResponse, DomainsConfiguration, IdentityProvider, Pool, TenantCreateRequest,
};
use crate::secrets::certificates::{decode, decode_key_pair};
use crate::secrets::{ConfigEnv, SecretProvisioner, identity, root_secret_name};
use crate::types::v2;
use crate::types::v2::observability::{
    AuditConfig, ExposeServices, LogConfig, LogDbConfig, PrometheusConfig,
};
use crate::types::v2::tenant::{Features, Tenant, TenantDomains, TenantSpec};
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use snafu::ensure;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

pub(super) const DEFAULT_MOUNT_PATH: &str = "/export";

const GIB: i64 = 1 << 30;
const DEFAULT_LOG_SEARCH_SIZE_GIB: i32 = 5;
const MAX_AUDIT_CAPACITY_GIB: i32 = 10;
const DEFAULT_PROMETHEUS_SIZE_GIB: i32 = 5;

pub(super) fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}

fn non_empty_map(map: &BTreeMap<String, String>) -> Option<BTreeMap<String, String>> {
    (!map.is_empty()).then(|| map.clone())
}

/// First `pool-<n>` with `n >= from` that is not in `taken`.
pub(super) fn free_pool_name(taken: &BTreeSet<String>, from: usize) -> String {
    (from..)
        .map(|i| format!("pool-{i}"))
        .find(|name| !taken.contains(name))
        .unwrap_or_default()
}

/// Compiles request pools, naming unnamed ones after their position unless that name is
/// already used by another pool in the request.
pub(super) fn compile_pools(pools: &[Pool]) -> Result<Vec<v2::pool::Pool>, compile::Error> {
    let mut compiled = pools
        .iter()
        .map(compile_pool)
        .collect::<Result<Vec<_>, _>>()?;

    let mut taken: BTreeSet<String> = compiled
        .iter()
        .filter(|pool| !pool.name.is_empty())
        .map(|pool| pool.name.clone())
        .collect();
    for (i, pool) in compiled.iter_mut().enumerate() {
        if pool.name.is_empty() {
            pool.name = free_pool_name(&taken, i);
            taken.insert(pool.name.clone());
        }
    }
    Ok(compiled)
}

pub(super) fn tenant_domains(domains: &DomainsConfiguration) -> Features {
    Features {
        domains: Some(TenantDomains {
            minio: domains.minio.clone(),
            console: non_empty(domains.console.as_ref()),
        }),
    }
}

fn storage_claim(
    name: String,
    size_gib: i32,
    storage_class: Option<String>,
) -> corev1::PersistentVolumeClaim {
    corev1::PersistentVolumeClaim {
        metadata: metav1::ObjectMeta {
            name: Some(name),
            ..Default::default()
        },
        spec: Some(corev1::PersistentVolumeClaimSpec {
            access_modes: Some(vec!["ReadWriteOnce".to_owned()]),
            resources: Some(corev1::VolumeResourceRequirements {
                requests: Some(BTreeMap::from([(
                    "storage".to_owned(),
                    binary_si(i64::from(size_gib) * GIB),
                )])),
                ..Default::default()
            }),
            storage_class_name: storage_class,
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Log search database sized in GiB. The audit table is capped below the disk size so
/// trimming can keep up.
fn log_config(
    tenant: &str,
    request: &LogSearchConfiguration,
    config: &Config,
) -> Result<LogConfig, compile::Error> {
    let size = request
        .storage_size
        .filter(|size| *size > 0)
        .unwrap_or(DEFAULT_LOG_SEARCH_SIZE_GIB);

    Ok(LogConfig {
        image: non_empty(request.image.as_ref()).or_else(|| config.log_search_image.clone()),
        audit: Some(AuditConfig {
            disk_capacity_gb: size.min(MAX_AUDIT_CAPACITY_GIB),
        }),
        db: Some(LogDbConfig {
            image: non_empty(request.postgres_image.as_ref()),
            init_image: non_empty(request.postgres_init_image.as_ref()),
            volume_claim_template: storage_claim(
                format!("{tenant}-log"),
                size,
                non_empty(request.storage_class.as_ref()),
            ),
            security_context: request
                .postgres_security_context
                .as_ref()
                .map(compile_security_context)
                .transpose()?,
        }),
        security_context: request
            .security_context
            .as_ref()
            .map(compile_security_context)
            .transpose()?,
    })
}

fn prometheus_config(
    request: &PrometheusConfiguration,
    config: &Config,
) -> Result<PrometheusConfig, compile::Error> {
    Ok(PrometheusConfig {
        image: non_empty(request.image.as_ref()).or_else(|| config.prometheus_image.clone()),
        sidecar_image: non_empty(request.sidecar_image.as_ref()),
        init_image: non_empty(request.init_image.as_ref()),
        disk_capacity_gb: request
            .storage_size
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_PROMETHEUS_SIZE_GIB),
        storage_class_name: non_empty(request.storage_class.as_ref()),
        security_context: request
            .security_context
            .as_ref()
            .map(compile_security_context)
            .transpose()?,
    })
}

/// Everything derived from a create request before the cluster is touched.
struct Plan {
    pools: Vec<v2::pool::Pool>,
    log: Option<LogConfig>,
    prometheus: Option<PrometheusConfig>,
}

impl Assembler {
    /// Cross-field checks and every conversion that can fail on bad input.
    fn plan(&self, request: &TenantCreateRequest) -> Result<Plan, Error> {
        if let Some(parity) = request.erasure_coding_parity.filter(|p| *p != 0) {
            ensure!(
                (2..=8).contains(&parity),
                InvalidErasureCodingParitySnafu { parity }
            );
        }

        let tls = request.tls.as_ref();
        let tls_active = request.enable_tls.unwrap_or(false)
            || tls.is_some_and(|tls| !tls.minio.is_empty());
        ensure!(
            request.encryption.is_none() || tls_active,
            EncryptionRequiresTlsSnafu
        );

        let pools = compile_pools(&request.pools)?;

        if let Some(tls) = tls {
            for (i, pair) in tls.minio.iter().chain(&tls.minio_client).enumerate() {
                decode_key_pair(&format!("tls certificate {i}"), pair)?;
            }
            for (i, ca) in tls.ca_certificates.iter().enumerate() {
                decode(&format!("ca certificate {i}"), ca)?;
            }
        }
        if let Some(encryption) = &request.encryption {
            for pair in encryption.server.iter().chain(&encryption.client) {
                decode_key_pair("encryption certificate", pair)?;
            }
            kes::server_config(encryption)?;
        }

        let log = request
            .log_search_configuration
            .as_ref()
            .map(|log| log_config(&request.name, log, &self.config))
            .transpose()?;
        let prometheus = request
            .prometheus_configuration
            .as_ref()
            .map(|prometheus| prometheus_config(prometheus, &self.config))
            .transpose()?;

        Ok(Plan {
            pools,
            log,
            prometheus,
        })
    }

    /// Creates the secrets and the `Tenant` described by `request`.
    ///
    /// Input errors are reported before any API call and an existing tenant of the same
    /// name before any secret is written. Secrets created before a later failure are
    /// deleted again.
    pub async fn create(
        &self,
        request: &TenantCreateRequest,
    ) -> Result<CreateTenantResponse, Error> {
        let plan = self.plan(request)?;

        match self.tenants.get_tenant(&request.namespace, &request.name).await {
            Ok(_) => {
                return TenantExistsSnafu {
                    namespace: request.namespace.clone(),
                    name: request.name.clone(),
                }
                .fail();
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into()),
        }

        let image = match non_empty(request.image.as_ref()) {
            Some(image) => image,
            None => self
                .latest_image()
                .await
                .unwrap_or_else(|| self.config.default_image.clone()),
        };

        let mut provisioner = self.provisioner(&request.namespace, &request.name);
        let result = self.provision(&mut provisioner, request, plan, image).await;
        settle(&mut provisioner, result).await
    }

    async fn provision(
        &self,
        provisioner: &mut SecretProvisioner,
        request: &TenantCreateRequest,
        plan: Plan,
        image: String,
    ) -> Result<CreateTenantResponse, Error> {
        let name = request.name.as_str();
        let namespace = request.namespace.as_str();
        let root_secret = root_secret_name(name);

        let creds_secret = provisioner.root_credentials().await?;

        let mut env = ConfigEnv::new();
        let browser = if request.enable_console == Some(false) {
            "off"
        } else {
            "on"
        };
        env.set("MINIO_BROWSER", browser);
        env.set(
            "MINIO_ROOT_USER",
            non_empty(request.access_key.as_ref())
                .unwrap_or_else(|| self.credentials.access_key()),
        );
        env.set(
            "MINIO_ROOT_PASSWORD",
            non_empty(request.secret_key.as_ref())
                .unwrap_or_else(|| self.credentials.secret_key()),
        );
        if let Some(parity) = request.erasure_coding_parity.filter(|p| *p != 0) {
            env.set("MINIO_STORAGE_CLASS_STANDARD", format!("EC:{parity}"));
        }

        let users = match &request.idp {
            Some(idp) => {
                env.extend(identity::identity_environment(idp).iter());
                provisioner.identity_users(idp).await?
            }
            None => Vec::new(),
        };

        env.extend(
            request
                .environment_variables
                .iter()
                .map(|var| (var.key.as_str(), var.value.as_str())),
        );

        match license::operator_license(&*self.secrets, &self.config).await {
            Ok(Some(subnet_license)) => env.set(LICENSE_ENV, subnet_license),
            Ok(None) => {}
            Err(e) => warn!(tenant = %name, "operator license unavailable: {}", e),
        }

        let tls = request.tls.clone().unwrap_or_default();
        let external_cert_secret = provisioner
            .key_pairs(
                &format!("{root_secret}-instance-external-certificates"),
                &tls.minio,
            )
            .await?;
        let external_client_cert_secrets = provisioner
            .key_pairs(
                &format!("{root_secret}-instance-external-client-certificates"),
                &tls.minio_client,
            )
            .await?;

        let (external_client_cert_secret, kes) = match &request.encryption {
            Some(encryption) => {
                let client = match &encryption.client {
                    Some(client) => provisioner
                        .key_pairs(
                            &format!("{root_secret}-tenant-external-client-cert"),
                            std::slice::from_ref(client),
                        )
                        .await?
                        .into_iter()
                        .next(),
                    None => None,
                };
                let kes =
                    kes::build(provisioner, encryption, &root_secret, &self.config.kes_image)
                        .await?;
                (client, Some(kes))
            }
            None => (None, None),
        };

        let external_ca_cert_secret = provisioner
            .ca_certificates(&format!("{name}-ca-certificate"), &tls.ca_certificates)
            .await?;

        let image_pull_secret = match non_empty(request.image_pull_secret.as_ref()) {
            Some(secret) => Some(secret),
            None => {
                provisioner
                    .image_registry(request.image_registry.as_ref())
                    .await?
            }
        };

        let configuration = provisioner.configuration(&env).await?;

        let mut annotations = request.annotations.clone();
        if request.enable_prometheus == Some(true) {
            toggle_annotations(&mut annotations, true);
        }

        let tenant = Tenant {
            metadata: metav1::ObjectMeta {
                name: Some(name.to_owned()),
                namespace: Some(namespace.to_owned()),
                labels: non_empty_map(&request.labels),
                annotations: non_empty_map(&annotations),
                ..Default::default()
            },
            spec: TenantSpec {
                pools: plan.pools,
                image: Some(image),
                image_pull_secret: image_pull_secret
                    .map(|name| corev1::LocalObjectReference { name }),
                creds_secret: Some(corev1::LocalObjectReference { name: creds_secret }),
                configuration: Some(corev1::LocalObjectReference {
                    name: configuration,
                }),
                env: Vec::new(),
                users,
                mount_path: Some(
                    non_empty(request.mount_path.as_ref())
                        .unwrap_or_else(|| DEFAULT_MOUNT_PATH.to_owned()),
                ),
                request_auto_cert: request.enable_tls,
                external_cert_secret,
                external_client_cert_secret,
                external_client_cert_secrets,
                external_ca_cert_secret,
                kes,
                log: plan.log,
                prometheus: plan.prometheus,
                expose_services: Some(ExposeServices {
                    minio: request.expose_minio.unwrap_or(false),
                    console: request.expose_console.unwrap_or(false),
                }),
                features: request.domains.as_ref().map(tenant_domains),
            },
            status: None,
        };

        let created = self.tenants.create_tenant(namespace, &tenant).await?;
        info!(tenant = %name, %namespace, pools = created.spec.pools.len(), "tenant created");

        let console = match &request.idp {
            Some(IdentityProvider::Keys(keys)) => {
                let url = created.service_url();
                keys.iter()
                    .map(|key| TenantCredentials {
                        access_key: key.access_key.clone(),
                        secret_key: key.secret_key.clone(),
                        url: url.clone(),
                    })
                    .collect()
            }
            _ => Vec::new(),
        };

        Ok(CreateTenantResponse {
            external_idp: request.idp.as_ref().is_some_and(IdentityProvider::is_external),
            console,
        })
    }
}
