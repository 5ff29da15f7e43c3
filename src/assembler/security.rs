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

use super::{Assembler, Error, settle};
use crate::models::UpdateTenantSecurityRequest;
use crate::secrets::SecretProvisioner;
use crate::secrets::certificates::{decode, decode_key_pair};
use crate::types::v2::certificate::LocalCertificateReference;
use crate::types::v2::tenant::Tenant;
use tracing::{info, warn};

const SUFFIX_LENGTH: usize = 5;

impl Assembler {
    /// Auto certificates and custom server/CA certificates.
    ///
    /// Listed secrets are detached from the tenant and deleted once the patch is applied.
    /// New certificates get secrets under a fresh random prefix so they never collide
    /// with the ones being removed.
    pub async fn update_security(
        &self,
        namespace: &str,
        name: &str,
        request: &UpdateTenantSecurityRequest,
    ) -> Result<Tenant, Error> {
        let custom = &request.custom_certificates;
        for (i, pair) in custom.minio.iter().enumerate() {
            decode_key_pair(&format!("certificate {i}"), pair)?;
        }
        for (i, ca) in custom.minio_cas.iter().enumerate() {
            decode(&format!("ca certificate {i}"), ca)?;
        }

        let original = self.fetch(namespace, name).await?;

        let mut provisioner = self.provisioner(namespace, name);
        let result = self
            .apply_security(&mut provisioner, &original, request)
            .await;
        let updated = settle(&mut provisioner, result).await?;

        for secret in &custom.secrets_to_be_deleted {
            match self.secrets.delete_secret(namespace, secret).await {
                Ok(()) => info!(%secret, tenant = %name, "certificate secret deleted"),
                Err(e) => warn!(%secret, tenant = %name, "failed to delete certificate secret: {}", e),
            }
        }

        Ok(updated)
    }

    async fn apply_security(
        &self,
        provisioner: &mut SecretProvisioner,
        original: &Tenant,
        request: &UpdateTenantSecurityRequest,
    ) -> Result<Tenant, Error> {
        let custom = &request.custom_certificates;
        let removed = |reference: &LocalCertificateReference| {
            custom.secrets_to_be_deleted.contains(&reference.name)
        };

        let mut tenant = original.clone();
        tenant.spec.request_auto_cert = Some(request.auto_cert);
        tenant.spec.external_cert_secret.retain(|r| !removed(r));
        tenant.spec.external_ca_cert_secret.retain(|r| !removed(r));

        let prefix = format!(
            "{}-{}",
            original.name(),
            self.credentials.random_string(SUFFIX_LENGTH).to_lowercase()
        );
        let certificates = provisioner
            .key_pairs(&format!("{prefix}-external-certificates"), &custom.minio)
            .await?;
        tenant.spec.external_cert_secret.extend(certificates);

        let cas = provisioner
            .ca_certificates(&format!("{prefix}-ca-certificate"), &custom.minio_cas)
            .await?;
        tenant.spec.external_ca_cert_secret.extend(cas);

        self.submit(original, &tenant).await
    }
}
