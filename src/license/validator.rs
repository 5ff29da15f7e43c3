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

use crate::license::{
    Error, ExpiredSnafu, InvalidExpirySnafu, InvalidKeySnafu, InvalidTokenSnafu,
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt, ensure};

/// What a valid license grants.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LicenseInfo {
    pub email: String,
    pub organization: String,
    pub account_id: i64,
    pub storage_capacity: i64,
    pub plan: String,
    pub expires_at: DateTime<Utc>,
}

/// Checks a raw license token and returns its metadata.
pub trait LicenseValidator: Send + Sync {
    fn validate(&self, license: &str) -> Result<LicenseInfo, Error>;
}

#[derive(Deserialize)]
struct Claims {
    #[serde(default)]
    sub: String,
    #[serde(default)]
    org: String,
    #[serde(default)]
    aid: i64,
    #[serde(default)]
    cap: i64,
    #[serde(default)]
    plan: String,
    /// Seconds since the epoch, fractional in issued licenses.
    exp: f64,
}

/// Verifies licenses signed as JWTs.
pub struct JwtLicenseValidator {
    key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtLicenseValidator {
    pub fn new(key: DecodingKey, algorithm: Algorithm) -> Self {
        Self { key, algorithm }
    }

    /// Licenses signed with ES384 by the holder of the given public key.
    pub fn from_ec_pem(public_key: &[u8]) -> Result<Self, Error> {
        let key = DecodingKey::from_ec_pem(public_key).context(InvalidKeySnafu)?;
        Ok(Self::new(key, Algorithm::ES384))
    }
}

impl LicenseValidator for JwtLicenseValidator {
    fn validate(&self, license: &str) -> Result<LicenseInfo, Error> {
        // exp is checked below, the library only accepts integral timestamps
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let claims = jsonwebtoken::decode::<Claims>(license.trim(), &self.key, &validation)
            .context(InvalidTokenSnafu)?
            .claims;

        ensure!(claims.exp.is_finite(), InvalidExpirySnafu);
        let expires_at =
            DateTime::<Utc>::from_timestamp(claims.exp.trunc() as i64, 0).context(InvalidExpirySnafu)?;
        ensure!(expires_at > Utc::now(), ExpiredSnafu { expires_at });

        Ok(LicenseInfo {
            email: claims.sub,
            organization: claims.org,
            account_id: claims.aid,
            storage_capacity: claims.cap,
            plan: claims.plan,
            expires_at,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    const SECRET: &[u8] = b"license-signing-secret";

    fn validator() -> JwtLicenseValidator {
        JwtLicenseValidator::new(DecodingKey::from_secret(SECRET), Algorithm::HS256)
    }

    fn token(exp: f64) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &json!({
                "sub": "ops@example.com",
                "org": "Example",
                "aid": 42,
                "cap": 100,
                "plan": "ENTERPRISE",
                "exp": exp,
            }),
            &EncodingKey::from_secret(SECRET),
        )
        .expect("Should sign")
    }

    // Test: fractional expiry in the future is accepted
    #[test]
    fn test_validate_license() {
        let exp = (Utc::now().timestamp() + 3600) as f64 + 0.5;
        let info = validator().validate(&token(exp)).expect("Should validate");

        assert_eq!(info.email, "ops@example.com");
        assert_eq!(info.organization, "Example");
        assert_eq!(info.account_id, 42);
        assert_eq!(info.storage_capacity, 100);
        assert_eq!(info.plan, "ENTERPRISE");
        assert_eq!(info.expires_at.timestamp(), exp.trunc() as i64);
    }

    #[test]
    fn test_validate_expired_license() {
        let exp = (Utc::now().timestamp() - 60) as f64;
        assert!(matches!(
            validator().validate(&token(exp)),
            Err(Error::Expired { .. })
        ));
    }

    // Test: a token signed with another key is rejected
    #[test]
    fn test_validate_wrong_signature() {
        let other = JwtLicenseValidator::new(DecodingKey::from_secret(b"other"), Algorithm::HS256);
        let exp = (Utc::now().timestamp() + 3600) as f64;
        assert!(matches!(
            other.validate(&token(exp)),
            Err(Error::InvalidToken { .. })
        ));
        assert!(matches!(
            validator().validate("not-a-jwt"),
            Err(Error::InvalidToken { .. })
        ));
    }

    #[test]
    fn test_from_ec_pem_rejects_garbage() {
        assert!(matches!(
            JwtLicenseValidator::from_ec_pem(b"not a key"),
            Err(Error::InvalidKey { .. })
        ));
    }
}
