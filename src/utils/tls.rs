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

use rustls::crypto::ring::sign;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::sign::CertifiedKey;
use rustls_pemfile::Item;
use snafu::{ResultExt, Snafu};
use std::io::{self, Cursor};

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("parse certificate error"))]
    InvalidCertificate { source: io::Error },

    #[snafu(display("no certificate"))]
    NonCertificate,

    #[snafu(display("parse private key error"))]
    InvalidPrivateKey { source: io::Error },

    #[snafu(display("no private key"))]
    NonPrivateKey,

    #[snafu(display("certificate and private key do not match"))]
    MatchFailed { source: rustls::Error },

    #[snafu(display("no supported sign type"))]
    NoSupportedSignType { source: rustls::Error },

    #[snafu(display("no supported pem type"))]
    NoSupportedPEMType,
}

/// All certificates in a PEM bundle. Fails when the bundle holds none.
pub fn load_certs(cert: &[u8]) -> Result<Vec<CertificateDer<'static>>, Error> {
    let certs = rustls_pemfile::certs(&mut Cursor::new(cert))
        .collect::<Result<Vec<CertificateDer<'static>>, _>>()
        .context(InvalidCertificateSnafu)?;

    if certs.is_empty() {
        return NonCertificateSnafu.fail();
    }

    Ok(certs)
}

/// DER of the leading certificate, or `None` when nothing decodes.
pub fn first_certificate(pem: &[u8]) -> Option<CertificateDer<'static>> {
    load_certs(pem).ok()?.into_iter().next()
}

fn load_private_key(private_key: &[u8]) -> Result<PrivateKeyDer<'static>, Error> {
    let item = rustls_pemfile::read_one(&mut Cursor::new(private_key))
        .context(InvalidPrivateKeySnafu)?
        .ok_or(Error::NonPrivateKey)?;

    // only pkcs8/pkcs1/sec1 supported
    Ok(match item {
        Item::Pkcs8Key(key) => key.into(),
        Item::Pkcs1Key(key) => key.into(),
        Item::Sec1Key(key) => key.into(),
        _ => return NoSupportedPEMTypeSnafu.fail(),
    })
}

/// Checks that `key_pem` is the private half of the leaf in `cert_pem`.
pub fn verify_key_pair<T: AsRef<[u8]>>(cert_pem: T, key_pem: T) -> Result<(), Error> {
    let certs = load_certs(cert_pem.as_ref())?;
    let private_key = load_private_key(key_pem.as_ref())?;
    let signing_key = sign::any_supported_type(&private_key).context(NoSupportedSignTypeSnafu)?;

    CertifiedKey::new(certs, signing_key)
        .keys_match()
        .context(MatchFailedSnafu)
}
