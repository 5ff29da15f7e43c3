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

use rand::Rng;

/// Alphabet of 32 symbols so that a uniformly random byte maps without bias.
const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ012345";

pub const ACCESS_KEY_LENGTH: usize = 16;
pub const SECRET_KEY_LENGTH: usize = 32;

/// Source of generated credentials and name suffixes.
pub trait CredentialGenerator: Send + Sync {
    fn random_string(&self, len: usize) -> String;

    fn access_key(&self) -> String {
        self.random_string(ACCESS_KEY_LENGTH)
    }

    fn secret_key(&self) -> String {
        self.random_string(SECRET_KEY_LENGTH)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCredentials;

impl CredentialGenerator for RandomCredentials {
    fn random_string(&self, len: usize) -> String {
        let mut rng = rand::rng();
        (0..len)
            .map(|_| ALPHABET[usize::from(rng.random::<u8>()) % ALPHABET.len()] as char)
            .collect()
    }
}
