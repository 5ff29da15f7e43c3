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

//! Translation of request pools into `v2::Pool` entries and back.

pub mod affinity;
pub mod pool;
pub mod quantity;
pub mod security_context;

pub use pool::{compile_pool, decompile_pool};

use snafu::Snafu;

#[derive(Snafu, Debug)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("pool {} has no volume configuration", pool))]
    MissingVolumeConfiguration { pool: String },

    #[snafu(display("pool {} volume size must be greater than 0, got {}", pool, size))]
    InvalidVolumeSize { pool: String, size: i64 },

    #[snafu(display("pool {} servers must be greater than 0, got {}", pool, servers))]
    InvalidServers { pool: String, servers: i64 },

    #[snafu(display(
        "pool {} volumes per server must be greater than 0, got {}",
        pool,
        volumes
    ))]
    InvalidVolumesPerServer { pool: String, volumes: i32 },

    #[snafu(display("invalid security context {}: {}", field, value))]
    InvalidSecurityContext {
        field: &'static str,
        value: String,
        source: std::num::ParseIntError,
    },
}
