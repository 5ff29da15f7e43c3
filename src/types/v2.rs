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

//! `minio.min.io/v2` Tenant custom resource as consumed by the tenant console.

pub mod certificate;
pub mod kes;
pub mod observability;
pub mod pool;
pub mod status;
pub mod tenant;

/// Label attached to every object created on behalf of a tenant.
pub const TENANT_LABEL: &str = "v1.min.io/tenant";

/// Port the tenant's S3 endpoint listens on.
pub const MINIO_PORT: i32 = 9000;

const PROMETHEUS_PREFIX: &str = "prometheus.io";

pub const PROMETHEUS_PATH_ANNOTATION: &str = const_str::concat!(PROMETHEUS_PREFIX, "/path");
pub const PROMETHEUS_PORT_ANNOTATION: &str = const_str::concat!(PROMETHEUS_PREFIX, "/port");
pub const PROMETHEUS_SCRAPE_ANNOTATION: &str = const_str::concat!(PROMETHEUS_PREFIX, "/scrape");

pub const PROMETHEUS_METRICS_PATH: &str = "/minio/prometheus/metrics";
