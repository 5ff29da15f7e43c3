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

use crate::compile::{Error, InvalidSecurityContextSnafu};
use crate::models::SecurityContext;
use k8s_openapi::api::core::v1 as corev1;
use snafu::ResultExt;

fn parse_id(field: &'static str, value: &str) -> Result<i64, Error> {
    value
        .trim()
        .parse::<i64>()
        .context(InvalidSecurityContextSnafu {
            field,
            value: value.to_owned(),
        })
}

/// Converts string ids into a pod security context. Empty optional `fsGroup` is skipped.
pub fn compile_security_context(ctx: &SecurityContext) -> Result<corev1::PodSecurityContext, Error> {
    let fs_group = match ctx.fs_group.as_deref() {
        Some(value) if !value.trim().is_empty() => Some(parse_id("fsGroup", value)?),
        _ => None,
    };

    Ok(corev1::PodSecurityContext {
        run_as_user: Some(parse_id("runAsUser", &ctx.run_as_user)?),
        run_as_group: Some(parse_id("runAsGroup", &ctx.run_as_group)?),
        run_as_non_root: Some(ctx.run_as_non_root),
        fs_group,
        ..Default::default()
    })
}

pub fn decompile_security_context(ctx: &corev1::PodSecurityContext) -> SecurityContext {
    SecurityContext {
        run_as_user: ctx.run_as_user.map(|id| id.to_string()).unwrap_or_default(),
        run_as_group: ctx.run_as_group.map(|id| id.to_string()).unwrap_or_default(),
        run_as_non_root: ctx.run_as_non_root.unwrap_or(false),
        fs_group: ctx.fs_group.map(|id| id.to_string()),
    }
}
