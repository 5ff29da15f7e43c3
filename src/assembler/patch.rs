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

//! RFC 7396 merge patches computed from a before/after pair.

use crate::types::v2::tenant::Tenant;
use serde_json::{Map, Value, json};

/// The merge patch turning `original` into `target`, or `None` when they are equal.
///
/// Keys missing from `target` become `null`. Arrays and scalars are replaced wholesale.
pub fn merge_diff(original: &Value, target: &Value) -> Option<Value> {
    match (original, target) {
        (Value::Object(original), Value::Object(target)) => {
            let mut patch = Map::new();
            for (key, value) in original {
                match target.get(key) {
                    None => {
                        patch.insert(key.clone(), Value::Null);
                    }
                    Some(new) => {
                        if let Some(diff) = merge_diff(value, new) {
                            patch.insert(key.clone(), diff);
                        }
                    }
                }
            }
            for (key, value) in target {
                if !original.contains_key(key) {
                    patch.insert(key.clone(), value.clone());
                }
            }
            (!patch.is_empty()).then_some(Value::Object(patch))
        }
        (original, target) if original == target => None,
        (_, target) => Some(target.clone()),
    }
}

/// The fields of a tenant this crate owns: labels, annotations, finalizers and `spec`.
fn owned_fields(tenant: &Tenant) -> Result<Value, serde_json::Error> {
    Ok(json!({
        "metadata": {
            "labels": tenant.metadata.labels,
            "annotations": tenant.metadata.annotations,
            "finalizers": tenant.metadata.finalizers,
        },
        "spec": serde_json::to_value(&tenant.spec)?,
    }))
}

/// Merge patch carrying only what changed between `original` and `updated`.
pub fn tenant_patch(original: &Tenant, updated: &Tenant) -> Result<Option<Value>, serde_json::Error> {
    Ok(merge_diff(&owned_fields(original)?, &owned_fields(updated)?))
}
