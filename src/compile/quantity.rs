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

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

const BINARY_SUFFIXES: [(&str, u32); 6] = [
    ("Ei", 60),
    ("Pi", 50),
    ("Ti", 40),
    ("Gi", 30),
    ("Mi", 20),
    ("Ki", 10),
];

const DECIMAL_SUFFIXES: [(&str, u32); 6] = [
    ("E", 18),
    ("P", 15),
    ("T", 12),
    ("G", 9),
    ("M", 6),
    ("k", 3),
];

/// Renders `value` with the largest binary suffix that divides it exactly.
pub fn binary_si(value: i64) -> Quantity {
    if value != 0 {
        for (suffix, shift) in BINARY_SUFFIXES {
            let unit = 1_i64 << shift;
            if value % unit == 0 {
                return Quantity(format!("{}{}", value / unit, suffix));
            }
        }
    }
    Quantity(value.to_string())
}

/// Parses a quantity back to whole units. Milli values are rounded up.
pub fn parse_quantity(quantity: &str) -> Option<i64> {
    let quantity = quantity.trim();
    if quantity.is_empty() {
        return None;
    }

    for (suffix, shift) in BINARY_SUFFIXES {
        if let Some(number) = quantity.strip_suffix(suffix) {
            return number.parse::<i64>().ok()?.checked_mul(1_i64 << shift);
        }
    }

    for (suffix, exp) in DECIMAL_SUFFIXES {
        if let Some(number) = quantity.strip_suffix(suffix) {
            return number.parse::<i64>().ok()?.checked_mul(10_i64.pow(exp));
        }
    }

    if let Some(number) = quantity.strip_suffix('m') {
        let milli = number.parse::<i64>().ok()?;
        return Some(milli.div_euclid(1000) + i64::from(milli.rem_euclid(1000) > 0));
    }

    quantity.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_si() {
        assert_eq!(binary_si(10 * 1024 * 1024 * 1024).0, "10Gi");
        assert_eq!(binary_si(512 * 1024 * 1024).0, "512Mi");
        assert_eq!(binary_si(1536).0, "1536");
        assert_eq!(binary_si(2).0, "2");
        assert_eq!(binary_si(0).0, "0");
        assert_eq!(binary_si(1024_i64.pow(4)).0, "1Ti");
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("10Gi"), Some(10_737_418_240));
        assert_eq!(parse_quantity("2"), Some(2));
        assert_eq!(parse_quantity("500m"), Some(1));
        assert_eq!(parse_quantity("2000m"), Some(2));
        assert_eq!(parse_quantity("1k"), Some(1000));
        assert_eq!(parse_quantity("3G"), Some(3_000_000_000));
        assert_eq!(parse_quantity("abc"), None);
        assert_eq!(parse_quantity(""), None);
    }

    // Test: extreme values round or fail without overflowing
    #[test]
    fn test_parse_quantity_limits() {
        assert_eq!(
            parse_quantity("9223372036854775807m"),
            Some(9_223_372_036_854_776)
        );
        assert_eq!(
            parse_quantity("-9223372036854775808m"),
            Some(-9_223_372_036_854_775)
        );
        assert_eq!(parse_quantity("-500m"), Some(0));
        assert_eq!(parse_quantity("9223372036854775807Ki"), None);
        assert_eq!(parse_quantity("9223372036854775807E"), None);
    }
}
