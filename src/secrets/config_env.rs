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

//! `config.env`: the environment file MinIO sources at start-up.
//!
//! Rendered as one `export KEY="VALUE"` line per entry, sorted by key, so the file can be
//! sourced by a POSIX shell as is.

use std::collections::BTreeMap;
use std::fmt;

/// Characters that keep their special meaning inside double quotes.
const ESCAPED: [char; 4] = ['"', '\\', '$', '`'];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigEnv {
    entries: BTreeMap<String, String>,
}

impl ConfigEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn retain(&mut self, f: impl FnMut(&String, &mut String) -> bool) {
        self.entries.retain(f);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn extend<K, V>(&mut self, entries: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.entries
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Reads a rendered file back. Also accepts unquoted and single-quoted values, blank
    /// lines and `#` comments. Lines without an assignment are ignored.
    pub fn parse(input: &str) -> Self {
        let mut entries = BTreeMap::new();
        let mut lines = input.lines();

        while let Some(line) = lines.next() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line).trim_start();
            let Some((key, raw)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }

            let value = if let Some(rest) = raw.strip_prefix('"') {
                // a quoted value may span lines
                let mut quoted = rest.to_owned();
                loop {
                    if let Some(value) = unescape(&quoted) {
                        break value;
                    }
                    match lines.next() {
                        Some(next) => {
                            quoted.push('\n');
                            quoted.push_str(next);
                        }
                        None => break unescape_unterminated(&quoted),
                    }
                }
            } else if let Some(rest) = raw.strip_prefix('\'') {
                rest.split_once('\'')
                    .map(|(value, _)| value)
                    .unwrap_or(rest)
                    .to_owned()
            } else {
                raw.trim().to_owned()
            };

            entries.insert(key.to_owned(), value);
        }

        Self { entries }
    }
}

/// Unescapes up to the closing quote. `None` if the quote is not closed yet.
fn unescape(quoted: &str) -> Option<String> {
    let mut value = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => return Some(value),
            '\\' => match chars.next() {
                Some(next) if ESCAPED.contains(&next) => value.push(next),
                Some(next) => {
                    value.push('\\');
                    value.push(next);
                }
                None => value.push('\\'),
            },
            c => value.push(c),
        }
    }
    None
}

fn unescape_unterminated(quoted: &str) -> String {
    let mut closed = quoted.to_owned();
    closed.push('"');
    unescape(&closed).unwrap_or_default()
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if ESCAPED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl fmt::Display for ConfigEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.entries {
            writeln!(f, "export {}=\"{}\"", key, escape(value))?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigEnv {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut env = ConfigEnv::new();
        env.extend(iter);
        env
    }
}
