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

use crate::context;
use futures::future::BoxFuture;
use tracing::{info, warn};

pub type UndoFuture = BoxFuture<'static, Result<(), context::Error>>;

type UndoAction = Box<dyn FnOnce() -> UndoFuture + Send>;

/// Compensating actions for objects created during one request.
///
/// Actions run newest first. Failures are logged and do not stop the remaining actions.
#[derive(Default)]
pub struct Rollback {
    actions: Vec<(String, UndoAction)>,
}

impl Rollback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<F>(&mut self, description: impl Into<String>, undo: F)
    where
        F: FnOnce() -> UndoFuture + Send + 'static,
    {
        self.actions.push((description.into(), Box::new(undo)));
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Forgets every registered action once the request has succeeded.
    pub fn commit(&mut self) {
        self.actions.clear();
    }

    pub async fn run(&mut self) {
        if self.actions.is_empty() {
            return;
        }

        info!(actions = self.actions.len(), "rolling back partially created objects");
        while let Some((description, undo)) = self.actions.pop() {
            if let Err(e) = undo().await {
                warn!(target = %description, "rollback step failed: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for Rollback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.actions.iter().map(|(description, _)| description))
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::{Arc, Mutex};

    // Test: actions run in reverse registration order and a failure does not stop the rest
    #[tokio::test]
    async fn test_rollback_runs_newest_first() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut rollback = Rollback::new();

        for step in 0..3 {
            let order = order.clone();
            rollback.push(format!("step-{step}"), move || {
                async move {
                    order.lock().unwrap().push(step);
                    if step == 1 {
                        return Err(context::Error::NotFound {
                            kind: "Secret".to_string(),
                            name: "step-1".to_string(),
                        });
                    }
                    Ok(())
                }
                .boxed()
            });
        }

        assert_eq!(rollback.len(), 3);
        rollback.run().await;

        assert_eq!(*order.lock().unwrap(), vec![2, 1, 0]);
        assert!(rollback.is_empty());
    }

    #[tokio::test]
    async fn test_commit_discards_actions() {
        let ran = Arc::new(Mutex::new(false));
        let mut rollback = Rollback::new();
        let flag = ran.clone();
        rollback.push("secret", move || {
            async move {
                *flag.lock().unwrap() = true;
                Ok(())
            }
            .boxed()
        });

        rollback.commit();
        rollback.run().await;
        assert!(!*ran.lock().unwrap());
    }
}
