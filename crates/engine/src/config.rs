// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sandbox environment settings for the lifecycle manager

use crate::options::StartOptions;

/// Names of the variables injected into every sandbox, plus any fixed extras.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleConfig {
    pub name_var: String,
    pub keep_alive_var: String,
    pub credential_var: String,
    /// Added to every sandbox after the variables above
    pub extra_env: Vec<(String, String)>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            name_var: "MINION_NAME".to_string(),
            keep_alive_var: "MINION_KEEP_ALIVE".to_string(),
            credential_var: "MINION_CREDENTIAL".to_string(),
            extra_env: Vec::new(),
        }
    }
}

impl LifecycleConfig {
    /// Environment for one minion's sandbox.
    pub fn sandbox_env(&self, name: &str, opts: &StartOptions) -> Vec<(String, String)> {
        let mut env = vec![(self.name_var.clone(), name.to_string())];
        if opts.keep_alive {
            env.push((self.keep_alive_var.clone(), "1".to_string()));
        }
        if let Some(credential) = &opts.credential {
            env.push((self.credential_var.clone(), credential.clone()));
        }
        env.extend(self.extra_env.iter().cloned());
        env
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
