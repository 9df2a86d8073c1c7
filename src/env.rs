//! Process environment lookups behind a mockable handle.
//!
//! Config loading reads credentials and overrides through [`Env`] so that
//! tests can supply a fixed variable set via [`Env::mock()`] instead of
//! mutating the real process environment.

use std::collections::HashMap;

/// Environment variable reader.
#[derive(Clone, Debug, Default)]
pub struct Env {
    overrides: Option<HashMap<String, String>>,
}

impl Env {
    /// Read from the real process environment.
    pub fn real() -> Self {
        Self { overrides: None }
    }

    /// Read from an explicit set of key-value pairs only.
    #[cfg(test)]
    pub fn mock(vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            overrides: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Look up a variable. Empty values count as unset.
    pub fn var(&self, name: &str) -> Option<String> {
        let value = match &self.overrides {
            Some(map) => map.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    /// Return the first variable in `names` that is set.
    pub fn first_of(&self, names: &[&str]) -> Option<String> {
        names.iter().find_map(|name| self.var(name))
    }
}
