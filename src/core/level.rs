//! Deployment levels.
//!
//! The active environment's name selects a level once, at resolution
//! time. The resolved variables are handed back as plain data; applying
//! them somewhere (process environment, a settings object) is up to the
//! caller.

use std::fmt;
use std::str::FromStr;

use zeroize::Zeroizing;

use crate::core::env::Env;
use crate::core::state_list::StateList;
use crate::error::{ResolveError, Result};

/// The stock set of deployment levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Deployment {
    Development,
    Testing,
    Staging,
    Production,
}

impl Deployment {
    /// All levels, from least to most sensitive.
    pub const ALL: [Deployment; 4] = [
        Deployment::Development,
        Deployment::Testing,
        Deployment::Staging,
        Deployment::Production,
    ];

    /// Canonical environment name for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Deployment::Development => "development",
            Deployment::Testing => "testing",
            Deployment::Staging => "staging",
            Deployment::Production => "production",
        }
    }
}

impl fmt::Display for Deployment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Deployment {
    type Err = ResolveError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Deployment::Development),
            "testing" | "test" | "ci" => Ok(Deployment::Testing),
            "staging" | "stage" => Ok(Deployment::Staging),
            "production" | "prod" => Ok(Deployment::Production),
            _ => Err(ResolveError::UnknownLevel(s.to_string())),
        }
    }
}

/// The outcome of resolution: a level plus its variables.
pub struct Resolved<L = Deployment> {
    level: L,
    name: String,
    variables: Vec<(String, Zeroizing<String>)>,
}

impl<L: fmt::Debug> fmt::Debug for Resolved<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.variables.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("Resolved")
            .field("level", &self.level)
            .field("name", &self.name)
            .field("variables", &names)
            .finish()
    }
}

impl<L: FromStr> Resolved<L> {
    /// Resolve the level from the list's active environment.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::DeploymentLevelNotFound` if nothing is
    /// active and `ResolveError::UnknownLevel` if the active name does not
    /// parse as `L`.
    pub fn from_list(list: &StateList) -> Result<Self> {
        let state = list.get().ok_or(ResolveError::DeploymentLevelNotFound)?;
        let level = state
            .name()
            .parse::<L>()
            .map_err(|_| ResolveError::UnknownLevel(state.name().to_string()))?;

        let variables = state
            .iter()
            .filter_map(|(k, v)| v.map(|v| (k.to_string(), Zeroizing::new(v.to_string()))))
            .collect();

        Ok(Self {
            level,
            name: state.name().to_string(),
            variables,
        })
    }
}

impl<L> Resolved<L> {
    /// The selected level.
    pub fn level(&self) -> &L {
        &self.level
    }

    /// Name of the environment the level came from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `(name, value)` pairs, secret first.
    pub fn variables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Hand every pair to a caller-provided sink.
    pub fn apply<F>(&self, mut sink: F)
    where
        F: FnMut(&str, &str),
    {
        for (k, v) in self.variables() {
            sink(k, v);
        }
    }

    /// The pairs as a dotenv document.
    pub fn to_env(&self, path: impl Into<std::path::PathBuf>) -> Env {
        Env::from_pairs(
            self.variables()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            path.into(),
        )
    }
}
