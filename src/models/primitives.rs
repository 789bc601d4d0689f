//! Primitive types shared across the client.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Environment the client talks to.
///
/// Sandbox requests are routed to the `sandbox.`-prefixed instance of the
/// merchant account.
///
/// # Example
///
/// ```
/// use checkout_api::Environment;
///
/// let env: Environment = "sandbox".parse().unwrap();
/// assert!(env.is_sandbox());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Test environment; no real money moves.
    #[default]
    Sandbox,
    /// Live environment.
    Production,
}

impl Environment {
    /// Returns `true` if this is the production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Returns `true` if this is the sandbox environment.
    pub fn is_sandbox(&self) -> bool {
        matches!(self, Environment::Sandbox)
    }

    /// Lowercase name of the environment.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" | "test" => Ok(Environment::Sandbox),
            "production" | "prod" | "live" => Ok(Environment::Production),
            other => Err(Error::Decoding(format!(
                "invalid configuration: unknown environment '{}' (expected sandbox or production)",
                other
            ))),
        }
    }
}
