use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// The name of the variable which selects the [Environment]
const ENVIRONMENT_VAR: &str = "ENVIRONMENT";

/// The environment the process is deployed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Production deployment
    Production,
    /// Dev and or staging deployment
    Develop,
    /// The process is running on a developer machine
    Local,
}

impl Environment {
    /// attempt to read the [Environment] from `ENVIRONMENT`, falling back to production
    pub fn new_or_prod() -> Self {
        std::env::var(ENVIRONMENT_VAR)
            .ok()
            .and_then(|v| Self::from_str(&v).ok())
            .unwrap_or(Environment::Production)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Production => write!(f, "prod"),
            Environment::Develop => write!(f, "dev"),
            Environment::Local => write!(f, "local"),
        }
    }
}

/// Represents a value which cannot be converted into an [Environment]
#[derive(Debug, Error)]
#[error("Could not convert {0} into an environment value")]
pub struct UnknownValue(String);

impl FromStr for Environment {
    type Err = UnknownValue;

    fn from_str(environment: &str) -> Result<Self, UnknownValue> {
        match environment {
            "prod" => Ok(Environment::Production),
            "dev" => Ok(Environment::Develop),
            "local" => Ok(Environment::Local),
            s => Err(UnknownValue(s.to_string())),
        }
    }
}
