use std::{fmt::Display, ops::Deref, str::FromStr, time::Duration};

use anyhow::{Context, Result};

/// Per-request timeout for the web oracle. Exceeding it surfaces as
/// `SolveError::OracleUnavailable`.
#[derive(Debug, Clone, Copy)]
pub struct RequestTimeout(Duration);

impl Default for RequestTimeout {
    fn default() -> Self {
        RequestTimeout(Duration::from_secs(10))
    }
}

impl FromStr for RequestTimeout {
    type Err = anyhow::Error;

    fn from_str(secs: &str) -> Result<Self> {
        secs.parse::<u64>()
            .context(format!("`{}`. Expected a positive integer", secs))
            .map(|secs| Self(Duration::from_secs(secs)))
    }
}

impl Deref for RequestTimeout {
    type Target = Duration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for RequestTimeout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.as_secs())
    }
}
