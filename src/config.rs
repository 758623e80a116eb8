use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::Constants;

const AUTHOR_NAME_VAR: &str = "GITC_AUTHOR_NAME";
const AUTHOR_EMAIL_VAR: &str = "GITC_AUTHOR_EMAIL";
const DEFAULT_BRANCH_VAR: &str = "GITC_DEFAULT_BRANCH";
const HTTP_TIMEOUT_VAR: &str = "GITC_HTTP_TIMEOUT_SECS";

const DEFAULT_AUTHOR_NAME: &str = "gitc";
const DEFAULT_AUTHOR_EMAIL: &str = "gitc@localhost";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Settings read from the environment (and a `.env` file, if `dotenvy` found one).
#[derive(Debug, Clone)]
pub struct Config {
    pub author_name: String,
    pub author_email: String,
    pub default_branch: String,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            author_name: DEFAULT_AUTHOR_NAME.to_owned(),
            author_email: DEFAULT_AUTHOR_EMAIL.to_owned(),
            default_branch: Constants::DEFAULT_BRANCH_NAME.to_owned(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Builds the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// This function will fail if the timeout variable is set but is not a positive number.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let http_timeout = match lookup(HTTP_TIMEOUT_VAR) {
            Some(value) => {
                let secs: u64 = value
                    .trim()
                    .parse()
                    .context(format!("{} must be a number, got {:?}", HTTP_TIMEOUT_VAR, value))?;
                if secs == 0 {
                    anyhow::bail!("{} must be greater than zero", HTTP_TIMEOUT_VAR);
                }
                Duration::from_secs(secs)
            }
            None => defaults.http_timeout,
        };

        Ok(Self {
            author_name: lookup(AUTHOR_NAME_VAR).unwrap_or(defaults.author_name),
            author_email: lookup(AUTHOR_EMAIL_VAR).unwrap_or(defaults.author_email),
            default_branch: lookup(DEFAULT_BRANCH_VAR)
                .filter(|b| !b.trim().is_empty())
                .unwrap_or(defaults.default_branch),
            http_timeout,
        })
    }
}
