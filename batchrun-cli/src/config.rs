//! Run settings
//!
//! Settings are a plain record: the target environment fixes the API base
//! URL, everything else comes from flags or their environment variables.
//! They are validated once, before anything is sent.

use batchrun_client::Identity;
use clap::ValueEnum;
use std::fmt;
use std::time::Duration;

use crate::commands::Mode;
use crate::scheduler::PollerConfig;
use crate::transform::DEFAULT_PROCEDURE;

/// Default application name sent with every request
pub const DEFAULT_APPLICATION_NAME: &str = "ClientApp";

/// Deployment the job API lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    Prod,
    Uat,
    Local,
}

impl Environment {
    /// Base URL of the job API in this environment
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Prod => "https://clientapi.com/apiv2/",
            Self::Uat => "https://uat.clientapi.com/apiv2/",
            Self::Local => "http://localhost:8000/apiv2/",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prod => "prod",
            Self::Uat => "uat",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub environment: Environment,

    /// Job API base URL; the environment's URL unless overridden
    pub base_url: String,

    pub client_id: String,
    pub client_secret: String,
    pub application_name: String,

    /// Probe cycles before pending jobs count as timed out
    pub max_probes: u32,

    /// Pause between probe cycles
    pub probe_interval: Duration,

    /// Stored procedure called by the downstream transform
    pub procedure: String,
}

impl Settings {
    /// Creates settings with defaults for `environment` and no credentials
    pub fn for_environment(environment: Environment) -> Self {
        let poller = PollerConfig::default();
        Self {
            environment,
            base_url: environment.base_url().to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            application_name: DEFAULT_APPLICATION_NAME.to_string(),
            max_probes: poller.max_probes,
            probe_interval: poller.probe_interval,
            procedure: DEFAULT_PROCEDURE.to_string(),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity::new(
            self.client_id.clone(),
            self.client_secret.clone(),
            self.application_name.clone(),
        )
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            max_probes: self.max_probes,
            probe_interval: self.probe_interval,
        }
    }

    /// Validates the settings for what `mode` is about to do
    pub fn validate(&self, mode: Mode) -> anyhow::Result<()> {
        if mode.uses_api() {
            if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
                anyhow::bail!("base_url must start with http:// or https://");
            }

            if self.client_id.is_empty() {
                anyhow::bail!("client_id cannot be empty");
            }

            if self.client_secret.is_empty() {
                anyhow::bail!("client_secret cannot be empty");
            }

            if self.application_name.is_empty() {
                anyhow::bail!("application_name cannot be empty");
            }

            if self.max_probes == 0 {
                anyhow::bail!("max_probes must be greater than 0");
            }

            if self.probe_interval.is_zero() {
                anyhow::bail!("probe_interval must be greater than 0");
            }
        }

        if mode.runs_transform() && self.procedure.trim().is_empty() {
            anyhow::bail!("procedure cannot be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid(environment: Environment) -> Settings {
        Settings {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            ..Settings::for_environment(environment)
        }
    }

    #[test]
    fn test_environment_base_urls() {
        assert_eq!(Environment::Prod.base_url(), "https://clientapi.com/apiv2/");
        assert_eq!(Environment::Uat.base_url(), "https://uat.clientapi.com/apiv2/");
        assert_eq!(Environment::Local.base_url(), "http://localhost:8000/apiv2/");
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::for_environment(Environment::Uat);
        assert_eq!(settings.base_url, "https://uat.clientapi.com/apiv2/");
        assert_eq!(settings.max_probes, 360);
        assert_eq!(settings.probe_interval, Duration::from_secs(5));
        assert_eq!(settings.application_name, "ClientApp");
        assert_eq!(settings.procedure, "SCHEMA.USP_TRANSFORM_DATA");
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = valid(Environment::Local);

        // Valid settings should pass
        assert!(settings.validate(Mode::FullJob).is_ok());

        // Missing credentials should fail
        settings.client_secret = String::new();
        assert!(settings.validate(Mode::Job).is_err());

        settings.client_secret = "secret".to_string();

        // Invalid URL should fail
        settings.base_url = "clientapi.com".to_string();
        assert!(settings.validate(Mode::Repository).is_err());

        settings.base_url = "http://localhost:8000/apiv2/".to_string();

        settings.max_probes = 0;
        assert!(settings.validate(Mode::Job).is_err());

        settings.max_probes = 3;
        settings.probe_interval = Duration::ZERO;
        assert!(settings.validate(Mode::Job).is_err());
    }

    #[test]
    fn test_transform_only_needs_no_credentials() {
        let mut settings = Settings::for_environment(Environment::Prod);
        assert!(settings.validate(Mode::Transform).is_ok());
        assert!(settings.validate(Mode::Job).is_err());

        settings.procedure = " ".to_string();
        assert!(settings.validate(Mode::Transform).is_err());
    }

    #[test]
    fn test_poller_config() {
        let mut settings = valid(Environment::Local);
        settings.max_probes = 12;
        settings.probe_interval = Duration::from_secs(1);

        let config = settings.poller_config();
        assert_eq!(config.max_probes, 12);
        assert_eq!(config.probe_interval, Duration::from_secs(1));
    }
}
