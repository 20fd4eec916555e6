//! CLI module - command-line interface
//!
//! - `ouoctl` - defaults to showing the credentials form
//! - `ouoctl credentials` - show, set, edit or clear saved credentials
//! - `ouoctl refresh` - refresh the hosted model with the saved credentials
//! - `ouoctl guide` - explain which credentials are needed and where to get them
//! - `ouoctl config` - inspect configuration

pub mod config;
pub mod credentials;
pub mod guide;
pub mod refresh;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::api::HttpRefreshBackend;
use crate::controller::SettingsController;
use crate::core::CookieCredentialStore;
use crate::notifications::ConsoleNotifier;
use crate::settings::{DeploymentMode, Settings};

/// Exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const UNEXPECTED_FAILURE: i32 = 1;
    pub const REFRESH_DISABLED: i32 = 2;
    pub const REFRESH_REJECTED: i32 = 3;
    pub const REFRESH_FAILED: i32 = 4;
}

/// ouoctl - manage ouo credentials
///
/// Stores your OpenAI key locally and asks the ouo backend to refresh its
/// model with it. Defaults to showing the credentials form when no
/// subcommand is given.
#[derive(Parser, Debug)]
#[command(name = "ouoctl")]
#[command(author, version, about, long_about = None)]
#[command(long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("OUO_GIT_COMMIT"),
    " ",
    env!("OUO_BUILD_DATE"),
    ")"
))]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit machine-readable logs (JSON) to stderr
    #[arg(long = "json-output", global = true)]
    pub json_output: bool,

    /// Disable ANSI colors in log output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Deployment mode, picks the backend host
    #[arg(long = "env", global = true, env = "OUO_ENV", value_enum)]
    pub deployment_mode: Option<DeploymentMode>,

    /// Backend base URL, overrides the deployment mode
    #[arg(long = "base-url", global = true, env = "OUO_BASE_URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show or change saved credentials (default command)
    Credentials(credentials::CredentialsArgs),

    /// Refresh the model with the saved credentials
    Refresh,

    /// Why credentials are needed and how to create them
    Guide(guide::GuideArgs),

    /// Inspect configuration
    Config(config::ConfigArgs),
}

impl Cli {
    /// Wire the settings controller for this invocation
    pub fn build_controller(&self) -> anyhow::Result<SettingsController> {
        let settings = Settings::load();
        let config = settings.resolve(self.deployment_mode, self.base_url.as_deref())?;

        let store = Arc::new(CookieCredentialStore::new());
        let notifier = Arc::new(ConsoleNotifier::new(settings.show_notifications));
        let backend = Arc::new(HttpRefreshBackend::new(&config)?);

        tracing::debug!(
            mode = %config.mode,
            url = %backend.url(),
            "Settings controller ready"
        );

        Ok(SettingsController::new(store, notifier, backend))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_global_overrides() {
        let cli = Cli::try_parse_from([
            "ouoctl",
            "--env",
            "development",
            "--base-url",
            "http://localhost:8000",
            "refresh",
        ])
        .unwrap();

        assert_eq!(cli.deployment_mode, Some(DeploymentMode::Development));
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:8000"));
        assert!(matches!(cli.command, Some(Commands::Refresh)));
    }

    #[test]
    fn test_cli_defaults_to_no_command() {
        let cli = Cli::try_parse_from(["ouoctl", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_rejects_unknown_env() {
        assert!(Cli::try_parse_from(["ouoctl", "--env", "staging", "refresh"]).is_err());
    }
}
