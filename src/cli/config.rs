//! Config command implementation
//!
//! Utilities for validating and inspecting configuration.

use clap::{Parser, Subcommand};

use crate::core::CookieCredentialStore;
use crate::settings::Settings;

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Validate configuration files
    Validate,
    /// Dump configuration to stdout
    Dump {
        /// Output format: json or toml
        #[arg(short, long, default_value = "json")]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Write a default settings.json if none exists
    Init,
}

/// Run the config command
pub async fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Validate => validate_config().await,
        ConfigCommand::Dump { format } => dump_config(&format).await,
        ConfigCommand::Path => show_paths().await,
        ConfigCommand::Init => init_config().await,
    }
}

/// Validate configuration files
async fn validate_config() -> anyhow::Result<()> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    // Check settings
    print!("Checking settings.json... ");
    match Settings::settings_path() {
        Some(path) if path.exists() => match Settings::load_from(&path) {
            Ok(settings) => match settings.resolve(None, None) {
                Ok(_) => println!("OK"),
                Err(e) => {
                    println!("INVALID");
                    errors.push(format!("settings.json: {}", e));
                }
            },
            Err(e) => {
                println!("INVALID");
                errors.push(format!("settings.json: {}", e));
            }
        },
        Some(_) => {
            println!("NOT FOUND (using defaults)");
            warnings.push("settings.json: File does not exist, using defaults".to_string());
        }
        None => {
            println!("ERROR");
            errors.push("settings.json: Could not determine config path".to_string());
        }
    }

    // Check credentials cookie
    print!("Checking credentials cookie... ");
    let store = CookieCredentialStore::new();
    match store.load_entry() {
        Ok(Some(entry)) if entry.is_expired() => {
            println!("EXPIRED");
            warnings.push(format!(
                "credentials cookie: Expired at {}, save credentials again",
                entry.expires_at.format("%Y-%m-%d %H:%M")
            ));
        }
        Ok(Some(entry)) => {
            println!("OK (expires {})", entry.expires_at.format("%Y-%m-%d %H:%M"));
            if !entry.credentials.has_openai_api_key() {
                warnings.push("credentials cookie: No OpenAI API key saved".to_string());
            }
        }
        Ok(None) => println!("NOT FOUND (none saved)"),
        Err(e) => {
            println!("INVALID");
            errors.push(format!("credentials cookie: {}", e));
        }
    }

    // Summary
    println!();
    if errors.is_empty() && warnings.is_empty() {
        println!("Configuration is valid.");
    } else {
        if !warnings.is_empty() {
            println!("Warnings:");
            for w in &warnings {
                println!("  - {}", w);
            }
        }
        if !errors.is_empty() {
            println!("Errors:");
            for e in &errors {
                println!("  - {}", e);
            }
            anyhow::bail!("Configuration validation failed with {} error(s).", errors.len());
        }
    }

    Ok(())
}

/// Render settings in the requested format
fn render_settings(settings: &Settings, format: &str) -> anyhow::Result<String> {
    match format.to_lowercase().as_str() {
        "json" => Ok(serde_json::to_string_pretty(settings)?),
        "toml" => Ok(toml::to_string_pretty(settings)?),
        _ => anyhow::bail!("Unknown format '{}'. Supported formats: json, toml", format),
    }
}

/// Dump configuration to stdout
async fn dump_config(format: &str) -> anyhow::Result<()> {
    let settings = Settings::load();
    println!("{}", render_settings(&settings, format)?);
    Ok(())
}

/// Show configuration file paths
async fn show_paths() -> anyhow::Result<()> {
    println!("Configuration paths:");

    match Settings::settings_path() {
        Some(path) => {
            let exists = if path.exists() { "" } else { " (not found)" };
            println!("  Settings:            {}{}", path.display(), exists);
        }
        None => println!("  Settings:            (could not determine path)"),
    }

    let store = CookieCredentialStore::new();
    match store.path() {
        Some(path) => {
            let exists = if path.exists() { "" } else { " (not found)" };
            println!("  Credentials cookie:  {}{}", path.display(), exists);
        }
        None => println!("  Credentials cookie:  (could not determine path)"),
    }

    Ok(())
}

/// Write default settings unless a file is already there
async fn init_config() -> anyhow::Result<()> {
    let path = Settings::settings_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine settings path"))?;

    if path.exists() {
        println!("Settings already exist at {}", path.display());
        return Ok(());
    }

    Settings::default().save()?;
    println!("Wrote default settings to {}", path.display());
    Ok(())
}
