pub mod config;
pub mod doctor;
pub mod intent;

use clap::{Parser, Subcommand};

/// takuhai: parcel tracking for voice assistants.
#[derive(Debug, Parser)]
#[command(name = "takuhai", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server (default when no subcommand is given).
    Serve,
    /// Run diagnostic checks against the current configuration.
    Doctor,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Run a single conversation turn offline and print the reply as JSON.
    Intent {
        /// User id (partition key).
        #[arg(long)]
        user: String,
        /// Intent name, e.g. `TrackingRequestIntent`.
        #[arg(long)]
        name: Option<String>,
        /// Request type; `LaunchRequest` ignores the intent.
        #[arg(long, default_value = "IntentRequest")]
        request_type: String,
        /// Slot value as `name=value`.  Repeatable.
        #[arg(long = "slot", value_parser = parse_pair)]
        slots: Vec<(String, String)>,
        /// Incoming session attribute as `key=value`.  Repeatable.
        #[arg(long = "session", value_parser = parse_pair)]
        session: Vec<(String, String)>,
    },
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_owned(), v.to_owned()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path specified by `TK_CONFIG` (or
/// `config.toml` by default).  Returns the parsed [`Config`] and the
/// path that was used.
///
/// [`Config`]: tk_domain::config::Config
pub fn load_config() -> anyhow::Result<(tk_domain::config::Config, String)> {
    let config_path =
        std::env::var("TK_CONFIG").unwrap_or_else(|_| "config.toml".into());

    let config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        tk_domain::config::Config::default()
    };

    Ok((config, config_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_splits_on_first_equals() {
        assert_eq!(
            parse_pair("tackingAlias=a=b").unwrap(),
            ("tackingAlias".into(), "a=b".into())
        );
        assert!(parse_pair("novalue").is_err());
        assert!(parse_pair("=x").is_err());
    }

    #[test]
    fn intent_command_collects_repeated_slots() {
        let cli = Cli::try_parse_from([
            "takuhai",
            "intent",
            "--user",
            "u1",
            "--name",
            "TrackingRequestIntent",
            "--slot",
            "trackingCompany=yamato",
            "--slot",
            "trackingNumberOne=12",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Intent { user, slots, session, .. }) => {
                assert_eq!(user, "u1");
                assert_eq!(slots.len(), 2);
                assert!(session.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
