use anyhow::Context;
use tk_domain::config::{Config, ConfigSeverity};

const REDACTED: &str = "********";

/// Parse and validate the config, printing any issues.
///
/// Returns `false` when at least one error was found.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();

    if issues.is_empty() {
        println!(
            "Config OK ({config_path}): store={:?}, carrier={:?}",
            config.store.backend, config.carrier.mode
        );
        return true;
    }

    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    let warning_count = issues.len() - error_count;

    for issue in &issues {
        println!("{issue}");
    }
    println!("\n{error_count} error(s), {warning_count} warning(s) in {config_path}");

    error_count == 0
}

/// Dump the resolved config (with all defaults filled in) as TOML.
/// The carrier API key is masked.
pub fn show(config: &Config) -> anyhow::Result<()> {
    print!("{}", render(config)?);
    Ok(())
}

fn render(config: &Config) -> anyhow::Result<String> {
    let mut shown = config.clone();
    if shown.carrier.api_key.is_some() {
        shown.carrier.api_key = Some(REDACTED.into());
    }
    toml::to_string_pretty(&shown).context("serializing config")
}
