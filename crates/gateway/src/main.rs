use std::sync::Arc;

use clap::Parser;

use tk_gateway::cli::intent::IntentArgs;
use tk_gateway::cli::{self, Cli, Command, ConfigCommand};
use tk_gateway::{server, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default to serve when no subcommand is given.
        None | Some(Command::Serve) => {
            let (config, _config_path) = cli::load_config()?;
            let tracer_provider = telemetry::init_tracing(&config.observability);
            server::run_server(Arc::new(config), tracer_provider).await
        }
        Some(Command::Doctor) => {
            telemetry::init_cli_tracing();
            let (config, config_path) = cli::load_config()?;
            let passed = cli::doctor::run(&config, &config_path).await?;
            if !passed {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            let (config, config_path) = cli::load_config()?;
            if !cli::config::validate(&config, &config_path) {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let (config, _config_path) = cli::load_config()?;
            cli::config::show(&config)
        }
        Some(Command::Intent {
            user,
            name,
            request_type,
            slots,
            session,
        }) => {
            telemetry::init_cli_tracing();
            let (config, _) = cli::load_config()?;
            let args = IntentArgs {
                user,
                name,
                request_type,
                slots,
                session,
            };
            cli::intent::run(Arc::new(config), args).await
        }
        Some(Command::Version) => {
            println!("takuhai {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
