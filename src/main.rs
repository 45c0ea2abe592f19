//! junban - Dependency-ordered container provisioning
//!
//! Entry point for the junban application.

use clap::Parser;
use junban::cli::{Cli, Commands, ConfigCommands, OutputArgs, RunArgs};
use junban::config::{Config, LogFormat, LogOutput, LoggingConfig};
use junban::container::ContainerSpec;
use junban::daemon::DockerGateway;
use junban::error::exit_code;
use junban::graph::{self, OrderedPlan};
use junban::orchestrator::{Orchestrator, Phase, Presence, RunOptions};
use junban::JunbanError;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // The logging section is honored when the file loads; load errors are
    // reported once logging is up.
    let loaded = Config::load(cli.config.as_deref());
    let logging = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_default();

    if let Err(e) = init_logging(&cli, &logging) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::from(exit_code::GENERAL_ERROR as u8);
    }

    match run(&cli, loaded) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(category = %e.category(), "{}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// Initialize the tracing subscriber from CLI flags and the logging section.
fn init_logging(
    cli: &Cli,
    logging: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let level: tracing::Level = cli.log_level().unwrap_or(logging.level).into();
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match (logging.format, logging.output) {
        (LogFormat::Text, LogOutput::Stdout) => builder.try_init()?,
        (LogFormat::Text, LogOutput::Stderr) => builder.with_writer(std::io::stderr).try_init()?,
        (LogFormat::Json, LogOutput::Stdout) => builder.json().try_init()?,
        (LogFormat::Json, LogOutput::Stderr) => {
            builder.json().with_writer(std::io::stderr).try_init()?
        }
    }

    Ok(())
}

/// Main application logic.
fn run(cli: &Cli, loaded: junban::Result<Config>) -> junban::Result<()> {
    match &cli.command {
        Commands::Create(args) => cmd_run(loaded?, args, Phase::Create),
        Commands::Start(args) => cmd_run(loaded?, args, Phase::Start),
        Commands::Status(args) => cmd_status(loaded?, args),
        Commands::Plan(args) => cmd_plan(loaded?, args),
        Commands::Config(subcmd) => cmd_config(loaded, subcmd),
    }
}

/// Decodes the containers and computes their order.
fn prepare(config: &Config) -> junban::Result<(Vec<ContainerSpec>, OrderedPlan)> {
    let specs = config.container_specs()?;
    let plan = graph::plan(&specs)?;
    Ok((specs, plan))
}

fn runtime() -> junban::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| JunbanError::daemon_with_source("Failed to create async runtime", e))
}

/// Handle the `create` and `start` commands.
fn cmd_run(config: Config, args: &RunArgs, phase: Phase) -> junban::Result<()> {
    let (specs, plan) = prepare(&config)?;

    runtime()?.block_on(async {
        let gateway = Arc::new(DockerGateway::connect(&config.docker).await?);
        let orchestrator = Orchestrator::new(gateway, RunOptions { dry_run: args.dry_run });

        let report = orchestrator.run(&specs, &plan, phase).await;

        if args.dry_run {
            for outcome in &report.outcomes {
                println!("{:<24} {} (dry run)", outcome.name, outcome.result);
            }
            println!("{}", report.summary);
        }

        report.into_result().map(|_| ())
    })
}

/// Handle the `status` command.
fn cmd_status(config: Config, args: &OutputArgs) -> junban::Result<()> {
    let (specs, plan) = prepare(&config)?;

    runtime()?.block_on(async {
        let gateway = Arc::new(DockerGateway::connect(&config.docker).await?);
        let orchestrator = Orchestrator::new(gateway, RunOptions::default());
        let statuses = orchestrator.survey(&specs, &plan).await?;

        if args.json {
            println!("{}", serde_json::to_string_pretty(&statuses)?);
            return Ok(());
        }

        println!("{}", status_row("NAME", "IMAGE", "STATE", "IMAGE-OK"));
        for status in &statuses {
            let state = match status.presence {
                Presence::Missing => "missing",
                Presence::Stopped => "stopped",
                Presence::Running => "running",
            };
            let image = match status.image_matches {
                Some(true) => "ok",
                Some(false) => "mismatch",
                None => "-",
            };
            println!("{}", status_row(&status.name, &status.image, state, image));
        }

        Ok(())
    })
}

/// One line of the `status` table.
fn status_row(name: &str, image: &str, state: &str, image_ok: &str) -> String {
    format!("{:<24} {:<32} {:<10} {}", name, image, state, image_ok)
}

/// Handle the `plan` command.
fn cmd_plan(config: Config, args: &OutputArgs) -> junban::Result<()> {
    let (specs, plan) = prepare(&config)?;
    let names: Vec<&str> = plan.iter().map(|i| specs[i].name.as_str()).collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else {
        for (position, name) in names.iter().enumerate() {
            println!("{:>3}. {}", position + 1, name);
        }
    }

    Ok(())
}

/// Handle the `config` subcommand.
fn cmd_config(loaded: junban::Result<Config>, subcmd: &ConfigCommands) -> junban::Result<()> {
    match subcmd {
        ConfigCommands::Validate => match loaded.and_then(|config| prepare(&config)) {
            Ok((specs, _)) => {
                println!("✓ Configuration is valid ({} containers)", specs.len());
                Ok(())
            }
            Err(e) => {
                println!("✗ Configuration is invalid: {}", e);
                Err(e)
            }
        },
        ConfigCommands::Show => {
            let config = loaded?;
            let yaml = serde_yaml::to_string(&config).map_err(|e| {
                JunbanError::config_with_source("Failed to serialize configuration", e)
            })?;
            println!("{}", yaml);
            Ok(())
        }
    }
}
