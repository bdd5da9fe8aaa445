use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, shells};
use scwctl_core::Config;
use tracing::{debug, error, info, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod connection;
mod error;
mod output;

use cli::{Cli, Commands};
use commands::CommandContext;
use connection::ConnectionManager;
use error::ScwCtlError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let (config, config_path) = if let Some(config_file) = &cli.config_file {
        let path = std::path::PathBuf::from(config_file);
        debug!("Loading config from explicit path: {:?}", path);
        match Config::load_from_path(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => fail(e.into()),
        }
    } else {
        debug!("Loading config from default location");
        match Config::load() {
            Ok(config) => (config, None),
            Err(e) => fail(e.into()),
        }
    };
    let conn_mgr = ConnectionManager::with_config_path(config, config_path);

    if let Err(e) = execute_command(&cli, &conn_mgr).await {
        fail(e);
    }

    Ok(())
}

fn fail(err: ScwCtlError) -> ! {
    err.print_diagnostic();
    std::process::exit(1);
}

fn init_tracing(verbose: u8) {
    // RUST_LOG wins over -v
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "scwctl=warn,scwctl_core=warn",
            1 => "scwctl=info,scwctl_core=info",
            2 => "scwctl=debug,scwctl_core=debug",
            _ => "scwctl=trace,scwctl_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

async fn execute_command(cli: &Cli, conn_mgr: &ConnectionManager) -> Result<(), ScwCtlError> {
    trace!("Executing command: {:?}", cli.command);
    info!("Command: {}", format_command(&cli.command));

    let ctx = CommandContext {
        conn_mgr,
        profile: cli.profile.as_deref(),
        output: cli.output,
        query: cli.query.as_deref(),
    };

    let start = std::time::Instant::now();
    let result = match &cli.command {
        Commands::Version => {
            debug!("Showing version information");
            match cli.output {
                cli::OutputFormat::Json | cli::OutputFormat::Yaml => {
                    let output_data = serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION"),
                        "name": env!("CARGO_PKG_NAME"),
                    });
                    output::print_output(
                        &output_data,
                        output::OutputFormat::resolve(cli.output),
                        None,
                    )
                }
                _ => {
                    println!("scwctl {}", env!("CARGO_PKG_VERSION"));
                    Ok(())
                }
            }
        }
        Commands::Completions { shell } => {
            debug!("Generating completions for {:?}", shell);
            generate_completions(*shell);
            Ok(())
        }
        Commands::Profile(cmd) => commands::profile::handle_profile_command(cmd, &ctx),
        Commands::Api { method, path, data } => {
            info!(
                "API call: {} {} {}",
                method,
                path,
                if data.is_some() { "with data" } else { "no data" }
            );
            commands::api::handle_api_command(&ctx, *method, path, data.as_deref()).await
        }
        Commands::Block(cmd) => commands::block::handle_block_command(cmd, &ctx).await,
        Commands::Container(cmd) => {
            commands::container::handle_container_command(cmd, &ctx).await
        }
        Commands::Instance(cmd) => commands::instance::handle_instance_command(cmd, &ctx).await,
        Commands::Sweep(args) => commands::sweep::handle_sweep_command(args, &ctx).await,
    };

    let duration = start.elapsed();
    match &result {
        Ok(_) => info!("Command completed successfully in {:?}", duration),
        Err(e) => error!("Command failed after {:?}: {}", duration, e),
    }

    result
}

/// Generate shell completions
fn generate_completions(shell: cli::Shell) {
    let mut cmd = cli::Cli::command();
    let name = cmd.get_name().to_string();

    match shell {
        cli::Shell::Bash => generate(shells::Bash, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Zsh => generate(shells::Zsh, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Fish => generate(shells::Fish, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::PowerShell => {
            generate(shells::PowerShell, &mut cmd, name, &mut std::io::stdout())
        }
        cli::Shell::Elvish => generate(shells::Elvish, &mut cmd, name, &mut std::io::stdout()),
    }
}

/// Format command for human-readable logging (without sensitive data)
fn format_command(command: &Commands) -> String {
    match command {
        Commands::Version => "version".to_string(),
        Commands::Completions { shell } => format!("completions {:?}", shell),
        Commands::Profile(cmd) => {
            use cli::ProfileCommands::*;
            match cmd {
                List => "profile list".to_string(),
                Path => "profile path".to_string(),
                Show { name } => format!("profile show {}", name.as_deref().unwrap_or("<active>")),
                Set { name, .. } => format!("profile set {} [credentials redacted]", name),
                Remove { name } => format!("profile remove {}", name),
                Use { name } => format!("profile use {}", name),
            }
        }
        Commands::Api { method, path, .. } => format!("api {} {}", method, path),
        Commands::Block(cmd) => format!("block {:?}", cmd),
        Commands::Container(cmd) => format!("container {:?}", cmd),
        Commands::Instance(cmd) => format!("instance {:?}", cmd),
        Commands::Sweep(args) => format!("sweep {:?}", args.target),
    }
}
