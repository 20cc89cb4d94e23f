use clap::{Parser, Subcommand};
use depsync::{
    commands::{
        config::{self, ConfigAction},
        status::{self, StatusCommand},
        sync::{self, SyncCommand},
        versions::{self, VersionsCommand},
    },
    common::GlobalOpts,
    errors::CliError,
};
use depsync_logger as logger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "depsync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Frontend dependency reconciler",
    long_about = "depsync keeps a project's package.json in step with the dependency versions its platform ships, without overwriting versions you pinned yourself."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the platform defaults into package.json
    Sync(SyncCommand),
    /// Show what a sync would change, without writing
    Status(StatusCommand),
    /// Write the versions lock for the current manifest
    Versions(VersionsCommand),
    /// Configure depsync
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

fn init_tracing(verbosity: u8, quiet: bool) {
    let default_filter = if quiet {
        "error"
    } else {
        logger::verbosity_to_filter()
    };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("depsync={0},depsync_manifest={0}", default_filter).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(verbosity > 1)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level(), cli.global.no_stdout) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing(cli.global.verbosity_level(), cli.global.quiet);

    let result: Result<(), CliError> = match cli.command {
        Commands::Sync(cmd) => sync::handle_sync(cmd, &cli.global),
        Commands::Status(cmd) => status::handle_status(cmd, &cli.global),
        Commands::Versions(cmd) => versions::handle_versions(cmd, &cli.global),
        Commands::Config { action } => config::handle_config(action, &cli.global),
    };

    if let Err(e) = result {
        logger::spinner_stop();
        logger::error(&e.to_string());
        if cli.global.verbosity_level() > 0 {
            logger::show_log_path();
        }
        std::process::exit(1);
    }
}
