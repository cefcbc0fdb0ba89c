use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "wakeful-cli", version, about = "Wakeful CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Alarm definition management
    Alarm {
        #[command(subcommand)]
        action: commands::alarm::AlarmAction,
    },
    /// Show the next occurrence of one or all alarms
    Next {
        /// Alarm id (all active alarms when omitted)
        id: Option<u32>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Drive the alarm lifecycle against simulated backends
    Simulate {
        #[command(subcommand)]
        action: commands::simulate::SimulateAction,
    },
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Alarm { action } => commands::alarm::run(action),
        Commands::Next { id } => commands::next::run(id),
        Commands::Config { action } => commands::config::run(action),
        Commands::Simulate { action } => commands::simulate::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
