//! # countdown demo
//!
//! Prints a configurable message a configurable number of times. Exists to
//! exercise inimap end to end: discovery, loading, and the `config`
//! subcommands.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example countdown -- run
//! cargo run --example countdown -- config gen -o countdown.ini
//! cargo run --example countdown -- config set iterations_number 5
//! cargo run --example countdown -- config get output.prefix
//! RUST_LOG=inimap=trace cargo run --example countdown -- run
//! ```
//!
//! The config file is `countdown.ini`, searched in the platform config
//! directory and then the working directory (the working directory wins).
//! `config set` writes to the working directory.

mod config;

use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use inimap::{ConfigArgs, IniConfig, IniConfigBuilder, SearchPath};

use config::CountdownConfig;

/// countdown: print a message in a loop, configured from an INI file.
#[derive(Parser, Debug)]
#[command(name = "countdown")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the countdown.
    Run {
        /// Skip the sleep between messages.
        #[arg(long)]
        no_sleep: bool,
    },
    /// Manage the configuration file (list, gen, get, set).
    Config(ConfigArgs),
}

fn make_builder() -> IniConfigBuilder<CountdownConfig> {
    IniConfig::builder()
        .app_name("countdown")
        .search_paths(vec![SearchPath::Platform, SearchPath::Cwd])
        .persist_path(SearchPath::Cwd)
}

fn run(config: &CountdownConfig, no_sleep: bool) {
    for i in 1..=config.iterations_number {
        let mut line = format!("{}{}", config.output.prefix, config.message.replace("{n}", &i.to_string()));
        if config.output.uppercase {
            line = line.to_uppercase();
        }
        println!("{line}");
        if !no_sleep {
            thread::sleep(Duration::from_secs(config.sleep));
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let builder = make_builder();

    match cli.command {
        Commands::Run { no_sleep } => {
            let config = builder.load().unwrap_or_else(|e| {
                eprintln!("Failed to load config:\n{e}");
                std::process::exit(1);
            });
            run(&config, no_sleep);
        }
        Commands::Config(args) => {
            let action = args.into_action();
            builder.handle_and_print(&action).unwrap_or_else(|e| {
                eprintln!("Config error:\n{e}");
                std::process::exit(1);
            });
        }
    }
}
