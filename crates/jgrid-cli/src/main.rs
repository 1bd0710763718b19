use clap::Parser;
use jgrid_cli::cli::{Cli, Commands};
use std::io;
use tracing::error;
use tracing_subscriber::FmtSubscriber;

mod commands;
mod common;

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    if let Err(e) = run(&cli) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = common::load_config(cli.config_file.as_deref());

    match &cli.command {
        Commands::Info { input } => commands::info::handle(input, &config),
        Commands::Impedance { input, seed, model } => {
            commands::impedance::handle(input, &config, *seed, *model)
        }
        Commands::Stats { input, format } => commands::stats::handle(input, &config, *format),
        Commands::Export { input, format, out } => {
            commands::export::handle(input, &config, *format, out)
        }
        Commands::Graph { command } => commands::graph::handle(command, &config),
        Commands::Config { command } => commands::config::handle(command, &config),
        Commands::Completions { shell, out } => {
            commands::completions::handle(*shell, out.as_deref())
        }
    }
}
