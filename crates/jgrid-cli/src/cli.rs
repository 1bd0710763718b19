use clap::{CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap_complete::Shell;
use jgrid_algo::ImpedanceModel;
use jgrid_io::ExportFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "jgrid", author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    /// JSON configuration file (partial files are merged over the defaults)
    #[arg(long = "config", global = true, value_hint = ValueHint::FilePath)]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Input table overrides shared by the analysis commands.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Capacity table (operator,capacity_gw); overrides data.capacity_csv
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub capacity_csv: Option<PathBuf>,

    /// Connection table (from,to); overrides data.connections_csv
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub connections_csv: Option<PathBuf>,
}

/// Output format for console reports.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned text table
    #[default]
    Table,
    /// JSON document
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show operators, capacities and interconnections
    Info {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Synthesize and print the impedance matrix
    Impedance {
        #[command(flatten)]
        input: InputArgs,
        /// Random seed (default: analysis.seed)
        #[arg(long)]
        seed: Option<u64>,
        /// Impedance model: capacity-weighted or uniform (default: analysis.impedance_model)
        #[arg(long)]
        model: Option<ImpedanceModel>,
    },
    /// Topology statistics and centralities
    Stats {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Export the full analysis snapshot
    Export {
        #[command(flatten)]
        input: InputArgs,
        /// json or csv
        #[arg(long, default_value = "json")]
        format: ExportFormat,
        /// Output file (for csv, the stem of <stem>_impedance.csv and <stem>_nodes.csv)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: PathBuf,
    },
    /// Graph utilities
    Graph {
        #[command(subcommand)]
        command: GraphCommands,
    },
    /// Inspect or write configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum GraphCommands {
    /// List connected components
    Islands {
        #[command(flatten)]
        input: InputArgs,
        /// Print the island of every operator
        #[arg(long)]
        emit: bool,
    },
    /// Export the network as Graphviz DOT
    Dot {
        #[command(flatten)]
        input: InputArgs,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Export the network as GraphML
    Graphml {
        #[command(flatten)]
        input: InputArgs,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Print one value by dot-separated key (e.g. analysis.seed)
    Get { key: String },
    /// Write the effective configuration to a file
    Save { path: PathBuf },
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
