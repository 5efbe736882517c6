//! aerosurf CLI: meshing, deformation, benchmarking and input validation.

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

#[derive(Parser)]
#[command(name = "aerosurf")]
#[command(version, about = "aerosurf: surface meshing and deformation for panel-method aerodynamics")]
struct Cli {
    /// Log verbosity (trace, debug, info, warn, error).
    #[arg(short, long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mesh every surface of a model and report the result.
    Mesh {
        /// Path to the model (JSON).
        #[arg(short, long)]
        input: String,

        /// Meshing configuration (TOML); defaults apply when omitted.
        #[arg(short, long)]
        config: Option<String>,

        /// Write the mesh summary (JSON) here.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Mesh one surface and apply a structural displacement field to it.
    Deform {
        /// Path to the model (JSON).
        #[arg(short, long)]
        input: String,

        /// Name of the surface to deform.
        #[arg(short, long)]
        surface: String,

        /// Displacement grid (JSON).
        #[arg(short, long)]
        fem: String,

        /// Meshing configuration (TOML).
        #[arg(short, long)]
        config: Option<String>,

        /// Write the deformed lattice (JSON) here.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Run benchmark suite.
    Benchmark {
        /// Which scenario to run (flat_wing, thick_wing, fuselage, bent_wing, all).
        #[arg(short, long, default_value = "all")]
        scenario: String,

        /// Output CSV file path.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Validate a configuration (.toml) or model (.json) file.
    Validate {
        /// Path to the file.
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Mesh {
            input,
            config,
            output,
        } => commands::mesh(&input, config.as_deref(), output.as_deref()),
        Commands::Deform {
            input,
            surface,
            fem,
            config,
            output,
        } => commands::deform(&input, &surface, &fem, config.as_deref(), output.as_deref()),
        Commands::Benchmark { scenario, output } => {
            commands::benchmark(&scenario, output.as_deref())
        }
        Commands::Validate { path } => commands::validate(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
