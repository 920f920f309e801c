use std::path::PathBuf;

use clap::Subcommand;
use tracing::info;

#[derive(Subcommand)]
pub enum SchemaSubcommands {
    /// Schema of the scenario read by `assign`
    Scenario {
        #[arg(long, short = 'o')]
        out: PathBuf,
    },
    /// Schema of the file written by `assign`
    Output {
        #[arg(long, short = 'o')]
        out: PathBuf,
    },
    /// Schema of the solver parameters file
    Params {
        #[arg(long, short = 'o')]
        out: PathBuf,
    },
}

pub fn run(subcommand: SchemaSubcommands) -> Result<(), anyhow::Error> {
    let (schema, out) = match subcommand {
        SchemaSubcommands::Scenario { out } => {
            (wayfarer_core::json::schema::generate_scenario_schema()?, out)
        }
        SchemaSubcommands::Output { out } => {
            (wayfarer_core::json::schema::generate_output_schema()?, out)
        }
        SchemaSubcommands::Params { out } => {
            (wayfarer_core::json::schema::generate_params_schema()?, out)
        }
    };

    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(&out, schema)?;
    info!("Schema written to {}", out.display());

    Ok(())
}
