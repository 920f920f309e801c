use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;

use crate::{
    assign::AssignArgs, distributions::DistributionsArgs, schema::SchemaSubcommands,
};

mod assign;
mod distributions;
mod file_utils;
mod schema;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long, env = "WAYFARER_DEBUG")]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign destinations to the secondary activities of a scenario
    Assign {
        #[command(flatten)]
        args: AssignArgs,
    },
    /// Build distance distributions from survey trips
    Distributions {
        #[command(flatten)]
        args: DistributionsArgs,
    },
    /// Export JSON schemas of the input and output files
    Schema {
        #[command(subcommand)]
        commands: SchemaSubcommands,
    },
}

fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Some(Commands::Assign { args }) => assign::run(args)?,
        Some(Commands::Distributions { args }) => distributions::run(args)?,
        Some(Commands::Schema { commands }) => schema::run(commands)?,
        None => {}
    }

    Ok(())
}
