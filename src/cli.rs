use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

use crate::config::{DatasetArgs, QueryLimits};
use commands::{inspect, render, serve, RenderFormat};

#[derive(Parser)]
#[command(name = "gridload")]
#[command(about = "Electricity demand dashboard backend with CLI tools and web server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        #[command(flatten)]
        dataset: DatasetArgs,

        #[command(flatten)]
        limits: QueryLimits,

        /// Bind address for the web server
        ///
        /// Format: IP:PORT (e.g., 0.0.0.0:3000, 127.0.0.1:8080)
        #[arg(short, long, env = "BIND_ADDRESS", default_value = "0.0.0.0:3000")]
        bind_address: String,
    },
    /// Open the dataset and print its zones and time coverage as JSON
    Inspect {
        #[command(flatten)]
        dataset: DatasetArgs,
    },
    /// Compute one chart and write it to a file
    ///
    /// Examples:
    ///   gridload render --zones ES,NL --start 2020-01-01 --days 2 --output chart.html
    ///   gridload render --mode stacked --format json --output chart.json
    Render {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Comma separated zone codes
        #[arg(short, long, default_value = "ES,NL")]
        zones: String,

        /// Window start (YYYY-MM-DD, YYYY-MM-DDTHH:MM[:SS] or RFC 3339)
        #[arg(short, long, default_value = "2020-01-01")]
        start: String,

        /// Window length in days (1 to 7)
        #[arg(short, long, default_value_t = 1)]
        days: i64,

        /// Chart mode: raw, scaled-range, scaled-total or stacked
        #[arg(short, long, default_value = "raw")]
        mode: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = RenderFormat::Html)]
        format: RenderFormat,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Serve { dataset, limits, bind_address } => {
                serve(&dataset, &limits, &bind_address).await?;
            }
            Commands::Inspect { dataset } => {
                inspect(&dataset)?;
            }
            Commands::Render { dataset, zones, start, days, mode, format, output } => {
                render(&dataset, &zones, &start, days, &mode, format, &output)?;
            }
        }
        Ok(())
    }
}
