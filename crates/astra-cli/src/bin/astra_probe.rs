//! CLI tool to exercise a running Astra server.

use astra_cli::ProbeClient;
use clap::{Parser, Subcommand};
use std::time::Duration;

/// Call the Astra server API and print the JSON response
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Astra Server URL
    #[arg(long, env = "ASTRA_URL", default_value = "http://localhost:8000")]
    base_url: String,

    /// Request timeout in seconds (nearby searches can walk several mirrors)
    #[arg(long, default_value_t = 120)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Liveness check
    Health,

    /// Classify a piece of text
    Analyze {
        #[arg(long)]
        text: String,
    },

    /// Police stations and hospitals around a point
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long)]
        radius_m: Option<i64>,
        /// Comma-separated subset of police,hospital
        #[arg(long)]
        categories: Option<String>,
    },

    /// Route between two points
    Route {
        #[arg(long, allow_hyphen_values = true)]
        start_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        start_lon: f64,
        #[arg(long, allow_hyphen_values = true)]
        end_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        end_lon: f64,
        #[arg(long, default_value = "foot")]
        profile: String,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let client = ProbeClient::new(&args.base_url, Duration::from_secs(args.timeout))?;

    let response = match args.command {
        Command::Health => client.health()?,
        Command::Analyze { text } => client.analyze(&text)?,
        Command::Nearby {
            lat,
            lon,
            radius_m,
            categories,
        } => client.nearby(lat, lon, radius_m, categories.as_deref())?,
        Command::Route {
            start_lat,
            start_lon,
            end_lat,
            end_lon,
            profile,
        } => client.route((start_lat, start_lon), (end_lat, end_lon), &profile)?,
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
