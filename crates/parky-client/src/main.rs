//! Parky CLI - Command-line access to the Parky API
//!
//! Usage:
//!   parky register <username> <password>
//!   parky login <username> <password>
//!   parky parks list
//!   parky trails in-park <id>

use anyhow::Context;
use chrono::{NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use parky_client::ParkyClient;
use parky_core::NationalParkDto;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "parky")]
#[command(about = "National parks and trails API client")]
#[command(version)]
struct Cli {
    /// API base URL
    #[arg(long, env = "PARKY_URL", default_value = "http://localhost:8080")]
    url: String,

    /// Bearer token from a previous login
    #[arg(long, env = "PARKY_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register { username: String, password: String },
    /// Authenticate and print the issued token
    Login { username: String, password: String },
    /// National park operations
    Parks {
        #[command(subcommand)]
        action: ParkAction,
    },
    /// Trail operations
    Trails {
        #[command(subcommand)]
        action: TrailAction,
    },
}

#[derive(Subcommand)]
enum ParkAction {
    List,
    Get { id: i32 },
    /// Create a park (admin only)
    Create {
        name: String,
        state: String,
        /// Establishment date, YYYY-MM-DD
        established: NaiveDate,
    },
    /// Delete a park (admin only)
    Delete { id: i32 },
}

#[derive(Subcommand)]
enum TrailAction {
    List,
    /// Fetch one trail (admin only)
    Get { id: i32 },
    /// Trails belonging to a national park
    InPark { national_park_id: i32 },
    /// Delete a trail (admin only)
    Delete { id: i32 },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut client = ParkyClient::new(&cli.url);
    if let Some(token) = cli.token {
        client = client.with_token(token);
    }

    match cli.command {
        Commands::Register { username, password } => {
            let user = client.register(&username, &password).await?;
            print_json(&user)?;
        }
        Commands::Login { username, password } => {
            let issued = client.authenticate(&username, &password).await?;
            eprintln!("Token expires at {}", issued.expires_at);
            println!("{}", issued.token);
        }
        Commands::Parks { action } => match action {
            ParkAction::List => print_json(&client.list_national_parks().await?)?,
            ParkAction::Get { id } => print_json(&client.get_national_park(id).await?)?,
            ParkAction::Create {
                name,
                state,
                established,
            } => {
                let midnight = established
                    .and_hms_opt(0, 0, 0)
                    .context("invalid establishment date")?;
                let park = NationalParkDto {
                    id: 0,
                    name,
                    state,
                    created: None,
                    established: Utc.from_utc_datetime(&midnight),
                };
                print_json(&client.create_national_park(&park).await?)?;
            }
            ParkAction::Delete { id } => {
                client.delete_national_park(id).await?;
                println!("Deleted national park {id}");
            }
        },
        Commands::Trails { action } => match action {
            TrailAction::List => print_json(&client.list_trails().await?)?,
            TrailAction::Get { id } => print_json(&client.get_trail(id).await?)?,
            TrailAction::InPark { national_park_id } => {
                print_json(&client.trails_in_national_park(national_park_id).await?)?
            }
            TrailAction::Delete { id } => {
                client.delete_trail(id).await?;
                println!("Deleted trail {id}");
            }
        },
    }

    Ok(())
}
