#[macro_use]
extern crate lazy_static;

use std::env;

use anyhow::Result;
use clap::{ArgEnum, CommandFactory, Parser, Subcommand};
use reqwest::Url;
use strum::Display;

mod completion;
mod get;
mod refresh;
mod status;
mod utils;

struct AppConfig {
    base_url: Url,
}

lazy_static! {
    static ref CONFIG: AppConfig = AppConfig {
        base_url: match env::var("DASHBOARD_URL") {
            Ok(url) => Url::parse(url.as_str()).unwrap(),
            Err(_) => Url::parse("http://127.0.0.1:8080/").unwrap(),
        }
    };
}

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get aggregated GPU resources
    Get(get::Arg),
    /// Show the refresh status of the dashboard
    Status(status::Arg),
    /// Trigger a refresh tick
    Refresh(refresh::Arg),
    /// Generate shell completion
    Completion(completion::Arg),
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ArgEnum, Display)]
#[strum(serialize_all = "lowercase")]
enum ResourceKind {
    Nodes,
    Pods,
    Hardware,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Get(arg) => arg.handle()?,
        Commands::Status(arg) => arg.handle()?,
        Commands::Refresh(arg) => arg.handle()?,
        Commands::Completion(arg) => arg.handle(&mut Cli::command())?,
    }

    Ok(())
}
