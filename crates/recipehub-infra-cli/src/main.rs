#![warn(rust_2018_idioms, unused_lifetimes)]
use clap::{CommandFactory, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod list;
mod synth;

use list::List;
use synth::Synth;

/// Declare the RecipeHub backend on AWS Lambda and synthesize it into a cloud assembly
#[derive(Parser)]
#[command(name = "recipehub-infra", disable_version_flag = true)]
struct App {
    #[command(subcommand)]
    subcommand: Option<InfraSubcommand>,
    /// Enable logs in any subcommand. Use `-v` for debug logs, and `-vv` for trace logs
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Print version information
    #[arg(short = 'V', long)]
    version: bool,
}

#[derive(Clone, Debug, Subcommand)]
enum InfraSubcommand {
    /// Synthesize the backend stack into a CloudFormation cloud assembly
    Synth(Synth),
    /// List the stacks declared by this app
    #[command(visible_alias = "ls")]
    List(List),
}

impl InfraSubcommand {
    fn run(self) -> Result<()> {
        match self {
            Self::Synth(s) => s.run(),
            Self::List(l) => l.run(),
        }
    }
}

fn print_version() -> Result<()> {
    println!("recipehub-infra {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}

fn print_help() -> Result<()> {
    App::command().print_help().into_diagnostic()
}

fn main() -> Result<()> {
    let app = App::parse();

    if app.version {
        return print_version();
    }

    let subcommand = match app.subcommand {
        None => return print_help(),
        Some(subcommand) => subcommand,
    };

    let log_directive = if app.verbose == 0 {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "recipehub_infra=info".into())
    } else if app.verbose == 1 {
        "recipehub_infra=debug".into()
    } else {
        "recipehub_infra=trace".into()
    };

    // stdout is reserved for the template
    let fmt = tracing_subscriber::fmt::layer()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(log_directive))
        .with(fmt)
        .init();

    subcommand.run()
}
