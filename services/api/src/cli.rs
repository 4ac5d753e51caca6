use crate::demo::{run_demo, run_mortgage, run_walkability, DemoArgs, MortgageArgs, WalkabilityArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use listing_insights::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Listing Insights",
    about = "Mortgage, market position and walkability insights for property listings",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Calculate a payment breakdown, sweep and affordability for one price
    Mortgage(MortgageArgs),
    /// Score walkability from amenity distances
    Walkability(WalkabilityArgs),
    /// Walk through every insight for the bundled demo listings
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Mortgage(args) => run_mortgage(args),
        Command::Walkability(args) => run_walkability(args),
        Command::Demo(args) => run_demo(args),
    }
}
