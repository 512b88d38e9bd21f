// src/main.rs — toxamp entry point

use clap::Parser;

use toxamp::cli::Cli;
use toxamp::infra::logger;

#[tokio::main]
async fn main() {
    // Credentials may live in a local .env file
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logger::init_logging(logger::level_for_verbosity(cli.verbose, cli.quiet));

    if let Err(e) = toxamp::cli::run::run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
