use afk_cli::cli::Cli;
use afk_cli::{app, logging};
use clap::Parser;
use tracing::error;

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	if let Err(err) = app::dispatch(cli).await {
		error!(target = "afk", error = %format!("{err:#}"), "command failed");
		std::process::exit(1);
	}
}
