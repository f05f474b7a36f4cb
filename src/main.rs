//! extractkit CLI
//!
//! Command-line interface for extraction runs

use clap::Parser;
use extractkit::cli::{Cli, Runner};
use extractkit::logging::init_logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let runner = Runner::new(cli);

    let guard = match init_logging(&runner.log_config()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let result = runner.run().await;
    // Flush the log file before exiting
    drop(guard);

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
