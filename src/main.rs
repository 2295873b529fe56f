//! disc-roundtrip - optical media write/read verification.
//!
//! Burns a sample dataset to CD/DVD/BD media and verifies that every file
//! reads back bit-for-bit. All heavy lifting is delegated to the usual
//! system utilities; this binary sequences them and checks their results.

mod cli;
mod config;
mod error;
mod logging;
mod workflow;

use clap::Parser;
use clap::error::ErrorKind;

use cli::Cli;
use config::TesterConfig;
use workflow::DiscRoundTripTester;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            std::process::exit(0);
        }
        Err(e) => {
            // Bad arguments are a failure path, so exit 1 rather than
            // clap's default argument-error code
            let _ = e.print();
            std::process::exit(1);
        }
    };

    logging::init_logging(cli.verbose);

    let config = match TesterConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    log::info!(
        "Testing {} media in {}",
        config.media,
        config.device.display()
    );

    let mut tester = DiscRoundTripTester::new(config);
    if tester.execute().is_err() {
        // The driver has already reported the failure, before cleanup ran
        std::process::exit(1);
    }
    log::info!("Optical round trip verified successfully");
}
