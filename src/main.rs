use brand_scan::{ScanError, Scanner};
use clap::Parser;
use serde::Serialize;
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let config = match args.scan_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    ::log::info!("Starting brand scan for: {}", args.url);
    ::log::debug!("Using WebDriver at {}", config.webdriver_url);

    let scanner = match Scanner::new(config) {
        Ok(scanner) => scanner,
        Err(e) => {
            ::log::error!("Failed to set up scanner: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let start_time = std::time::Instant::now();
    let outcome = if args.product {
        scanner.scrape_product(&args.url).await.and_then(to_json)
    } else if args.extended {
        scanner.scan_extended(&args.url).await.and_then(to_json)
    } else {
        scanner.scan(&args.url).await.and_then(to_json)
    };

    match outcome {
        Ok(json) => {
            println!("{}", json);
            ::log::info!(
                "Scan complete in {:.2} seconds",
                start_time.elapsed().as_secs_f64()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            ::log::error!("Scan of {} failed: {}", args.url, e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

fn to_json<T: Serialize>(value: T) -> Result<String, ScanError> {
    serde_json::to_string_pretty(&value).map_err(|e| ScanError::Internal(e.to_string()))
}
