use anyhow::{Context, Result};
use tracing::{error, info};

use slotcheck::cli;
use slotcheck::{BusinessHoursConfig, BusinessHoursValidator};

fn main() -> Result<()> {
    let args = cli::parse_args();

    if args.help {
        cli::print_help();
        return Ok(());
    }

    // Initialize logging; stdout is reserved for the JSON answer
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("slotcheck=info".parse().context("invalid log directive")?),
        )
        .init();

    info!("slotcheck v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = BusinessHoursConfig::from_env()?;
    info!("Configuration loaded");
    info!("  Timezone: {}", config.timezone);
    info!("  Opening hours: {}-{}", config.start_time, config.end_time);
    info!("  Slot duration: {} min", config.slot_duration);

    // Handle --validate mode
    if args.validate {
        info!("Validating configuration...");
        match config.validate() {
            Ok(()) => {
                info!("Configuration is valid");
                return Ok(());
            }
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        }
    }

    let Some(query) = args.query else {
        cli::print_help();
        return Ok(());
    };

    let validator = BusinessHoursValidator::new(config);
    info!("Business hours: {}", validator.describe());

    let answer = cli::run_query(&validator, &query);
    println!("{}", serde_json::to_string_pretty(&answer)?);

    Ok(())
}
