use clap::Parser;
use tokio::io::{BufWriter, Stdout};
use tokio_util::sync::CancellationToken;
use tracing::{Level, info};

use banknet::prelude::*;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.debug);

    CliApp::new("banknet")
        .run(|shutdown, writer| run_simulation(args, shutdown, writer))
        .await
}

/// Logs go to stderr so stdout only carries the CSV summary
fn init_tracing(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Build the network, run it and report what happened
async fn run_simulation(
    args: Args,
    shutdown: CancellationToken,
    mut writer: BufWriter<Stdout>,
) -> Result<(), AppError> {
    let config = SimulationConfig::try_from(args)?;
    info!(
        total_time = config.total_time,
        debug = config.debug,
        "Simulation parameters loaded"
    );

    let summary = Simulation::new(config)?.run(shutdown).await;

    summary.log();
    summary.write_csv(&mut writer).await?;

    Ok(())
}
