use std::time::Duration;

use clap::Parser;

use super::error::AppError;

/// Command-line arguments of the simulator
#[derive(Parser, Debug, Clone)]
#[command(name = "banknet")]
#[command(version, about = "Concurrent multi-bank payment settlement simulator", long_about = None)]
pub struct Args {
    /// Real seconds per simulated time unit
    #[arg(short = 'u', long, default_value_t = 0.1)]
    pub time_unit: f64,

    /// Length of the simulation, in time units
    #[arg(short = 't', long, default_value_t = 100)]
    pub total_time: u32,

    /// Payment processors per bank
    #[arg(short, long, default_value_t = 4)]
    pub workers: usize,

    /// Client accounts opened in each bank before the run
    #[arg(short, long, default_value_t = 10)]
    pub accounts: usize,

    /// Seed for reproducible balances and traffic
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log at DEBUG level
    #[arg(short, long)]
    pub debug: bool,
}

/// Time units spent on each settlement
const PROCESSING_UNITS: u32 = 3;

/// Validated run parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub time_unit: Duration,
    pub total_time: u32,
    pub workers_per_bank: usize,
    pub accounts_per_bank: usize,
    pub seed: Option<u64>,
    pub debug: bool,
}

impl SimulationConfig {
    /// Wall-clock length of the run
    pub fn duration(&self) -> Duration {
        self.time_unit.saturating_mul(self.total_time)
    }

    /// Simulated latency of one settlement
    pub fn processing_delay(&self) -> Duration {
        self.time_unit.saturating_mul(PROCESSING_UNITS)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_unit: Duration::from_millis(100),
            total_time: 100,
            workers_per_bank: 4,
            accounts_per_bank: 10,
            seed: None,
            debug: false,
        }
    }
}

impl TryFrom<Args> for SimulationConfig {
    type Error = AppError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        if !args.time_unit.is_finite() || args.time_unit <= 0.0 {
            return Err(AppError::InvalidArguments(format!(
                "time unit must be a positive number of seconds, got {}",
                args.time_unit
            )));
        }
        if args.workers == 0 {
            return Err(AppError::InvalidArguments(
                "at least one worker per bank is required".to_string(),
            ));
        }

        let time_unit = Duration::try_from_secs_f64(args.time_unit)
            .map_err(|e| AppError::InvalidArguments(format!("time unit: {e}")))?;
        if time_unit.checked_mul(args.total_time.max(PROCESSING_UNITS)).is_none() {
            return Err(AppError::InvalidArguments(format!(
                "{} time units of {}s overflow the run length",
                args.total_time, args.time_unit
            )));
        }

        Ok(Self {
            time_unit,
            total_time: args.total_time,
            workers_per_bank: args.workers,
            accounts_per_bank: args.accounts,
            seed: args.seed,
            debug: args.debug,
        })
    }
}
