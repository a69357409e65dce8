use std::future::Future;
use std::io;

use tokio::io::{BufWriter, Stdout};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::error::AppError;

/// Reusable CLI application runner that handles:
/// - Signal handling (SIGINT, SIGTERM, SIGHUP) as a cooperative shutdown
/// - Stdout buffering
/// - Exit codes (0 = success, 1 = error, 128 + signal number when interrupted)
pub struct CliApp {
    name: String,
}

impl CliApp {
    /// Create a new CLI application runner
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the application until it finishes or a signal arrives
    ///
    /// `main_fn` receives a token that is cancelled on the first signal and a
    /// buffered stdout writer. After a signal the runner still waits for
    /// `main_fn` to wind down, so it can stop its tasks and write a report.
    ///
    /// This function never returns - it calls std::process::exit with the appropriate code
    pub async fn run<F, Fut>(self, main_fn: F) -> !
    where
        F: FnOnce(CancellationToken, BufWriter<Stdout>) -> Fut,
        Fut: Future<Output = Result<(), AppError>>,
    {
        let code = self.execute(main_fn, wait_for_signal()).await;
        std::process::exit(code);
    }

    /// Race `main_fn` against `signal` and return the process exit code
    async fn execute<F, Fut, S>(&self, main_fn: F, signal: S) -> i32
    where
        F: FnOnce(CancellationToken, BufWriter<Stdout>) -> Fut,
        Fut: Future<Output = Result<(), AppError>>,
        S: Future<Output = io::Result<i32>>,
    {
        let shutdown = CancellationToken::new();
        let main = main_fn(shutdown.clone(), BufWriter::new(tokio::io::stdout()));
        tokio::pin!(main);
        tokio::pin!(signal);

        tokio::select! {
            result = &mut main => self.exit_code(result),
            signal = &mut signal => match signal {
                Ok(code) => {
                    info!(app = %self.name, "Interrupted, shutting down");
                    shutdown.cancel();
                    self.exit_code(main.await);
                    code
                }
                Err(e) => {
                    error!(app = %self.name, error = %e, "Could not install signal handlers");
                    self.exit_code(main.await)
                }
            },
        }
    }

    fn exit_code(&self, result: Result<(), AppError>) -> i32 {
        match result {
            Ok(()) => 0,
            Err(e) => {
                error!(app = %self.name, "Error: {}", e);
                1
            }
        }
    }
}

/// Wait for any Unix signal (SIGINT, SIGTERM, SIGHUP) or Ctrl+C
/// Returns the exit code to use (130 for SIGINT, 143 for SIGTERM, etc.)
async fn wait_for_signal() -> io::Result<i32> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sighup = signal(SignalKind::hangup())?;

        let code = tokio::select! {
            _ = sigterm.recv() => 143, // 128 + 15
            _ = sigint.recv() => 130,  // 128 + 2
            _ = sighup.recv() => 129,  // 128 + 1
        };
        Ok(code)
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok(130)
    }
}
