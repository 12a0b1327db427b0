pub mod config;
pub mod models;
pub mod db;
pub mod pipeline;
pub mod reminders; // Medication schedules + background watcher
pub mod emergency; // Patient alerts, doctor acknowledgement
pub mod appointments;

use tracing_subscriber::EnvFilter;

/// Initialize tracing. `RUST_LOG` wins over the build-dependent default.
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();

    tracing::debug!("{} v{} logging initialized", config::APP_NAME, config::APP_VERSION);
}
