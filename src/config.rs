use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "MediLens";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the data directory.
pub const HOME_ENV_VAR: &str = "MEDILENS_HOME";

/// Upload size policy: 5MB, enforced before text acquisition.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// How often the reminder watcher compares the clock against reminder times.
pub const REMINDER_CHECK_INTERVAL_SECS: u64 = 60;

/// Get the application data directory.
/// `$MEDILENS_HOME` when set, otherwise ~/MediLens/.
pub fn app_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(HOME_ENV_VAR).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_NAME)
}

/// SQLite database holding users, reports, medications and emergencies.
pub fn database_path() -> PathBuf {
    app_data_dir().join("medilens.db")
}

/// Root of the uploaded report file store.
pub fn reports_dir() -> PathBuf {
    app_data_dir().join("reports")
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "medilens=debug,medilens_lib=debug"
    } else {
        "medilens=info,medilens_lib=info"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_under_app_data() {
        let db = database_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with("medilens.db"));
    }

    #[test]
    fn reports_dir_under_app_data() {
        let reports = reports_dir();
        assert!(reports.starts_with(app_data_dir()));
        assert!(reports.ends_with("reports"));
    }

    #[test]
    fn upload_limit_is_five_megabytes() {
        assert_eq!(MAX_UPLOAD_BYTES, 5_242_880);
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn log_filter_targets_crate() {
        assert!(default_log_filter().contains("medilens_lib="));
    }
}
