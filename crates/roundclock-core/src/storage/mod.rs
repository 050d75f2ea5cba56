mod config;
mod session;

pub use config::{Config, TimerConfig, WorkoutConfig};
pub use session::SessionStore;

use std::path::PathBuf;

use crate::error::Result;

/// Returns the data directory, creating it if needed.
///
/// `ROUNDCLOCK_DATA_DIR` wins when set. Otherwise `~/.config/roundclock/`,
/// or `~/.config/roundclock-dev/` with `ROUNDCLOCK_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("ROUNDCLOCK_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("ROUNDCLOCK_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("roundclock-dev")
            } else {
                base_dir.join("roundclock")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
