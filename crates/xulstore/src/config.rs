//! Store configuration.

use std::path::PathBuf;

/// Default filename of the backing file inside the profile directory.
pub const STORE_FILENAME: &str = "xulstore.json";

/// Delay between the first mutation of a dirty window and the disk write.
const WRITE_DELAY_MS: u64 = 30_000;

/// Shorter delay for debug builds and tests.
const DEBUG_WRITE_DELAY_MS: u64 = 3_000;

/// Configuration for a [`crate::XulStore`].
///
/// Constructed by the host and passed in explicitly; there is no global
/// configuration source.
#[derive(Debug, Clone)]
pub struct XulStoreConfig {
    /// Path of the backing JSON file.
    pub path: PathBuf,
    /// Write-delay timer duration in milliseconds.
    pub write_delay_ms: u64,
}

impl XulStoreConfig {
    /// Configuration for the default backing file inside `profile_dir`.
    pub fn new(profile_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: profile_dir.into().join(STORE_FILENAME),
            write_delay_ms: WRITE_DELAY_MS,
        }
    }

    /// Like [`XulStoreConfig::new`] but with the shorter debug write delay.
    pub fn debug(profile_dir: impl Into<PathBuf>) -> Self {
        Self {
            write_delay_ms: DEBUG_WRITE_DELAY_MS,
            ..Self::new(profile_dir)
        }
    }

    /// Configuration pointing at an exact backing-file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_delay_ms: WRITE_DELAY_MS,
        }
    }

    /// Override the write delay.
    pub fn with_write_delay_ms(mut self, ms: u64) -> Self {
        self.write_delay_ms = ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_appends_default_filename() {
        let config = XulStoreConfig::new("/profile");
        assert_eq!(config.path, PathBuf::from("/profile/xulstore.json"));
        assert_eq!(config.write_delay_ms, 30_000);
    }

    #[test]
    fn debug_shortens_write_delay() {
        let config = XulStoreConfig::debug("/profile");
        assert_eq!(config.write_delay_ms, 3_000);
    }

    #[test]
    fn with_path_uses_exact_path() {
        let config = XulStoreConfig::with_path("/elsewhere/state.json");
        assert_eq!(config.path, PathBuf::from("/elsewhere/state.json"));
    }

    #[test]
    fn write_delay_override() {
        let config = XulStoreConfig::new("/profile").with_write_delay_ms(50);
        assert_eq!(config.write_delay_ms, 50);
    }
}
