use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "morse-attack")
    }

    /// The decimal-ASCII high score file.
    pub fn high_score_path() -> Option<PathBuf> {
        Self::project_dirs().map(|pd| pd.data_local_dir().join("morse_hs.txt"))
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|pd| pd.config_dir().join("config.json"))
    }

    /// Per-session result log.
    pub fn log_path() -> Option<PathBuf> {
        Self::project_dirs().map(|pd| pd.config_dir().join("log.csv"))
    }
}
