use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "glance")
    }

    pub fn settings_path() -> PathBuf {
        Self::project()
            .map(|pd| pd.config_dir().join("settings.json"))
            .unwrap_or_else(|| PathBuf::from("glance_settings.json"))
    }

    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("glance");
            Some(state_dir.join("glance.log"))
        } else {
            Self::project().map(|pd| pd.data_local_dir().join("glance.log"))
        }
    }
}
