use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "rhophi").map(|pd| pd.config_dir().join("config.json"))
    }

    /// Log file location; stderr belongs to the TUI so logs go to disk
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("rhophi");
            Some(state_dir.join("rhophi.log"))
        } else {
            ProjectDirs::from("", "", "rhophi")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("rhophi.log"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_named_after_the_app() {
        if let Some(p) = AppDirs::log_path() {
            assert_eq!(p.file_name().and_then(|n| n.to_str()), Some("rhophi.log"));
        }
        if let Some(p) = AppDirs::config_path() {
            assert_eq!(p.file_name().and_then(|n| n.to_str()), Some("config.json"));
        }
    }
}
