// ~/mylivewallpaper/widget-center/src/paths.rs

use std::{
    env,
    path::{Path, PathBuf},
};

pub const APP_DIR_NAME: &str = "MyLiveWallpaper";

pub fn user_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows shells rarely export HOME
    env::var("USERPROFILE").ok().map(PathBuf::from)
}

/// `~/Library/Application Support/MyLiveWallpaper`. The widget config, the
/// widgets and the log file all live here.
pub fn app_support_dir() -> Option<PathBuf> {
    user_home_dir().map(|home| {
        home.join("Library")
            .join("Application Support")
            .join(APP_DIR_NAME)
    })
}

pub fn widgets_dir() -> Option<PathBuf> {
    app_support_dir().map(|p| p.join("widgets"))
}

pub fn widget_config_file() -> Option<PathBuf> {
    app_support_dir().map(|p| p.join("widgets.json"))
}

/// Directory holding the running executable, skipping a trailing `bin/`.
pub fn install_root_dir() -> Option<PathBuf> {
    let exe_path = env::current_exe().ok()?;
    let exe_dir = exe_path.parent()?;

    if exe_dir.file_name().and_then(|n| n.to_str()) == Some("bin") {
        return exe_dir.parent().map(Path::to_path_buf);
    }

    Some(exe_dir.to_path_buf())
}

/// First existing `config.yaml` next to the executable, in the app support
/// dir, or in the working directory. Falls back to the app support location,
/// which is where bootstrap scaffolds one.
pub fn center_config_path() -> PathBuf {
    let candidates = [
        install_root_dir().map(|p| p.join("config.yaml")),
        app_support_dir().map(|p| p.join("config.yaml")),
        Some(PathBuf::from("config.yaml")),
    ];

    for candidate in candidates.iter().flatten() {
        if candidate.exists() {
            return candidate.clone();
        }
    }

    app_support_dir()
        .map(|p| p.join("config.yaml"))
        .unwrap_or_else(|| PathBuf::from("config.yaml"))
}

pub fn log_file_path() -> PathBuf {
    app_support_dir()
        .map(|p| p.join("widget-center.log"))
        .unwrap_or_else(|| PathBuf::from("widget-center.log"))
}
