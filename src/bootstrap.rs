// ~/mylivewallpaper/widget-center/src/bootstrap.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::{app_support_dir, widgets_dir};
use crate::{info, warn, DEBUG_NAME};

const DEFAULT_CONFIG_YAML: &str = r#"debug: false
log_level: warn

api:
  base_url: "http://localhost:8000/api/"
  widgets_base_url: "http://localhost:8000/widgets"
  timeout_ms: 5000

screen:
  default_width: 1920
  default_height: 1080

layout:
  min_preview_px: 20
  min_resize_px: 40
  default_width: 100
  default_height: 50

discovery:
  default_x: 100
  default_y: 100
  default_height: 100
  default_aspect_ratio: 2.0

storage:
  source: "api"

runtime:
  tick_ms: 16
  watch_config: true
  watch_interval_ms: 1000
"#;

/// Creates the app support layout and a default `config.yaml` if the user
/// has none yet. Returns the app support directory when it could be resolved.
pub fn prepare_app_dirs() -> Option<PathBuf> {
    let Some(root) = app_support_dir() else {
        warn!("[{}] Cannot resolve the app support directory", DEBUG_NAME);
        return None;
    };

    if let Err(e) = fs::create_dir_all(&root) {
        warn!("[{}] Failed to create {}: {e}", DEBUG_NAME, root.display());
        return None;
    }

    if let Some(widgets) = widgets_dir() {
        if let Err(e) = fs::create_dir_all(&widgets) {
            warn!("[{}] Failed to create {}: {e}", DEBUG_NAME, widgets.display());
        }
    }

    scaffold_config_yaml(&root);
    Some(root)
}

fn scaffold_config_yaml(root: &Path) -> bool {
    let path = root.join("config.yaml");
    if path.exists() {
        return false;
    }

    match fs::write(&path, DEFAULT_CONFIG_YAML) {
        Ok(_) => {
            info!("[{}] Created {}", DEBUG_NAME, path.display());
            true
        }
        Err(e) => {
            warn!("[{}] Failed to create {}: {e}", DEBUG_NAME, path.display());
            false
        }
    }
}
