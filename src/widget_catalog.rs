//! Widgets installed on disk and a `widgets.json`-backed config store.
//!
//! A widget is a folder under the widgets directory containing at least
//! `widget.html`. Its aspect ratio comes from a marker comment in that file:
//! `<!-- aspect-ratio: 16:9 -->` or `<!-- aspect-ratio: flex -->`.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;

use crate::{
    data_loaders::config::StorageSettings,
    error::StoreError,
    info, paths, warn,
    layout::{AspectRatio, Discovery, WidgetMeta, WidgetPlacement},
    store::ConfigStore,
    DEBUG_NAME,
};

static ASPECT_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!--\s*aspect-ratio:\s*([\w:]+)\s*-->").expect("aspect marker pattern is valid")
});

/// Ratio declared by a widget's HTML. No marker, or one that is not `W:H`,
/// leaves the default; unparseable numbers or a zero side give 1.0.
pub fn parse_aspect_marker(html: &str) -> AspectRatio {
    let Some(value) = ASPECT_MARKER.captures(html).and_then(|c| c.get(1)) else {
        return AspectRatio::default();
    };

    let value = value.as_str();
    if value == "flex" {
        return AspectRatio::Flex;
    }

    let parts: Vec<&str> = value.split(':').collect();
    let [w, h] = parts.as_slice() else {
        return AspectRatio::default();
    };

    match (w.parse::<f64>(), h.parse::<f64>()) {
        (Ok(w), Ok(h)) if h != 0.0 => AspectRatio::fixed(w / h).unwrap_or(AspectRatio::Fixed(1.0)),
        _ => AspectRatio::Fixed(1.0),
    }
}

/// Widget folders under `dir`, sorted by name. A missing directory is an
/// empty catalog.
pub fn scan_widgets(dir: &Path) -> Discovery {
    let Ok(read_dir) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut found: Vec<(String, WidgetMeta)> = read_dir
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            if !path.is_dir() {
                return None;
            }

            let id = path.file_name()?.to_str()?.to_string();
            let html_path = path.join("widget.html");
            if !html_path.exists() {
                return None;
            }

            let aspect_ratio = match fs::read_to_string(&html_path) {
                Ok(html) => parse_aspect_marker(&html),
                Err(e) => {
                    warn!("[{}][CATALOG] Could not read {}: {}", DEBUG_NAME, html_path.display(), e);
                    AspectRatio::default()
                }
            };

            Some((id, WidgetMeta { aspect_ratio: Some(aspect_ratio) }))
        })
        .collect();

    found.sort_by(|a, b| a.0.cmp(&b.0));
    found
}

/// Config store that keeps placements in a JSON file and discovers widgets
/// from a local directory.
#[derive(Debug, Clone)]
pub struct FsConfigStore {
    widgets_dir: PathBuf,
    config_file: PathBuf,
}

impl FsConfigStore {
    pub fn new(widgets_dir: impl Into<PathBuf>, config_file: impl Into<PathBuf>) -> Self {
        Self {
            widgets_dir: widgets_dir.into(),
            config_file: config_file.into(),
        }
    }

    /// Paths from `storage`, defaulting to the app support directory.
    pub fn from_settings(storage: &StorageSettings) -> Self {
        let widgets_dir = storage
            .widgets_dir
            .clone()
            .or_else(paths::widgets_dir)
            .unwrap_or_else(|| PathBuf::from("widgets"));
        let config_file = storage
            .config_file
            .clone()
            .or_else(paths::widget_config_file)
            .unwrap_or_else(|| PathBuf::from("widgets.json"));

        Self::new(widgets_dir, config_file)
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    fn write_atomically(&self, placements: &[WidgetPlacement]) -> Result<(), StoreError> {
        if let Some(parent) = self.config_file.parent() {
            fs::create_dir_all(parent)?;
        }

        let body = serde_json::to_string_pretty(placements)?;
        let tmp = self.config_file.with_extension("json.tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.config_file)?;
        Ok(())
    }

    /// Moves an unreadable config aside and starts over with an empty list.
    fn recover_default(&self, reason: &str) -> Result<Vec<WidgetPlacement>, StoreError> {
        warn!(
            "[{}][STORE] {} is unusable ({}); writing default config",
            DEBUG_NAME,
            self.config_file.display(),
            reason
        );

        if self.config_file.exists() {
            let backup = self.config_file.with_extension("json.bak");
            if let Err(e) = fs::rename(&self.config_file, &backup) {
                warn!("[{}][STORE] Could not keep a backup at {}: {}", DEBUG_NAME, backup.display(), e);
            }
        }

        self.write_atomically(&[])?;
        Ok(Vec::new())
    }
}

impl ConfigStore for FsConfigStore {
    fn load_placements(&self) -> Result<Vec<WidgetPlacement>, StoreError> {
        if !self.config_file.exists() {
            info!("[{}][STORE] No widget config yet, creating {}", DEBUG_NAME, self.config_file.display());
            self.write_atomically(&[])?;
            return Ok(Vec::new());
        }

        let raw = fs::read(&self.config_file)?;
        match serde_json::from_slice::<Vec<WidgetPlacement>>(&raw) {
            Ok(list) => Ok(list),
            Err(e) => self.recover_default(&e.to_string()),
        }
    }

    fn discover(&self) -> Result<Discovery, StoreError> {
        Ok(scan_widgets(&self.widgets_dir))
    }

    fn save_placements(&self, placements: &[WidgetPlacement]) -> Result<(), StoreError> {
        self.write_atomically(placements)
    }
}
