use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use super::yaml::load_yaml;

#[derive(Debug, Clone)]
pub struct CenterConfig {
    pub debug: bool,
    pub log_level: String,
    pub api: ApiSettings,
    pub screen: ScreenSettings,
    pub layout: LayoutSettings,
    pub discovery: DiscoverySettings,
    pub storage: StorageSettings,
    pub runtime: RuntimeSettings,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_ms: u64,
    /// Base for `<id>/frame` URLs on the wallpaper side.
    pub widgets_base_url: String,
}

#[derive(Debug, Clone, Copy)]
pub struct ScreenSettings {
    pub default_width: f64,
    pub default_height: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct LayoutSettings {
    pub min_preview_px: f64,
    pub min_resize_px: f64,
    pub default_width: i32,
    pub default_height: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct DiscoverySettings {
    pub default_x: i32,
    pub default_y: i32,
    pub default_height: i32,
    pub default_aspect_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreSource {
    Api,
    Local,
}

impl StoreSource {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "api" | "http" | "remote" | "backend" => Some(Self::Api),
            "local" | "file" | "fs" | "disk" => Some(Self::Local),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub source: StoreSource,
    pub widgets_dir: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub tick_ms: u64,
    pub watch_config: bool,
    pub watch_interval_ms: u64,
}

impl Default for CenterConfig {
    fn default() -> Self {
        Self {
            debug: false,
            log_level: "warn".to_string(),
            api: ApiSettings::default(),
            screen: ScreenSettings::default(),
            layout: LayoutSettings::default(),
            discovery: DiscoverySettings::default(),
            storage: StorageSettings::default(),
            runtime: RuntimeSettings::default(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/".to_string(),
            timeout_ms: 5000,
            widgets_base_url: "http://localhost:8000/widgets".to_string(),
        }
    }
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            default_width: 1920.0,
            default_height: 1080.0,
        }
    }
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            min_preview_px: 20.0,
            min_resize_px: 40.0,
            default_width: 100,
            default_height: 50,
        }
    }
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            default_x: 100,
            default_y: 100,
            default_height: 100,
            default_aspect_ratio: 2.0,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            source: StoreSource::Api,
            widgets_dir: None,
            config_file: None,
        }
    }
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            tick_ms: 16,
            watch_config: true,
            watch_interval_ms: 1000,
        }
    }
}

impl CenterConfig {
    pub fn load(path: &Path) -> Option<Self> {
        let value = load_yaml(path)?;
        Self::from_yaml(&value)
    }

    pub fn from_yaml(root: &Value) -> Option<Self> {
        let map = root.as_mapping()?;
        let mut config = Self::default();

        config.debug = bool_any(map, &["debug", "debug_mode"]).unwrap_or(config.debug);
        config.log_level = str_any(map, &["log_level", "logging"])
            .unwrap_or(&config.log_level)
            .to_lowercase();

        if let Some(api) = mapping_at(map, "api") {
            parse_api(api, &mut config.api);
        }
        if let Some(screen) = mapping_at(map, "screen") {
            parse_screen(screen, &mut config.screen);
        }
        if let Some(layout) = mapping_at(map, "layout") {
            parse_layout(layout, &mut config.layout);
        }
        if let Some(discovery) = mapping_at(map, "discovery") {
            parse_discovery(discovery, &mut config.discovery);
        }
        if let Some(storage) = mapping_at(map, "storage") {
            parse_storage(storage, &mut config.storage);
        }
        if let Some(runtime) = mapping_at(map, "runtime") {
            parse_runtime(runtime, &mut config.runtime);
        }

        Some(config)
    }
}

fn parse_api(map: &Mapping, api: &mut ApiSettings) {
    if let Some(base) = str_any(map, &["base_url", "url", "endpoint"]) {
        api.base_url = with_trailing_slash(base.trim());
    }
    api.timeout_ms = u64_any(map, &["timeout_ms", "request_timeout_ms"])
        .unwrap_or(api.timeout_ms)
        .max(100);
    if let Some(widgets) = str_any(map, &["widgets_base_url", "frames_url"]) {
        api.widgets_base_url = widgets.trim().trim_end_matches('/').to_string();
    }
}

fn parse_screen(map: &Mapping, screen: &mut ScreenSettings) {
    screen.default_width = f64_any(map, &["default_width", "width"])
        .filter(|v| *v > 0.0)
        .unwrap_or(screen.default_width);
    screen.default_height = f64_any(map, &["default_height", "height"])
        .filter(|v| *v > 0.0)
        .unwrap_or(screen.default_height);
}

fn parse_layout(map: &Mapping, layout: &mut LayoutSettings) {
    layout.min_preview_px = f64_any(map, &["min_preview_px", "preview_min_px"])
        .unwrap_or(layout.min_preview_px)
        .max(1.0);
    layout.min_resize_px = f64_any(map, &["min_resize_px", "resize_min_px"])
        .unwrap_or(layout.min_resize_px)
        .max(1.0);
    layout.default_width = i32_at(map, "default_width")
        .unwrap_or(layout.default_width)
        .max(1);
    layout.default_height = i32_at(map, "default_height")
        .unwrap_or(layout.default_height)
        .max(1);
}

fn parse_discovery(map: &Mapping, discovery: &mut DiscoverySettings) {
    discovery.default_x = i32_at(map, "default_x").unwrap_or(discovery.default_x).max(0);
    discovery.default_y = i32_at(map, "default_y").unwrap_or(discovery.default_y).max(0);
    discovery.default_height = i32_at(map, "default_height")
        .unwrap_or(discovery.default_height)
        .max(1);
    discovery.default_aspect_ratio = f64_any(map, &["default_aspect_ratio", "aspect_ratio"])
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(discovery.default_aspect_ratio);
}

fn parse_storage(map: &Mapping, storage: &mut StorageSettings) {
    storage.source = str_any(map, &["source", "backend", "store"])
        .and_then(StoreSource::parse)
        .unwrap_or(storage.source);
    storage.widgets_dir = str_at(map, "widgets_dir").map(PathBuf::from);
    storage.config_file = str_any(map, &["config_file", "widgets_config"]).map(PathBuf::from);
}

fn parse_runtime(map: &Mapping, runtime: &mut RuntimeSettings) {
    runtime.tick_ms = u64_any(map, &["tick_ms", "tick_sleep_ms"])
        .unwrap_or(runtime.tick_ms)
        .max(1);
    runtime.watch_config = bool_any(map, &["watch_config", "auto_reload", "live_reload"])
        .unwrap_or(runtime.watch_config);
    runtime.watch_interval_ms = u64_any(map, &["watch_interval_ms", "interval_ms"])
        .unwrap_or(runtime.watch_interval_ms)
        .max(100);
}

fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

fn bool_at(map: &Mapping, name: &str) -> Option<bool> {
    map.get(key(name))?.as_bool()
}

fn bool_any(map: &Mapping, names: &[&str]) -> Option<bool> {
    names.iter().find_map(|k| bool_at(map, k))
}

fn str_at<'a>(map: &'a Mapping, name: &str) -> Option<&'a str> {
    map.get(key(name))?.as_str()
}

fn str_any<'a>(map: &'a Mapping, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|k| str_at(map, k))
}

fn mapping_at<'a>(map: &'a Mapping, name: &str) -> Option<&'a Mapping> {
    map.get(key(name))?.as_mapping()
}

fn u64_at(map: &Mapping, name: &str) -> Option<u64> {
    map.get(key(name))?
        .as_i64()
        .and_then(|v| if v >= 0 { Some(v as u64) } else { None })
}

fn u64_any(map: &Mapping, names: &[&str]) -> Option<u64> {
    names.iter().find_map(|k| u64_at(map, k))
}

fn i32_at(map: &Mapping, name: &str) -> Option<i32> {
    map.get(key(name))?
        .as_i64()
        .and_then(|v| i32::try_from(v).ok())
}

fn f64_at(map: &Mapping, name: &str) -> Option<f64> {
    map.get(key(name))?.as_f64()
}

fn f64_any(map: &Mapping, names: &[&str]) -> Option<f64> {
    names.iter().find_map(|k| f64_at(map, k))
}
