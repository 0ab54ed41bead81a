// ~/mylivewallpaper/widget-center/src/data_loaders/yaml.rs

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{LazyLock, RwLock},
    time::{Duration, Instant, SystemTime},
};

use serde_yaml::Value;

/* =========================
   CONFIG CACHE
========================= */

struct CachedYaml {
    value: Value,
    loaded_at: Instant,
    modified: Option<SystemTime>,
}

static YAML_CACHE: LazyLock<RwLock<HashMap<PathBuf, CachedYaml>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));
const CACHE_TTL: Duration = Duration::from_secs(1);
const CACHE_CAPACITY: usize = 32;

/// Reads and parses a YAML file. Results are reused for a short TTL unless
/// the file's mtime moved in the meantime.
pub fn load_yaml(path: &Path) -> Option<Value> {
    let now = Instant::now();
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok();

    {
        let cache = YAML_CACHE.read().unwrap_or_else(|e| e.into_inner());
        if let Some(hit) = cache.get(path) {
            if now.duration_since(hit.loaded_at) < CACHE_TTL && hit.modified == modified {
                return Some(hit.value.clone());
            }
        }
    }

    let txt = fs::read_to_string(path).ok()?;
    let value: Value = serde_yaml::from_str(&txt).ok()?;

    let mut cache = YAML_CACHE.write().unwrap_or_else(|e| e.into_inner());
    if cache.len() >= CACHE_CAPACITY && !cache.contains_key(path) {
        if let Some(oldest) = cache
            .iter()
            .min_by_key(|(_, entry)| entry.loaded_at)
            .map(|(k, _)| k.clone())
        {
            cache.remove(&oldest);
        }
    }

    cache.insert(
        path.to_path_buf(),
        CachedYaml {
            value: value.clone(),
            loaded_at: now,
            modified,
        },
    );
    Some(value)
}

/// Drops the cached copy so the next load hits the disk.
pub fn invalidate(path: &Path) {
    YAML_CACHE
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .remove(path);
}
