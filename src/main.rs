use std::{
    fs,
    io::{self, BufRead, Write},
    path::Path,
    sync::{
        mpsc::{self, Receiver, RecvTimeoutError},
        Arc,
    },
    thread,
    time::{Duration, Instant, SystemTime},
};

use mylivewallpaper_widgets::{
    api_connector::HttpConfigStore,
    bootstrap,
    bridge::{Bridge, Inbound, Outbound},
    data_loaders::{
        config::{CenterConfig, StoreSource},
        yaml,
    },
    error, info, logging,
    layout::{EngineSettings, LayoutEngine},
    paths,
    screen::SystemScreenInfo,
    store::{ConfigStore, ScreenInfoProvider},
    warn, DEBUG_NAME,
};

type SharedStore = Arc<dyn ConfigStore + Send + Sync>;
type ScreenSource = Box<dyn ScreenInfoProvider>;

fn build_sources(config: &CenterConfig) -> (SharedStore, ScreenSource) {
    if config.storage.source == StoreSource::Api {
        match HttpConfigStore::new(&config.api) {
            Ok(store) => {
                info!("[{}] Using backend at {}", DEBUG_NAME, store.base_url());
                return (Arc::new(store.clone()), Box::new(store));
            }
            Err(e) => {
                error!(
                    "[{}] Could not build HTTP client ({}); falling back to local widget store",
                    DEBUG_NAME, e
                );
            }
        }
    }

    let store = mylivewallpaper_widgets::widget_catalog::FsConfigStore::from_settings(&config.storage);
    info!("[{}] Using local widget store {}", DEBUG_NAME, store.config_file().display());
    (Arc::new(store), Box::new(SystemScreenInfo))
}

/// Reads one message per line from stdin. Lines that are not a known message
/// are logged and skipped.
fn spawn_stdin_reader() -> Receiver<Inbound> {
    let (tx, rx) = mpsc::channel::<Inbound>();

    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<Inbound>(line) {
                Ok(message) => {
                    if tx.send(message).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("[{}][BRIDGE] Ignoring malformed message: {}", DEBUG_NAME, e),
            }
        }
    });

    rx
}

fn emit(messages: Vec<Outbound>) {
    if messages.is_empty() {
        return;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for message in messages {
        match serde_json::to_string(&message) {
            Ok(line) => {
                let _ = writeln!(out, "{line}");
            }
            Err(e) => error!("[{}][BRIDGE] Failed to serialize outbound message: {}", DEBUG_NAME, e),
        }
    }
    let _ = out.flush();
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn main() {
    bootstrap::prepare_app_dirs();

    let config_path = paths::center_config_path();
    let mut config = CenterConfig::load(&config_path).unwrap_or_default();

    logging::init(config.debug, &config.log_level);
    std::panic::set_hook(Box::new(|panic_info| {
        error!("[{}] Panic: {}", DEBUG_NAME, panic_info);
    }));

    info!("!---------- [{}] Starting Widget Center ----------!", DEBUG_NAME);
    info!("[{}] Config loaded from {}", DEBUG_NAME, config_path.display());

    let (store, screen) = build_sources(&config);
    let engine = LayoutEngine::new(store, screen, EngineSettings::from(&config));
    let mut bridge = Bridge::new(engine).with_widgets_base_url(config.api.widgets_base_url.clone());
    emit(bridge.start());

    let inbound = spawn_stdin_reader();
    let mut tick = Duration::from_millis(config.runtime.tick_ms);
    let mut watch_interval = Duration::from_millis(config.runtime.watch_interval_ms);
    let mut last_watch_tick = Instant::now();
    let mut last_config_modified = modified_at(&config_path);

    loop {
        match inbound.recv_timeout(tick) {
            Ok(Inbound::Shutdown) => {
                warn!("[{}] Shutdown requested by host", DEBUG_NAME);
                break;
            }
            Ok(message) => emit(bridge.handle(message)),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                warn!("[{}] Host closed stdin, exiting", DEBUG_NAME);
                break;
            }
        }

        emit(bridge.poll());

        if config.runtime.watch_config && last_watch_tick.elapsed() >= watch_interval {
            last_watch_tick = Instant::now();

            let current_modified = modified_at(&config_path);
            let changed = match (last_config_modified, current_modified) {
                (Some(prev), Some(curr)) => curr > prev,
                (None, Some(_)) => true,
                _ => false,
            };

            if changed {
                yaml::invalidate(&config_path);
                match CenterConfig::load(&config_path) {
                    Some(new_config) => {
                        config = new_config;
                        logging::set_debug(config.debug);
                        logging::set_level(&config.log_level);
                        tick = Duration::from_millis(config.runtime.tick_ms);
                        watch_interval = Duration::from_millis(config.runtime.watch_interval_ms);
                        warn!(
                            "[{}][WATCHER] Reloaded runtime settings from {}",
                            DEBUG_NAME,
                            config_path.display()
                        );
                    }
                    None => {
                        warn!(
                            "[{}][WATCHER] Detected config change but failed to parse {}; keeping previous config",
                            DEBUG_NAME,
                            config_path.display()
                        );
                    }
                }

                last_config_modified = current_modified;
            }
        }
    }

    // A save still in flight gets a moment to land before the process exits.
    let deadline = Instant::now() + Duration::from_secs(2);
    while bridge.is_saving() && Instant::now() < deadline {
        emit(bridge.poll());
        thread::sleep(tick);
    }
}
