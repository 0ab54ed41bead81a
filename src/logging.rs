use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, AtomicU8, Ordering},
        mpsc::{self, Sender},
        OnceLock,
    },
    thread,
};

use crate::paths::log_file_path;

/* =========================
   GLOBAL STATE
   ========================= */

static DEBUG: AtomicBool = AtomicBool::new(false);
static THRESHOLD: AtomicU8 = AtomicU8::new(LEVEL_WARN);
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();
static LOG_TX: OnceLock<Sender<String>> = OnceLock::new();

const LEVEL_ERROR: u8 = 0;
const LEVEL_WARN: u8 = 1;
const LEVEL_INFO: u8 = 2;
const LEVEL_DEBUG: u8 = 3;

/* =========================
   PUBLIC API
   ========================= */

/// Starts the writer thread. Returns false if logging was already set up;
/// the first call wins.
pub fn init(debug: bool, level: &str) -> bool {
    if LOG_TX.get().is_some() {
        return false;
    }

    set_debug(debug);
    set_level(level);

    let path = log_path().clone();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let (tx, rx) = mpsc::channel::<String>();
    if LOG_TX.set(tx).is_err() {
        return false;
    }

    thread::spawn(move || {
        let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&path) else {
            eprintln!("[WIDGETS] Failed to open log file {}", path.display());
            return;
        };

        while let Ok(line) = rx.recv() {
            let _ = writeln!(file, "{line}");
            let _ = file.flush();
        }
    });

    true
}

pub fn set_debug(debug: bool) {
    DEBUG.store(debug, Ordering::Relaxed);
}

pub fn set_level(level: &str) {
    THRESHOLD.store(parse_level(level), Ordering::Relaxed);
}

#[inline]
pub fn should_log(level: &str) -> bool {
    if DEBUG.load(Ordering::Relaxed) {
        return true;
    }
    parse_level(level) <= THRESHOLD.load(Ordering::Relaxed)
}

/* =========================
   INTERNAL
   ========================= */

#[inline]
pub fn enqueue(level: &str, msg: String) {
    if let Some(tx) = LOG_TX.get() {
        let ts = timestamp();
        let _ = tx.send(format!("{ts} [{level}] {msg}"));
    }
}

fn parse_level(level: &str) -> u8 {
    match level.trim().to_ascii_lowercase().as_str() {
        "error" => LEVEL_ERROR,
        "info" => LEVEL_INFO,
        "debug" | "trace" => LEVEL_DEBUG,
        _ => LEVEL_WARN,
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

fn log_path() -> &'static PathBuf {
    LOG_PATH.get_or_init(log_file_path)
}

/* =========================
   MACROS
   ========================= */

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {{
        if $crate::logging::should_log("INFO") {
            $crate::logging::enqueue("INFO", format!($($arg)*));
        }
    }};
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{
        if $crate::logging::should_log("WARN") {
            $crate::logging::enqueue("WARN", format!($($arg)*));
        }
    }};
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {{
        $crate::logging::enqueue("ERROR", format!($($arg)*));
    }};
}
