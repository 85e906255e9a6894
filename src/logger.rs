use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::Path,
    sync::{Mutex, OnceLock},
};

#[derive(Debug)]
pub struct Logger {
    file: Mutex<Option<std::fs::File>>,
    verbose: Mutex<bool>,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            file: Mutex::new(None),
            verbose: Mutex::new(false),
        }
    }

    pub fn init<P: AsRef<Path>>(&self, path: P, verbose: bool) -> io::Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        if let Ok(mut guard) = self.file.lock() {
            *guard = Some(file);
        }
        if let Ok(mut v) = self.verbose.lock() {
            *v = verbose;
        }
        Ok(())
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose.lock().map(|v| *v).unwrap_or(false)
    }

    pub fn log(&self, msg: &str) {
        if let Ok(mut guard) = self.file.lock() {
            if let Some(f) = guard.as_mut() {
                let _ = writeln!(f, "{msg}");
            }
        }
    }
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

pub fn global() -> &'static Logger {
    LOGGER.get_or_init(Logger::new)
}

pub fn log_debug(msg: &str) {
    global().log(msg);
}

/// Only written when the logger was initialised with `verbose`.
pub fn log_trace(msg: &str) {
    let logger = global();
    if logger.is_verbose() {
        logger.log(msg);
    }
}

pub fn log_warn(msg: &str) {
    global().log(&format!("[warn] {msg}"));
}
