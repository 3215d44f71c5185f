use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;

use log::LevelFilter;

const LOG_DIR_NAME: &str = "YoutubeDownloader";
const LOG_FILE_NAME: &str = "app.log";

/// Where the runtime's diagnostics go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogSink {
    #[default]
    Disabled,
    /// Everything from this crate, warnings and up from the GUI stack.
    Trace,
}

/// Installs the process logger for `sink`. Later calls are ignored.
pub fn init(sink: LogSink) {
    if sink == LogSink::Disabled {
        return;
    }

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_CRATE_NAME"), LevelFilter::Trace)
        .format_timestamp_millis();

    // Release builds on Windows have no console to write to.
    if !cfg!(debug_assertions) {
        if let Some(file) = open_log_file() {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
    }

    if builder.try_init().is_err() {
        log::debug!("logger already installed; keeping the existing one");
    }
}

pub fn log_file_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(LOG_DIR_NAME).join("logs").join(LOG_FILE_NAME))
}

fn open_log_file() -> Option<File> {
    let path = log_file_path()?;
    fs::create_dir_all(path.parent()?).ok()?;
    OpenOptions::new().create(true).append(true).open(path).ok()
}
