use std::fs::{self, File, OpenOptions};
use std::path::Path;

use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};

use crate::error::{Error, Result};

fn open_log(path: &Path) -> Result<File> {
    let open = || -> std::io::Result<File> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(path)
    };
    open().map_err(|source| Error::LogFile {
        path: path.to_path_buf(),
        source,
    })
}

/// A logger appending records at `level` or above to `path`; the terminal
/// belongs to the UI.
pub fn file_logger<P: AsRef<Path>>(path: P, level: LevelFilter) -> Result<Box<WriteLogger<File>>> {
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();
    Ok(WriteLogger::new(level, config, open_log(path.as_ref())?))
}

/// Installs a [`file_logger`] as the global logger.
pub fn init<P: AsRef<Path>>(path: P, level: LevelFilter) -> Result<()> {
    log::set_boxed_logger(file_logger(path, level)?)?;
    log::set_max_level(level);
    Ok(())
}
