// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::SetupError;
use crate::logger::FileLogger;
use crate::record::Level;
use crate::writer::rotate::MAX_FILE_SIZE;
use crate::writer::rotate::MIN_FILE_SIZE;
use crate::writer::rotate::RotatingWriter;

const MIN_INTERVAL: Duration = Duration::from_millis(100);
const MAX_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// A builder for configuring [`FileLogger`].
///
/// # Examples
///
/// ```
/// use rotolog::FileLogger;
/// use rotolog::Level;
///
/// let dir = tempfile::tempdir().unwrap();
/// let logger = FileLogger::builder()
///     .path(dir.path().join("app.log"))
///     .max_file_size(1024 * 1024)
///     .min_level(Level::Debug)
///     .build()
///     .unwrap();
/// # logger.shutdown(std::time::Duration::from_secs(1));
/// ```
#[derive(Debug)]
pub struct FileLoggerBuilder {
    path: Option<PathBuf>,
    max_file_size: u64,
    min_level: Level,
    buffering_interval: Duration,
    thread_name: String,
}

impl Default for FileLoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FileLoggerBuilder {
    /// Creates a new [`FileLoggerBuilder`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: None,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            min_level: Level::Information,
            buffering_interval: DEFAULT_INTERVAL,
            thread_name: "rotolog-writer".to_string(),
        }
    }

    /// Sets the target log file path.
    ///
    /// Defaults to `<executable name>.log` in the temporary directory. The
    /// path is resolved to an absolute path once, at build time.
    #[must_use]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the size threshold in bytes above which the log file is rotated.
    ///
    /// Clamped to the range 64 KiB to 64 MiB.
    #[must_use]
    pub fn max_file_size(mut self, n: u64) -> Self {
        self.max_file_size = n;
        self
    }

    /// Sets the initial minimum level; entries below it are dropped before
    /// they are built.
    #[must_use]
    pub fn min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// Sets the target time between flush cycles under normal operation.
    ///
    /// Clamped to the range 100 ms to 10 s. Shutdown responsiveness is
    /// governed by the wake quantum and is unaffected by this setting.
    #[must_use]
    pub fn buffering_interval(mut self, interval: Duration) -> Self {
        self.buffering_interval = interval;
        self
    }

    /// Sets the name of the background writer thread.
    #[must_use]
    pub fn thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    /// Builds the [`FileLogger`], spawning its background writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be created or opened for
    /// appending. This is the only failure that propagates to callers.
    pub fn build(self) -> Result<FileLogger, SetupError> {
        let path = self.path.unwrap_or_else(default_path);
        let path = std::path::absolute(&path).map_err(|source| SetupError::InvalidPath {
            path: path.display().to_string(),
            source,
        })?;

        let max_size = self.max_file_size.clamp(MIN_FILE_SIZE, MAX_FILE_SIZE);
        let display = path.display().to_string();
        let writer = RotatingWriter::create(path, max_size).map_err(|source| {
            SetupError::InvalidPath {
                path: display,
                source,
            }
        })?;

        let interval = self.buffering_interval.clamp(MIN_INTERVAL, MAX_INTERVAL);
        Ok(FileLogger::start(
            writer,
            self.min_level,
            interval,
            self.thread_name,
        ))
    }
}

fn default_path() -> PathBuf {
    let stem = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_stem().map(|stem| stem.to_os_string()));
    let mut name = stem.unwrap_or_else(|| OsString::from("rotolog"));
    name.push(".log");
    std::env::temp_dir().join(name)
}

#[cfg(test)]
mod tests {
    use super::default_path;

    #[test]
    fn test_default_path() {
        let path = default_path();
        assert!(path.is_absolute());
        assert_eq!(path.extension().unwrap(), "log");
        assert!(path.starts_with(std::env::temp_dir()));
    }
}
