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

//! Bridge from the `log` crate facade to a [`FileLogger`].

use crate::error::SetupError;
use crate::logger::FileLogger;
use crate::record::Level;

/// An implementation of [`log::Log`] that forwards records to a
/// [`FileLogger`], so `log::info!` and friends end up in the file.
///
/// The record target becomes the entry context and the module path becomes
/// the method name.
///
/// # Examples
///
/// ```no_run
/// use rotolog::Bridge;
/// use rotolog::FileLogger;
///
/// let sink = FileLogger::builder().build().unwrap();
/// Bridge::new(sink).install().unwrap();
///
/// log::info!("hello from the log facade");
/// ```
#[derive(Debug)]
pub struct Bridge {
    sink: FileLogger,
}

impl Bridge {
    /// Creates a new [`Bridge`] over a logger handle.
    #[must_use = "call `install` to set the global logger"]
    pub fn new(sink: FileLogger) -> Bridge {
        Bridge { sink }
    }

    /// Sets up the global logger with this bridge.
    ///
    /// # Errors
    ///
    /// An error is returned if the global logger has already been set.
    pub fn install(self) -> Result<(), SetupError> {
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(log::LevelFilter::Trace);
        Ok(())
    }
}

fn convert(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warning,
        log::Level::Info => Level::Information,
        log::Level::Debug => Level::Debug,
        log::Level::Trace => Level::Verbose,
    }
}

impl log::Log for Bridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        convert(metadata.level()) >= self.sink.min_level()
    }

    fn log(&self, record: &log::Record) {
        let level = convert(record.level());
        if level < self.sink.min_level() {
            return;
        }
        let message = match record.args().as_str() {
            Some(message) => message.to_string(),
            None => record.args().to_string(),
        };
        self.sink.write(
            level,
            record.target(),
            record.module_path().unwrap_or_default(),
            &message,
        );
    }

    fn flush(&self) {
        self.sink.flush();
    }
}
