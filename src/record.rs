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

//! Log entries and severity levels.

use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use serde::Deserialize;
use serde::Serialize;

use crate::thread_id;

/// An enum representing the available severity levels of a log entry.
///
/// Levels are totally ordered by increasing severity. [`Level::None`] is
/// reserved for writer-internal bookkeeping entries (start/stop notices,
/// rotation notices); as the numeric maximum it passes any configured
/// minimum level.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Serialize, Deserialize)]
pub enum Level {
    /// Very low priority, often extremely verbose, information.
    Verbose = 0,
    /// Lower priority information.
    Debug = 1,
    /// Useful information.
    Information = 2,
    /// Hazardous situations.
    Warning = 3,
    /// Serious errors.
    Error = 4,
    /// Errors the application cannot recover from.
    Fatal = 5,
    /// Writer-internal bookkeeping. Never filtered out.
    None = 6,
}

impl Level {
    /// Return the string representation of the `Level`.
    ///
    /// This returns the same string as the `fmt::Display` implementation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Verbose => "Verbose",
            Level::Debug => "Debug",
            Level::Information => "Information",
            Level::Warning => "Warning",
            Level::Error => "Error",
            Level::Fatal => "Fatal",
            Level::None => "None",
        }
    }

    pub(crate) fn from_u8(value: u8) -> Level {
        match value {
            0 => Level::Verbose,
            1 => Level::Debug,
            2 => Level::Information,
            3 => Level::Warning,
            4 => Level::Error,
            5 => Level::Fatal,
            _ => Level::None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// The type returned by `from_str` when the string doesn't match any of the log levels.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct ParseLevelError {}

impl fmt::Display for ParseLevelError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str("malformed log level")
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for Level {
    type Err = ParseLevelError;
    fn from_str(s: &str) -> Result<Level, Self::Err> {
        for (name, level) in [
            ("verbose", Level::Verbose),
            ("debug", Level::Debug),
            ("information", Level::Information),
            ("warning", Level::Warning),
            ("error", Level::Error),
            ("fatal", Level::Fatal),
            ("none", Level::None),
        ] {
            if s.eq_ignore_ascii_case(name) {
                return Ok(level);
            }
        }

        Err(ParseLevelError {})
    }
}

/// An immutable record of one logging call.
///
/// Entries are created once and never mutated. On the way to the file each
/// entry is serialized as a single JSON object per line:
///
/// ```json
/// {"time":"2024-08-11T14:44:57.172051Z","threadId":3,"level":"Information","context":"billing","method":"charge","message":"captured payment"}
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    time: Timestamp,
    thread_id: u64,
    level: Level,
    context: String,
    method: String,
    message: String,
}

impl Entry {
    /// Creates a new entry, capturing the current instant and the calling
    /// thread's identity.
    pub fn new(
        level: Level,
        context: impl Into<String>,
        method: impl Into<String>,
        message: impl Into<String>,
    ) -> Entry {
        Entry {
            time: Timestamp::now(),
            thread_id: thread_id::current(),
            level,
            context: context.into(),
            method: method.into(),
            message: message.into(),
        }
    }

    /// Creates a writer-internal bookkeeping entry.
    pub(crate) fn internal(message: impl Into<String>) -> Entry {
        Entry::new(Level::None, "rotolog", "writer", message)
    }

    /// The instant the entry was created, in UTC.
    pub fn time(&self) -> Timestamp {
        self.time
    }

    /// The identifier of the producing thread.
    pub fn thread_id(&self) -> u64 {
        self.thread_id
    }

    /// The severity level.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The logical origin, fixed at facade construction time.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// The name of the calling operation.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The message body.
    pub fn message(&self) -> &str {
        &self.message
    }
}
