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

//! Rotolog is a lightweight, structured, file-based logger: application code
//! emits leveled entries carrying a timestamp, thread identity, and calling
//! context, and a single background writer appends them to a size-bounded
//! rotating log file as line-delimited JSON.
//!
//! # Overview
//!
//! Producer threads only ever enqueue; the background writer drains the queue
//! on a fixed cadence, rotates the file into a single backup generation when
//! it outgrows its size threshold, and contains all I/O failures in a
//! secondary diagnostic file. Logging calls never fail and never block;
//! shutdown waits with a caller-chosen bound.
//!
//! # Examples
//!
//! ```
//! use rotolog::FileLogger;
//! use rotolog::Level;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let sink = FileLogger::builder()
//!     .path(dir.path().join("app.log"))
//!     .max_file_size(1024 * 1024)
//!     .build()
//!     .unwrap();
//!
//! let logger = sink.logger("orders");
//! logger.info("submit", "order accepted");
//! logger.log_value(Level::Warning, "submit", &("retries", 3));
//!
//! assert!(sink.shutdown(std::time::Duration::from_secs(5)));
//! ```
//!
//! Records from the `log` crate can be forwarded with [`Bridge`]:
//!
//! ```no_run
//! let sink = rotolog::FileLogger::builder().build().unwrap();
//! rotolog::Bridge::new(sink).install().unwrap();
//!
//! log::warn!("this ends up in the file");
//! ```

mod bridge;
mod error;
mod logger;
mod record;
mod text;
mod thread_id;
mod writer;

pub use bridge::Bridge;
pub use error::SetupError;
pub use logger::FileLogger;
pub use logger::FileLoggerBuilder;
pub use logger::Logger;
pub use record::Entry;
pub use record::Level;
pub use record::ParseLevelError;
pub use text::to_text;
