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

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use jiff::Timestamp;

use crate::record::Entry;

/// The smallest accepted size threshold: 64 KiB.
pub(crate) const MIN_FILE_SIZE: u64 = 64 * 1024;

/// The largest accepted size threshold: 64 MiB.
pub(crate) const MAX_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// A writer that appends entries to a single log file, keeping exactly one
/// backup generation once the file outgrows its size threshold.
///
/// The worker thread owns this writer exclusively, so every append, rotate,
/// and truncate on the target file is serialized by construction.
#[derive(Debug)]
pub(crate) struct RotatingWriter {
    path: PathBuf,
    backup_path: PathBuf,
    diagnostic_path: PathBuf,
    max_size: u64,
}

impl RotatingWriter {
    /// Creates a writer for `path`, failing fast if the target cannot be
    /// opened for appending.
    pub(crate) fn create(path: PathBuf, max_size: u64) -> io::Result<RotatingWriter> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        OpenOptions::new().append(true).create(true).open(&path)?;

        let backup_path = sibling(&path, ".log");
        let diagnostic_path = sibling(&path, ".ex.log");
        Ok(RotatingWriter {
            path,
            backup_path,
            diagnostic_path,
            max_size,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Runs one append cycle: rotate if the file is oversized, then write the
    /// batch in drain order, one JSON line per entry.
    ///
    /// A failure anywhere in the cycle discards the batch and is redirected
    /// to the diagnostic file; it never reaches the caller.
    pub(crate) fn append(&mut self, entries: &[Entry]) {
        if let Err(err) = self.try_append(entries) {
            self.divert(&err);
        }
    }

    fn try_append(&mut self, entries: &[Entry]) -> anyhow::Result<()> {
        let notice = self.rotate_if_oversized()?;

        let mut buf = Vec::with_capacity((entries.len() + 1) * 128);
        if let Some(notice) = notice {
            encode(&notice, &mut buf)?;
        }
        for entry in entries {
            encode(entry, &mut buf)?;
        }
        if buf.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .context("failed to open log file")?;
        file.write_all(&buf).context("failed to append log batch")?;
        file.flush().context("failed to flush log file")?;
        Ok(())
    }

    /// If the target file exceeds the size threshold, copies it to the backup
    /// path (overwriting any previous backup), truncates the original, and
    /// returns a bookkeeping entry to be written as the first line of the
    /// fresh file.
    fn rotate_if_oversized(&mut self) -> anyhow::Result<Option<Entry>> {
        let size = match fs::metadata(&self.path) {
            Ok(metadata) => metadata.len(),
            Err(_) => return Ok(None),
        };
        if size <= self.max_size {
            return Ok(None);
        }

        fs::copy(&self.path, &self.backup_path).with_context(|| {
            format!("failed to back up log file to {}", self.backup_path.display())
        })?;
        File::create(&self.path).context("failed to truncate log file")?;

        Ok(Some(Entry::internal(format!(
            "rotated log file: {size} bytes exceeded threshold of {} bytes, backup at {}",
            self.max_size,
            self.backup_path.display()
        ))))
    }

    /// Records a cycle failure to the secondary diagnostic file. A nested
    /// failure here has nowhere left to go and is dropped.
    fn divert(&self, err: &anyhow::Error) {
        let Ok(mut file) = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.diagnostic_path)
        else {
            return;
        };
        let _ = writeln!(file, "{} {err:#}", Timestamp::now());
    }
}

fn encode(entry: &Entry, buf: &mut Vec<u8>) -> anyhow::Result<()> {
    let line = serde_json::to_vec(entry).context("failed to encode log entry")?;
    buf.extend_from_slice(&line);
    buf.push(b'\n');
    Ok(())
}

/// Derives a sibling path by appending `suffix` to the full file name, so
/// `app.log` yields `app.log.log` and `app.log.ex.log`.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::RotatingWriter;
    use crate::record::Entry;
    use crate::record::Level;

    fn read_lines(path: &std::path::Path) -> Vec<Entry> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_append_batch() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let path = temp_dir.path().join("app.log");
        let mut writer = RotatingWriter::create(path.clone(), 1024 * 1024).unwrap();

        let batch = (0..5)
            .map(|i| Entry::new(Level::Information, "test", "append", format!("entry {i}")))
            .collect::<Vec<_>>();
        writer.append(&batch);

        let entries = read_lines(&path);
        assert_eq!(entries.len(), 5);
        for (i, entry) in entries.iter().enumerate() {
            assert_eq!(entry.message(), format!("entry {i}"));
        }
    }

    #[test]
    fn test_single_backup_generation() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let path = temp_dir.path().join("app.log");
        let backup = temp_dir.path().join("app.log.log");
        let mut writer = RotatingWriter::create(path.clone(), 256).unwrap();

        let filler = "x".repeat(64);
        for round in 0..2 {
            let batch = (0..8)
                .map(|i| {
                    Entry::new(
                        Level::Information,
                        "test",
                        "rotate",
                        format!("round {round} entry {i} {filler}"),
                    )
                })
                .collect::<Vec<_>>();
            writer.append(&batch);
        }

        assert!(backup.exists());
        assert!(!temp_dir.path().join("app.log.log.log").exists());

        // The fresh file starts with the rotation notice.
        let entries = read_lines(&path);
        assert_eq!(entries[0].level(), Level::None);
        assert!(entries[0].message().starts_with("rotated log file"));

        // No entry is lost or duplicated across the boundary.
        let mut seen = read_lines(&backup);
        seen.extend(entries);
        let messages = seen
            .iter()
            .filter(|entry| entry.level() != Level::None)
            .map(|entry| entry.message().to_string())
            .collect::<Vec<_>>();
        let mut deduped = messages.clone();
        deduped.dedup();
        assert_eq!(messages.len(), 16);
        assert_eq!(deduped.len(), 16);
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_goes_to_diagnostic_file() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let path = temp_dir.path().join("app.log");
        let mut writer = RotatingWriter::create(path.clone(), 1024).unwrap();

        // Replace the target with a directory so the append cycle fails.
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        writer.append(&[Entry::new(Level::Error, "test", "divert", "boom")]);

        let diagnostic = temp_dir.path().join("app.log.ex.log");
        let content = fs::read_to_string(diagnostic).unwrap();
        assert!(content.contains("failed to"));
    }
}
