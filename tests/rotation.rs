use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use rand::Rng;
use rand::distr::Alphanumeric;
use rotolog::Entry;
use rotolog::FileLogger;
use rotolog::Level;
use serde::Deserialize;
use serde::Serialize;
use serde::Serializer;
use serde::ser::Error as _;
use tempfile::TempDir;

fn read_entries(path: &Path) -> Vec<Entry> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn generate_random_string(len: usize) -> String {
    let mut rng = rand::rng();
    std::iter::repeat(())
        .map(|()| rng.sample(Alphanumeric))
        .map(char::from)
        .take(len)
        .collect()
}

#[test]
fn test_undersized_threshold_is_clamped_and_rotates() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let path = temp_dir.path().join("app.log");
    let backup = temp_dir.path().join("app.log.log");

    // 1 byte is below the floor; the effective threshold becomes 64 KiB.
    let sink = FileLogger::builder()
        .path(&path)
        .max_file_size(1)
        .buffering_interval(Duration::from_secs(10))
        .build()
        .unwrap();

    let mut messages = Vec::new();
    for i in 0..400 {
        let message = format!("bulk {i} {}", generate_random_string(200));
        sink.write(Level::Information, "bulk", "fill", &message);
        messages.push(message);
    }
    assert!(sink.flush());

    // The file now exceeds the clamped threshold; the next cycle rotates
    // before appending.
    let oversized = fs::metadata(&path).unwrap().len();
    assert!(oversized > 64 * 1024);
    assert!(!backup.exists());

    for i in 0..5 {
        let message = format!("tail {i}");
        sink.write(Level::Information, "bulk", "tail", &message);
        messages.push(message);
    }
    assert!(sink.flush());
    assert!(sink.shutdown(Duration::from_secs(5)));

    assert!(backup.exists());
    assert!(fs::metadata(&path).unwrap().len() < oversized);
    assert_eq!(fs::metadata(&backup).unwrap().len(), oversized);

    // The fresh file leads with the rotation notice.
    let primary = read_entries(&path);
    assert_eq!(primary[0].level(), Level::None);
    assert!(primary[0].message().starts_with("rotated log file"));

    // No loss, no duplication across the rotation boundary.
    let mut persisted = read_entries(&backup);
    persisted.extend(primary);
    let mut seen = persisted
        .iter()
        .filter(|entry| entry.level() != Level::None)
        .map(|entry| entry.message().to_string())
        .collect::<Vec<_>>();
    messages.sort();
    seen.sort();
    assert_eq!(seen, messages);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Order {
    id: u64,
    item: String,
    quantity: u32,
}

#[test]
fn test_structured_message_round_trip() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let path = temp_dir.path().join("app.log");

    let sink = FileLogger::builder().path(&path).build().unwrap();
    let order = Order {
        id: 4711,
        item: "widget".to_string(),
        quantity: 3,
    };
    sink.write_value(Level::Information, "orders", "submit", &order);
    assert!(sink.shutdown(Duration::from_secs(5)));

    let entries = read_entries(&path);
    let parsed: Order = serde_json::from_str(entries[1].message()).unwrap();
    assert_eq!(parsed, order);
}

#[derive(Debug)]
struct RefusesJson {
    detail: &'static str,
}

impl Serialize for RefusesJson {
    fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
        Err(S::Error::custom(self.detail))
    }
}

struct RefusesEverything;

impl Serialize for RefusesEverything {
    fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
        Err(S::Error::custom("not representable"))
    }
}

impl fmt::Debug for RefusesEverything {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        Err(fmt::Error)
    }
}

#[test]
fn test_serialization_failure_is_contained() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let path = temp_dir.path().join("app.log");

    let sink = FileLogger::builder().path(&path).build().unwrap();
    sink.write_value(
        Level::Error,
        "orders",
        "submit",
        &RefusesJson { detail: "no json form" },
    );
    sink.write_value(Level::Error, "orders", "submit", &RefusesEverything);
    assert!(sink.shutdown(Duration::from_secs(5)));

    let entries = read_entries(&path);
    // Debug fallback for the first, fixed diagnostic for the second.
    assert_eq!(entries[1].message(), r#"RefusesJson { detail: "no json form" }"#);
    assert!(entries[2].message().starts_with("<value of type "));
    assert!(entries[2].message().contains("RefusesEverything"));
}
