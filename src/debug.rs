use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// JSON-lines trace of layout decisions, enabled with
/// `DealPressBuilder::debug_log`. Writes after the file is open are
/// best-effort.
#[derive(Clone)]
pub(crate) struct DebugLogger {
    inner: Arc<Mutex<DebugState>>,
}

struct DebugState {
    writer: BufWriter<File>,
    counters: HashMap<String, u64>,
}

impl DebugLogger {
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(DebugState {
                writer: BufWriter::new(file),
                counters: HashMap::new(),
            })),
        })
    }

    /// Writes one event as a JSON object with `type` set to `kind`.
    pub fn event(&self, kind: &str, fields: &[(&str, Value)]) {
        let mut record = Map::new();
        record.insert("type".to_string(), Value::from(kind));
        for (key, value) in fields {
            record.insert((*key).to_string(), value.clone());
        }
        if let Ok(mut state) = self.inner.lock() {
            let entry = state.counters.entry(kind.to_string()).or_insert(0);
            *entry = entry.saturating_add(1);
            write_record(&mut state.writer, &Value::Object(record));
        }
    }

    pub fn emit_summary(&self, context: &str) {
        if let Ok(mut state) = self.inner.lock() {
            let counts: Map<String, Value> = state
                .counters
                .drain()
                .map(|(key, value)| (key, Value::from(value)))
                .collect();
            let record = json!({
                "type": "debug.summary",
                "context": context,
                "counts": counts,
            });
            write_record(&mut state.writer, &record);
        }
    }

    pub fn flush(&self) {
        if let Ok(mut state) = self.inner.lock() {
            let _ = state.writer.flush();
        }
    }
}

fn write_record(writer: &mut BufWriter<File>, record: &Value) {
    if serde_json::to_writer(&mut *writer, record).is_ok() {
        let _ = writer.write_all(b"\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_and_summary_are_valid_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.jsonl");
        let logger = DebugLogger::new(&path).unwrap();
        logger.event(
            "layout.page_break",
            &[("page", json!(2)), ("section", json!("recitals"))],
        );
        logger.event("image.fallback", &[("name", json!("logo \"v2\".png"))]);
        logger.emit_summary("emandate");
        logger.flush();

        let raw = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = raw
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["page"], 2);
        assert_eq!(lines[0]["section"], "recitals");
        assert_eq!(lines[1]["name"], "logo \"v2\".png");
        assert_eq!(lines[2]["counts"]["layout.page_break"], 1);
    }

    #[test]
    fn numeric_looking_names_stay_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.jsonl");
        let logger = DebugLogger::new(&path).unwrap();
        logger.event(
            "image.fallback",
            &[("name", json!("2024")), ("section", json!("1"))],
        );
        logger.flush();

        let raw = std::fs::read_to_string(&path).unwrap();
        let line: serde_json::Value = serde_json::from_str(raw.trim_end()).unwrap();
        assert_eq!(line["name"], json!("2024"));
        assert_eq!(line["section"], json!("1"));
        assert!(line["name"].is_string());
    }
}
