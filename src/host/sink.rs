use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

use super::LogSink;
use crate::interpreter::Value;

/// Writes each value on its own line to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn log(&self, value: &Value) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", value)
    }
}

/// Collects values in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<Value>>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every value logged so far, oldest first.
    pub fn entries(&self) -> Vec<Value> {
        self.entries.lock().clone()
    }

    /// Number of values logged so far.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop all collected values.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl LogSink for MemorySink {
    fn log(&self, value: &Value) -> io::Result<()> {
        self.entries.lock().push(value.clone());
        Ok(())
    }
}

/// Forwards values to `tracing` as `info` events on the `execflow::log` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, value: &Value) -> io::Result<()> {
        tracing::info!(target: "execflow::log", value = %value, "log");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn memory_sink_clones_share_entries() {
        let sink = MemorySink::new();
        let handle = sink.clone();
        handle.log(&Value::Integer(1)).unwrap();
        sink.log(&Value::from("two")).unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(
            handle.entries(),
            vec![Value::Integer(1), Value::String("two".into())]
        );

        sink.clear();
        assert!(handle.is_empty());
    }

    #[test]
    fn memory_sink_accepts_concurrent_writers() {
        let sink = MemorySink::new();
        let workers: Vec<_> = (0..4)
            .map(|n| {
                let sink = sink.clone();
                thread::spawn(move || sink.log(&Value::Integer(n)).unwrap())
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(sink.len(), 4);
    }

    #[test]
    fn closures_act_as_sinks() {
        let seen = Mutex::new(Vec::new());
        let sink = |value: &Value| -> io::Result<()> {
            seen.lock().push(value.to_string());
            Ok(())
        };
        sink.log(&Value::Integer(42)).unwrap();
        assert_eq!(*seen.lock(), vec!["42".to_string()]);
    }
}
