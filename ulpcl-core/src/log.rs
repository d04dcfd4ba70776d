//! Log sinks (`spec.md` §5, §9: "thread-local log queues").
//!
//! Both pack compilation and the dispatcher route their log lines through
//! a single `LogSink` capability: `write` appends a line, `request_flush`
//! signals that the caller is done producing lines for now (a no-op for
//! the direct sink; a per-thread flush for the buffered one).

use std::collections::HashMap;
use std::thread::ThreadId;

use parking_lot::Mutex;
use tracing::{info, warn};

/// Shared interface the sequential and parallel dispatchers log through.
pub trait LogSink: Send + Sync {
    fn write(&self, message: &str);
    fn request_flush(&self);
}

/// Writes straight through to the `tracing` subscriber. Safe for
/// single-threaded use by the sequential dispatcher, where there is no
/// risk of interleaving lines from concurrent packs.
#[derive(Default)]
pub struct DirectSink;

impl LogSink for DirectSink {
    fn write(&self, message: &str) {
        if message.contains("error") {
            warn!(target: "ulpcl", "{message}");
        } else {
            info!(target: "ulpcl", "{message}");
        }
    }

    fn request_flush(&self) {}
}

/// Keeps a per-thread FIFO queue of log lines and flushes one thread's
/// queue, atomically, when that thread signals its pack is complete.
/// This preserves intra-pack log ordering without interleaving lines
/// emitted by concurrent workers (`spec.md` §5).
#[derive(Default)]
pub struct BufferedSink {
    queues: Mutex<HashMap<ThreadId, Vec<String>>>,
}

impl BufferedSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogSink for BufferedSink {
    fn write(&self, message: &str) {
        let thread = std::thread::current().id();
        self.queues
            .lock()
            .entry(thread)
            .or_default()
            .push(message.to_string());
    }

    fn request_flush(&self) {
        let thread = std::thread::current().id();
        let lines = self.queues.lock().remove(&thread);
        if let Some(lines) = lines {
            let joined = lines.join("\n");
            if joined.contains("error") {
                warn!(target: "ulpcl", "{joined}");
            } else {
                info!(target: "ulpcl", "{joined}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn buffered_sink_queues_per_thread_until_flush() {
        let sink = Arc::new(BufferedSink::new());
        sink.write("line 1");
        sink.write("line 2");
        assert_eq!(
            sink.queues.lock().get(&std::thread::current().id()).unwrap().len(),
            2
        );
        sink.request_flush();
        assert!(sink.queues.lock().is_empty());
    }

    #[test]
    fn flush_with_no_queued_lines_is_harmless() {
        let sink = BufferedSink::new();
        sink.request_flush();
    }
}
