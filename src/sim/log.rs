/// Log book: the ordered trace shown in the dashboard's log panel.
///
/// Every component writes through `LogSink` instead of printing. The
/// `LogBook` keeps the entries for display and mirrors each one to
/// `tracing`, so a configured log file sees the same stream.

use tracing::{error, info};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LogKind {
    Log,
    Error,
}

impl LogKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LogKind::Log => "log",
            LogKind::Error => "error",
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LogEntry {
    pub message: String,
    pub kind: LogKind,
}

pub trait LogSink {
    fn record(&mut self, kind: LogKind, message: String);

    fn log(&mut self, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.record(LogKind::Log, message.into());
    }

    fn error(&mut self, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.record(LogKind::Error, message.into());
    }
}

/// Append-only, unbounded, oldest first.
#[derive(Clone, Debug, Default)]
pub struct LogBook {
    entries: Vec<LogEntry>,
}

impl LogBook {
    pub fn new() -> Self {
        LogBook { entries: Vec::new() }
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// The most recent `n` entries, still oldest first.
    pub fn tail(&self, n: usize) -> &[LogEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn errors(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(|e| e.kind == LogKind::Error)
    }
}

impl LogSink for LogBook {
    fn record(&mut self, kind: LogKind, message: String) {
        match kind {
            LogKind::Log => info!(target: "gridbot::trace", "{message}"),
            LogKind::Error => error!(target: "gridbot::trace", "{message}"),
        }
        self.entries.push(LogEntry { message, kind });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_in_order_with_kind() {
        let mut book = LogBook::new();
        book.log("one");
        book.error("two");
        book.log(String::from("three"));
        let kinds: Vec<_> = book.entries().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![LogKind::Log, LogKind::Error, LogKind::Log]);
        assert_eq!(book.last().map(|e| e.message.as_str()), Some("three"));
        assert_eq!(book.errors().count(), 1);
    }

    #[test]
    fn tail_keeps_most_recent_last() {
        let mut book = LogBook::new();
        for i in 0..10 {
            book.log(format!("line {i}"));
        }
        let tail = book.tail(3);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail[0].message, "line 7");
        assert_eq!(tail[2].message, "line 9");
        assert_eq!(book.tail(50).len(), 10);
    }
}
