use serde::Serialize;

/// One diagnostic message: a short summary plus details
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub short: String,
    pub long: String,
}

/// Diagnostic log written by one subscriber during one delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventLog {
    subscriber: String,
    entries: Vec<LogEntry>,
}

impl EventLog {
    pub fn new(subscriber: impl Into<String>) -> Self {
        Self {
            subscriber: subscriber.into(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, short: impl Into<String>, long: impl Into<String>) {
        self.entries.push(LogEntry {
            short: short.into(),
            long: long.into(),
        });
    }

    pub fn subscriber(&self) -> &str {
        &self.subscriber
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of one `publish` call: the logs of every subscriber, in
/// delivery order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Emission {
    pub topic: &'static str,
    pub logs: Vec<EventLog>,
}

impl Emission {
    pub fn delivered(&self) -> usize {
        self.logs.len()
    }

    /// All entries across subscribers, paired with the subscriber name
    pub fn entries(&self) -> impl Iterator<Item = (&str, &LogEntry)> {
        self.logs
            .iter()
            .flat_map(|log| log.entries().iter().map(move |e| (log.subscriber(), e)))
    }

    pub fn has_entries(&self) -> bool {
        self.logs.iter().any(|log| !log.is_empty())
    }
}
