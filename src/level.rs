use std::fmt;

/// Severity tiers of the pipeline, ordered from least to most severe.
///
/// `Fatal` is special: records at that level submitted through the fatal path
/// always end in process termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl Level {
    /// Severity name as a static string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warning,
            log::Level::Info => Level::Info,
            log::Level::Debug | log::Level::Trace => Level::Debug,
        }
    }
}

#[test]
fn severities_are_totally_ordered() {
    assert!(Level::Debug < Level::Info);
    assert!(Level::Info < Level::Warning);
    assert!(Level::Warning < Level::Error);
    assert!(Level::Error < Level::Fatal);
}

#[test]
fn facade_levels_map_onto_pipeline_levels() {
    assert_eq!(Level::from(log::Level::Error), Level::Error);
    assert_eq!(Level::from(log::Level::Warn), Level::Warning);
    assert_eq!(Level::from(log::Level::Info), Level::Info);
    assert_eq!(Level::from(log::Level::Debug), Level::Debug);
    assert_eq!(Level::from(log::Level::Trace), Level::Debug);
}
