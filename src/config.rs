//! Startup configuration for the server binary and embedders.

use std::fs::OpenOptions;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::bus::{EventSink, WriterSink};

pub const DEFAULT_ADDR: &str = "127.0.0.1:8675";
pub const DEFAULT_PREFIX: &str = "[linebus]";

/// Where status lines and broadcast echoes are mirrored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    File(PathBuf),
    Disabled,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub prefix: String,
    pub log: LogTarget,
    pub watch_stdin: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.parse().expect("default addr"),
            prefix: DEFAULT_PREFIX.to_string(),
            log: LogTarget::Stdout,
            watch_stdin: false,
        }
    }
}

impl Config {
    #[must_use]
    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_log(mut self, log: LogTarget) -> Self {
        self.log = log;
        self
    }

    #[must_use]
    pub fn with_stdin(mut self, watch_stdin: bool) -> Self {
        self.watch_stdin = watch_stdin;
        self
    }

    /// Resolve the log target into an observer sink. Log files are opened in
    /// create/append mode; `Disabled` yields no sink at all.
    pub fn sink(&self) -> io::Result<Option<Box<dyn EventSink>>> {
        match &self.log {
            LogTarget::Stdout => Ok(Some(Box::new(WriterSink::stdout(self.prefix.clone())))),
            LogTarget::File(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Ok(Some(Box::new(WriterSink::new(file, self.prefix.clone()))))
            }
            LogTarget::Disabled => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.addr.to_string(), DEFAULT_ADDR);
        assert_eq!(config.prefix, DEFAULT_PREFIX);
        assert_eq!(config.log, LogTarget::Stdout);
        assert!(!config.watch_stdin);
    }

    #[test]
    fn disabled_log_target_yields_no_sink() {
        let config = Config::default().with_log(LogTarget::Disabled);
        assert!(config.sink().unwrap().is_none());
    }
}
