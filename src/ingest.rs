//! Ingestion helpers shared by the HTTP POST path and standard input.
//!
//! Blank lines are dropped here, before they ever reach the bus; the bus
//! itself never filters.

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::bus::BusHandle;

/// Lines eligible for publication: everything except blank (empty or
/// whitespace-only) lines.
pub fn non_blank_lines(input: &str) -> impl Iterator<Item = &str> {
    input.lines().filter(|line| !line.trim().is_empty())
}

/// Publish each non-blank line read from standard input as one message.
///
/// Returns on stdin EOF, on a read error, or once the bus has shut down.
pub async fn watch_stdin(bus: BusHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                if bus.publish(line).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "stdin read error");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::non_blank_lines;

    #[test]
    fn blank_and_whitespace_lines_are_skipped() {
        let lines: Vec<&str> = non_blank_lines("a\n\nb\n").collect();
        assert_eq!(lines, vec!["a", "b"]);

        let lines: Vec<&str> = non_blank_lines("  \nfirst\n\t\nsecond").collect();
        assert_eq!(lines, vec!["first", "second"]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert_eq!(non_blank_lines("").count(), 0);
        assert_eq!(non_blank_lines("\n\n\n").count(), 0);
    }
}
