// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Newline-delimited JSON event source.

use std::path::Path;

use anyhow::{Context, Result};
use meridian_model::NetworkEvent;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

/// Outcome of one replay pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Events handed to the processor.
    pub forwarded: usize,
    /// Lines that failed to parse.
    pub skipped: usize,
}

/// Open `source` for reading; `-` is stdin.
pub async fn open(source: &str) -> Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    if source == "-" {
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }
    let path = Path::new(source);
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("opening event stream {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Parse one line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<NetworkEvent>, serde_json::Error> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed).map(Some)
}

/// Forward every parseable event until end of input or until the processor
/// stops listening. Malformed lines are logged and skipped.
pub async fn forward<R>(reader: R, events: &UnboundedSender<NetworkEvent>) -> Result<ReplayStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = ReplayStats::default();
    let mut lines = reader.lines();
    let mut line_no = 0usize;
    while let Some(line) = lines.next_line().await.context("reading event stream")? {
        line_no += 1;
        match parse_line(&line) {
            Ok(Some(event)) => {
                debug!(line = line_no, event = event.name(), key = event.key(), "forwarding");
                if events.send(event).is_err() {
                    warn!(line = line_no, "processor stopped; ending replay");
                    break;
                }
                stats.forwarded += 1;
            }
            Ok(None) => {}
            Err(err) => {
                warn!(line = line_no, %err, "malformed event skipped");
                stats.skipped += 1;
            }
        }
    }
    Ok(stats)
}
