//! Replay event source
//!
//! Reads raw feed messages from a JSONL file, one message per line, and runs
//! them through the decoder. Stands in for the live message-queue client
//! during dry runs and tests.

use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tracing::warn;

use crate::error::{Error, Result};
use crate::event::PoolEvent;
use crate::stream::{decoder, EventSource};

/// File-backed event source
pub struct ReplaySource {
    lines: Lines<BufReader<File>>,
}

impl ReplaySource {
    /// Open a JSONL replay file
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .await
            .map_err(|e| Error::Stream(format!("cannot open {}: {}", path.display(), e)))?;

        Ok(Self {
            lines: BufReader::new(file).lines(),
        })
    }
}

impl EventSource for ReplaySource {
    /// Next decodable message's events; undecodable lines are skipped with a
    /// warning, per the fail-soft contract.
    async fn next_batch(&mut self) -> Result<Option<Vec<PoolEvent>>> {
        while let Some(line) = self
            .lines
            .next_line()
            .await
            .map_err(|e| Error::Stream(e.to_string()))?
        {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match decoder::decode_message(line.as_bytes()) {
                Ok(events) => return Ok(Some(events)),
                Err(e) => {
                    warn!(error = %e, "skipping undecodable message");
                }
            }
        }

        Ok(None)
    }
}
