//! NDJSON replay source: one decoded event per line, already totally
//! ordered by (block, tx index, log index) upstream. The single consumer
//! applies each event to completion before reading the next.

use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader},
};
use tracing::info;

use crate::{
    configuration::{AppState, State},
    dispatch::apply_event,
    error::Error,
    types::ChainEvent,
};

pub struct Replay {
    app_state: AppState<State>,
}

impl Replay {
    pub fn new(app_state: AppState<State>) -> Replay {
        Replay { app_state }
    }

    /// Reads the configured events file to the end. The first fatal error
    /// stops the run; the offending event is named in the error context.
    pub async fn run(&self) -> Result<u64, Error> {
        let path = &self.app_state.config.events_file;
        let file = File::open(path).await?;
        let mut lines = BufReader::new(file).lines();
        let mut applied: u64 = 0;

        info!("replaying events from {}", path);

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let event: ChainEvent = serde_json::from_str(line)?;
            apply_event(&self.app_state, event).await?;

            applied += 1;
            if applied % 10_000 == 0 {
                info!("applied {} events", applied);
            }
        }

        info!("replay complete, {} events applied", applied);

        Ok(applied)
    }
}
