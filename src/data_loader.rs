//! Data loader module for activity record files
//!
//! Streams [`ActivityInput`] records out of JSONL files (one JSON object per
//! line). A path may point at a single file or at a directory, in which case
//! every `*.jsonl` file inside it is loaded in name order. Malformed lines
//! are logged and skipped so one bad record does not sink a batch import.
//!
//! # Examples
//!
//! ```no_run
//! use emistat::data_loader::ActivityLoader;
//! use futures::StreamExt;
//!
//! # async fn example() -> emistat::Result<()> {
//! let loader = ActivityLoader::from_path("activities.jsonl").await?;
//!
//! let activities = loader.load_activities();
//! tokio::pin!(activities);
//! while let Some(result) = activities.next().await {
//!     let activity = result?;
//!     println!("{} in {}", activity.activity_type, activity.market);
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::{EmistatError, Result};
use crate::types::ActivityInput;
use futures::StreamExt;
use futures::stream::Stream;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

/// Streams activity records from JSONL files
#[derive(Debug)]
pub struct ActivityLoader {
    /// Files to load, in order
    files: Vec<PathBuf>,
}

impl ActivityLoader {
    /// Create a loader for a file or a directory of `*.jsonl` files
    ///
    /// # Errors
    ///
    /// Returns [`EmistatError::NoActivityData`] when the path does not exist
    /// or a directory contains no JSONL files.
    pub async fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|_| EmistatError::NoActivityData(path.clone()))?;

        let files = if metadata.is_dir() {
            let mut files = Vec::new();
            let mut entries = tokio::fs::read_dir(&path).await?;
            while let Some(entry) = entries.next_entry().await? {
                let entry_path = entry.path();
                if entry_path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
                    files.push(entry_path);
                }
            }
            files.sort();
            files
        } else {
            vec![path.clone()]
        };

        if files.is_empty() {
            return Err(EmistatError::NoActivityData(path));
        }

        debug!("Discovered {} activity files", files.len());
        Ok(Self { files })
    }

    /// Load activity records as an async stream
    ///
    /// Handles large files efficiently by streaming rather than loading
    /// everything into memory.
    pub fn load_activities(&self) -> impl Stream<Item = Result<ActivityInput>> + '_ {
        async_stream::stream! {
            for file_path in &self.files {
                let activities = Self::parse_jsonl_stream(file_path.clone());
                tokio::pin!(activities);
                while let Some(result) = activities.next().await {
                    yield result;
                }
            }
        }
    }

    /// Parse a single JSONL file as a stream
    fn parse_jsonl_stream(path: PathBuf) -> impl Stream<Item = Result<ActivityInput>> {
        async_stream::stream! {
            let file = match tokio::fs::File::open(&path).await {
                Ok(f) => f,
                Err(e) => {
                    yield Err(e.into());
                    return;
                }
            };

            let reader = BufReader::new(file);
            let mut lines = reader.lines();
            let mut line_number = 0;

            while let Ok(Some(line)) = lines.next_line().await {
                line_number += 1;

                if line.trim().is_empty() {
                    continue;
                }

                match serde_json::from_str::<ActivityInput>(&line) {
                    Ok(activity) => yield Ok(activity),
                    Err(e) => {
                        warn!(
                            "Failed to parse line {} in {}: {}",
                            line_number,
                            path.display(),
                            e
                        );
                        // Continue processing other lines
                    }
                }
            }
        }
    }

    /// The files this loader reads from
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}
