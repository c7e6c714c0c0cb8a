use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::debug_log;
use crate::types::ListeningEvent;
use crate::utils::warn_once;

/// Export files holding music plays. Video and podcast histories use other
/// prefixes and are not read.
pub const AUDIO_HISTORY_PATTERN: &str = "Streaming_History_Audio_?*.json";

/// One export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    pub path: PathBuf,
}

pub fn audio_history_pattern() -> Result<Pattern> {
    Pattern::new(AUDIO_HISTORY_PATTERN).context("Invalid audio history file pattern")
}

pub fn is_audio_history_file(path: &Path, pattern: &Pattern) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| pattern.matches(name))
}

/// Find every audio history file under `root`, sorted by path.
pub fn discover_data_sources(root: &Path) -> Result<Vec<DataSource>> {
    if !root.is_dir() {
        bail!("Data directory not found: {}", root.display());
    }
    let pattern = audio_history_pattern()?;

    let mut sources: Vec<DataSource> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_audio_history_file(e.path(), &pattern))
        .map(|e| DataSource {
            path: e.into_path(),
        })
        .collect();
    sources.sort_by(|a, b| a.path.cmp(&b.path));

    if debug_log::is_enabled() {
        debug_log::log(
            "HISTORY",
            "DISCOVER",
            &format!("{} files under {}", sources.len(), root.display()),
        );
    }

    Ok(sources)
}

/// Parse one export file: a JSON array of events.
pub fn parse_source(source: &DataSource) -> Result<Vec<ListeningEvent>> {
    let mut bytes = std::fs::read(&source.path)
        .with_context(|| format!("Failed to read {}", source.path.display()))?;
    let events: Vec<ListeningEvent> = simd_json::from_slice(&mut bytes)
        .with_context(|| format!("Failed to parse {}", source.path.display()))?;
    Ok(events)
}

/// Parse all sources in parallel. Unreadable files are reported and
/// skipped. The result is ordered by timestamp, events without one first.
pub fn parse_sources_parallel(sources: &[DataSource]) -> Vec<ListeningEvent> {
    let parsed: Vec<(&DataSource, Result<Vec<ListeningEvent>>)> = sources
        .par_iter()
        .map(|source| (source, parse_source(source)))
        .collect();

    let mut events = Vec::new();
    for (source, result) in parsed {
        match result {
            Ok(mut batch) => {
                if debug_log::is_enabled() {
                    debug_log::log(
                        "HISTORY",
                        "PARSED",
                        &format!("{} events from {}", batch.len(), source.path.display()),
                    );
                }
                events.append(&mut batch);
            }
            Err(e) => warn_once(format!("⚠️  Skipping {}: {e:#}", source.path.display())),
        }
    }

    events.sort_by(|a, b| a.ts.cmp(&b.ts));
    events
}

/// Load the whole listening history found under `root`.
pub fn load_history(root: &Path) -> Result<Vec<ListeningEvent>> {
    let sources = discover_data_sources(root)?;
    for source in &sources {
        eprintln!("Reading listening data from {}...", source.path.display());
    }
    Ok(parse_sources_parallel(&sources))
}
