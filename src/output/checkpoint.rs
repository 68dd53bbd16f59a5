//! CSV checkpoint files
//!
//! Two tables are written on every checkpoint:
//! - the row table, one line per enriched video with its provenance
//! - the counts table, one line per query and window
//!
//! Each write replaces the previous file through a temp file and rename, so a
//! crash mid-write leaves the last complete snapshot in place.

use crate::output::traits::{CheckpointSink, OutputError, OutputResult};
use crate::state::{HarvestRow, RunState, WindowCount};
use std::fs;
use std::path::{Path, PathBuf};

/// Column order of the row table
pub const ROW_COLUMNS: [&str; 27] = [
    "query",
    "window_start",
    "window_end",
    "videoId",
    "title",
    "channelTitle",
    "channelId",
    "publishedAt",
    "duration",
    "viewCount",
    "likeCount",
    "commentCount",
    "tags",
    "description",
    "thumbnail_default_url",
    "thumbnail_medium_url",
    "thumbnail_high_url",
    "definition",
    "projection",
    "licensedContent",
    "dimension",
    "defaultAudioLanguage",
    "defaultLanguage",
    "categoryId",
    "watch_url",
    "short_url",
    "embed_url",
];

/// Column order of the counts table
pub const COUNT_COLUMNS: [&str; 5] = [
    "query",
    "window_start",
    "window_end",
    "raw_count",
    "unique_new_in_window",
];

/// Writes checkpoints as two CSV files
#[derive(Debug, Clone)]
pub struct CsvCheckpointWriter {
    rows_path: PathBuf,
    counts_path: PathBuf,
}

impl CsvCheckpointWriter {
    pub fn new(rows_path: impl Into<PathBuf>, counts_path: impl Into<PathBuf>) -> Self {
        Self {
            rows_path: rows_path.into(),
            counts_path: counts_path.into(),
        }
    }

    pub fn rows_path(&self) -> &Path {
        &self.rows_path
    }

    pub fn counts_path(&self) -> &Path {
        &self.counts_path
    }
}

impl CheckpointSink for CsvCheckpointWriter {
    fn write_checkpoint(&self, state: &RunState) -> OutputResult<()> {
        replace_file(&self.rows_path, |wtr| {
            wtr.write_record(ROW_COLUMNS)?;
            for row in &state.rows {
                wtr.write_record(row_fields(row))?;
            }
            Ok(())
        })?;

        replace_file(&self.counts_path, |wtr| {
            wtr.write_record(COUNT_COLUMNS)?;
            for count in &state.counts {
                wtr.write_record(count_fields(count))?;
            }
            Ok(())
        })?;

        tracing::debug!(
            "Checkpoint written: {} rows to {}, {} counts to {}",
            state.rows.len(),
            self.rows_path.display(),
            state.counts.len(),
            self.counts_path.display()
        );
        Ok(())
    }
}

/// Writes a CSV to a sibling temp file, then renames it over `path`
fn replace_file<F>(path: &Path, fill: F) -> OutputResult<()>
where
    F: FnOnce(&mut csv::Writer<fs::File>) -> OutputResult<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let mut wtr = csv::Writer::from_path(&tmp)?;
    fill(&mut wtr)?;
    wtr.flush()?;
    drop(wtr);

    fs::rename(&tmp, path)?;
    Ok(())
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn row_fields(row: &HarvestRow) -> Vec<String> {
    let r = &row.record;
    vec![
        row.query.clone(),
        row.window.start_str().unwrap_or_default(),
        row.window.end_str().unwrap_or_default(),
        r.video_id.clone(),
        opt(&r.title),
        opt(&r.channel_title),
        opt(&r.channel_id),
        opt(&r.published_at),
        opt(&r.duration),
        opt(&r.view_count),
        opt(&r.like_count),
        opt(&r.comment_count),
        opt(&r.tags),
        opt(&r.description),
        opt(&r.thumbnail_default_url),
        opt(&r.thumbnail_medium_url),
        opt(&r.thumbnail_high_url),
        opt(&r.definition),
        opt(&r.projection),
        opt(&r.licensed_content),
        opt(&r.dimension),
        opt(&r.default_audio_language),
        opt(&r.default_language),
        opt(&r.category_id),
        r.watch_url.clone(),
        r.short_url.clone(),
        r.embed_url.clone(),
    ]
}

fn count_fields(count: &WindowCount) -> Vec<String> {
    vec![
        count.query.clone(),
        count.window.start_str().unwrap_or_default(),
        count.window.end_str().unwrap_or_default(),
        count.raw_count.to_string(),
        opt(&count.unique_new),
    ]
}

/// Reads the `videoId` column of a previously written row table
///
/// Used to pre-seed the dedup index of a new run so it does not re-enrich
/// videos a prior run already collected.
pub fn load_checkpoint_ids(path: &Path) -> OutputResult<Vec<String>> {
    let mut rdr = csv::Reader::from_path(path)?;
    let column = rdr
        .headers()?
        .iter()
        .position(|h| h == "videoId")
        .ok_or_else(|| {
            OutputError::Format(format!("{} has no videoId column", path.display()))
        })?;

    let mut ids = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if let Some(id) = record.get(column).filter(|id| !id.is_empty()) {
            ids.push(id.to_string());
        }
    }
    Ok(ids)
}
