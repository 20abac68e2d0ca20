//! Result export

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde_json::{Map, Value};

use ld_engine::{DrawRecord, ParticipantId, PrizePool};

use crate::columns::ColumnMap;
use crate::error::{FileError, FileResult};

/// Destination for the session's results
pub trait ResultSink {
    /// Write every committed draw; returns the number of rows written
    fn write(&self, pools: &[PrizePool], history: &[DrawRecord]) -> FileResult<usize>;
}

/// Results as a JSON array of row objects, one row per winner
#[derive(Debug, Clone)]
pub struct SheetRowsExport {
    path: PathBuf,
    columns: ColumnMap,
}

impl SheetRowsExport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            columns: ColumnMap::default(),
        }
    }

    /// Builder: header set for the written rows
    pub fn with_columns(mut self, columns: ColumnMap) -> Self {
        self.columns = columns;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `lottery-results-YYYYMMDD-HHMMSS.json` for the given local time
    pub fn default_file_name(at: DateTime<Local>) -> String {
        format!("lottery-results-{}.json", at.format("%Y%m%d-%H%M%S"))
    }
}

impl ResultSink for SheetRowsExport {
    fn write(&self, pools: &[PrizePool], history: &[DrawRecord]) -> FileResult<usize> {
        let rows = result_rows(pools, history, &self.columns)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&rows)?)?;
        log::info!("Exported {} result rows to {}", rows.len(), self.path.display());
        Ok(rows.len())
    }
}

/// One row per winner, grouped by pool in configuration order.
///
/// Draws for pools no longer configured follow, in history order.
pub fn result_rows(
    pools: &[PrizePool],
    history: &[DrawRecord],
    columns: &ColumnMap,
) -> FileResult<Vec<Value>> {
    if history.iter().all(|r| r.winners.is_empty()) {
        return Err(FileError::EmptyHistory);
    }

    let pool_rank = |pool_id: &str| {
        pools
            .iter()
            .position(|p| p.id == pool_id)
            .unwrap_or(pools.len())
    };
    let mut ordered: Vec<&DrawRecord> = history.iter().collect();
    // Stable: draws of one pool keep their history order
    ordered.sort_by_key(|r| pool_rank(&r.pool_id));

    let rows = ordered
        .into_iter()
        .flat_map(|record| {
            record.winners.iter().map(move |winner| {
                let mut row = Map::new();
                row.insert(columns.prize.clone(), Value::String(record.pool_name.clone()));
                row.insert(columns.item.clone(), Value::String(winner.assigned_item.clone()));
                row.insert(columns.id.clone(), id_cell(winner.id()));
                row.insert(columns.name.clone(), Value::String(winner.participant.name.clone()));
                row.insert(
                    columns.department.clone(),
                    Value::String(winner.participant.department.clone()),
                );
                Value::Object(row)
            })
        })
        .collect();
    Ok(rows)
}

fn id_cell(id: &ParticipantId) -> Value {
    match id {
        ParticipantId::Number(n) => Value::from(*n),
        ParticipantId::Text(s) => Value::String(s.clone()),
    }
}
