//! Participant sources

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use ld_engine::{Participant, ParticipantId};

use crate::columns::ColumnMap;
use crate::error::{FileError, FileResult};

/// Anything that yields the participant list for a session
pub trait ParticipantSource {
    /// Never returns an empty list: that is [`FileError::NoParticipants`]
    fn load(&self) -> FileResult<Vec<Participant>>;
}

/// A sheet exported as a JSON array of row objects
#[derive(Debug, Clone)]
pub struct SheetRowsSource {
    path: PathBuf,
    columns: Option<ColumnMap>,
}

impl SheetRowsSource {
    /// Headers are detected from the first row
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            columns: None,
        }
    }

    /// Builder: use these headers instead of detecting them
    pub fn with_columns(mut self, columns: ColumnMap) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ParticipantSource for SheetRowsSource {
    fn load(&self) -> FileResult<Vec<Participant>> {
        if !self.path.exists() {
            return Err(FileError::NotFound(self.path.display().to_string()));
        }
        let content = fs::read_to_string(&self.path)?;
        let participants = parse_rows(&content, self.columns.as_ref())?;
        log::info!(
            "Loaded {} participants from {}",
            participants.len(),
            self.path.display()
        );
        Ok(participants)
    }
}

/// Parse sheet rows into participants.
///
/// Rows without an id or a name are skipped, as are repeated ids. With no
/// explicit `columns`, headers are detected from the first row.
pub fn parse_rows(json: &str, columns: Option<&ColumnMap>) -> FileResult<Vec<Participant>> {
    let rows: Vec<Value> = match serde_json::from_str(json)? {
        Value::Array(rows) => rows,
        _ => return Err(FileError::InvalidFile("expected an array of rows".into())),
    };

    let columns = match columns {
        Some(map) => map.clone(),
        None => rows
            .iter()
            .filter_map(Value::as_object)
            .find_map(ColumnMap::detect)
            .unwrap_or_default(),
    };

    let mut seen = HashSet::new();
    let mut participants = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        // Row 1 is the header line in the source sheet
        let line = i + 2;
        let Some(row) = row.as_object() else {
            log::warn!("Row {}: not an object, skipped", line);
            continue;
        };
        match participant_from_row(row, &columns) {
            Some(p) if seen.insert(p.id.clone()) => participants.push(p),
            Some(p) => log::warn!("Row {}: duplicate id {}, skipped", line, p.id),
            None => log::warn!("Row {}: missing {} or {}, skipped", line, columns.id, columns.name),
        }
    }

    if participants.is_empty() {
        return Err(FileError::NoParticipants);
    }
    Ok(participants)
}

fn participant_from_row(row: &Map<String, Value>, columns: &ColumnMap) -> Option<Participant> {
    let id = row.get(&columns.id).and_then(cell_id)?;
    let name = row.get(&columns.name).and_then(cell_text)?;
    let department = row
        .get(&columns.department)
        .and_then(cell_text)
        .unwrap_or_default();
    Some(Participant::new(id, name, department))
}

/// Spreadsheets hand back whole numbers as floats
fn cell_id(value: &Value) -> Option<ParticipantId> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(ParticipantId::Number(i))
            } else {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| ParticipantId::Number(f as i64))
                    .or_else(|| Some(ParticipantId::Text(n.to_string())))
            }
        }
        _ => cell_text(value).map(ParticipantId::Text),
    }
}

fn cell_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_chinese_sheet() {
        let json = r#"[
            {"序号": 1, "姓名": "张三", "部门": "技术部"},
            {"序号": 2.0, "姓名": "李四"},
            {"序号": "A-3", "姓名": " 王五 ", "部门": "市场部"}
        ]"#;
        let people = parse_rows(json, None).unwrap();

        assert_eq!(people.len(), 3);
        assert_eq!(people[0].id, ParticipantId::Number(1));
        assert_eq!(people[0].department, "技术部");
        assert_eq!(people[1].id, ParticipantId::Number(2));
        assert_eq!(people[1].department, "");
        assert_eq!(people[2].id, ParticipantId::Text("A-3".into()));
        assert_eq!(people[2].name, "王五");
    }

    #[test]
    fn test_incomplete_and_duplicate_rows_skipped() {
        let json = r#"[
            {"ID": 1, "Name": "Ann", "Department": "Ops"},
            {"ID": 2},
            {"Name": "No Id"},
            {"ID": 3, "Name": ""},
            {"ID": 1, "Name": "Ann Again"},
            "stray",
            {"ID": 4, "Name": "Bo"}
        ]"#;
        let people = parse_rows(json, None).unwrap();
        let names: Vec<&str> = people.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ann", "Bo"]);
    }

    #[test]
    fn test_empty_sheet_is_an_error() {
        assert!(matches!(parse_rows("[]", None), Err(FileError::NoParticipants)));
        assert!(matches!(
            parse_rows(r#"[{"x": 1}]"#, None),
            Err(FileError::NoParticipants)
        ));
        assert!(matches!(parse_rows("{}", None), Err(FileError::InvalidFile(_))));
        assert_eq!(FileError::NoParticipants.to_string(), "no participants loaded");
    }

    #[test]
    fn test_explicit_columns() {
        let columns = ColumnMap {
            id: "工号".into(),
            ..ColumnMap::chinese()
        };
        let people = parse_rows(r#"[{"工号": 9, "姓名": "赵六"}]"#, Some(&columns)).unwrap();
        assert_eq!(people[0].id, ParticipantId::Number(9));
    }

    #[test]
    fn test_source_reads_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("staff.json");
        fs::write(&path, r#"[{"序号": 1, "姓名": "张三"}]"#).unwrap();

        let people = SheetRowsSource::new(&path).load().unwrap();
        assert_eq!(people.len(), 1);

        let missing = SheetRowsSource::new(dir.path().join("nope.json")).load();
        assert!(matches!(missing, Err(FileError::NotFound(_))));
    }
}
