//! Column header mapping

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Header text for each column a sheet may carry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub id: String,
    pub name: String,
    pub department: String,
    /// Export only: prize tier (pool name)
    pub prize: String,
    /// Export only: specific item won
    pub item: String,
}

impl ColumnMap {
    /// Headers of the template sheet handed out to organisers
    pub fn chinese() -> Self {
        Self {
            id: "序号".into(),
            name: "姓名".into(),
            department: "部门".into(),
            prize: "奖项".into(),
            item: "具体奖品".into(),
        }
    }

    pub fn english() -> Self {
        Self {
            id: "ID".into(),
            name: "Name".into(),
            department: "Department".into(),
            prize: "Prize".into(),
            item: "Item".into(),
        }
    }

    /// Built-in maps, in detection order
    pub fn builtin() -> [Self; 2] {
        [Self::chinese(), Self::english()]
    }

    /// True if the row carries both identifying columns
    pub fn matches(&self, row: &Map<String, Value>) -> bool {
        row.contains_key(&self.id) && row.contains_key(&self.name)
    }

    /// First built-in map whose id and name headers appear in `row`
    pub fn detect(row: &Map<String, Value>) -> Option<Self> {
        Self::builtin().into_iter().find(|map| map.matches(row))
    }
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self::chinese()
    }
}
