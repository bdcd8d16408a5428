//! Record arena of one namelist group.
//!
//! Declarations fill the arena first; the defaults pass then looks records up
//! by lowercase name and updates them by position, or appends new ones and
//! extends the index. The index lives only as long as the group's build.

use std::collections::HashMap;

use super::record::ParameterRecord;

#[derive(Debug, Clone, Default)]
pub struct GroupRecords {
    group: String,
    records: Vec<ParameterRecord>,
    by_lower_name: HashMap<String, usize>,
}

impl GroupRecords {
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            records: Vec::new(),
            by_lower_name: HashMap::new(),
        }
    }

    pub fn from_records(group: impl Into<String>, records: Vec<ParameterRecord>) -> Self {
        let mut arena = Self::new(group);
        arena.extend(records);
        arena
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// Adds a record; the first record of a name keeps the index slot
    pub fn push(&mut self, record: ParameterRecord) -> usize {
        let idx = self.records.len();
        self.by_lower_name
            .entry(record.lower_name().to_string())
            .or_insert(idx);
        self.records.push(record);
        idx
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = ParameterRecord>) {
        for record in records {
            self.push(record);
        }
    }

    pub fn position(&self, lower_name: &str) -> Option<usize> {
        self.by_lower_name.get(lower_name).copied()
    }

    pub fn get(&self, idx: usize) -> Option<&ParameterRecord> {
        self.records.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut ParameterRecord> {
        self.records.get_mut(idx)
    }

    pub fn records(&self) -> &[ParameterRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ParameterRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::record::Dtype;

    #[test]
    fn test_first_declaration_keeps_slot() {
        let mut arena = GroupRecords::new("controls");
        arena.push(ParameterRecord::declared("Alpha", Dtype::Float, 0, "controls"));
        arena.push(ParameterRecord::declared("beta", Dtype::Int, 0, "controls"));
        arena.push(ParameterRecord::declared("ALPHA", Dtype::Float, 1, "controls"));

        assert_eq!(arena.len(), 3);
        assert_eq!(arena.position("alpha"), Some(0));
        assert_eq!(arena.position("beta"), Some(1));
        assert_eq!(arena.position("gamma"), None);
    }
}
