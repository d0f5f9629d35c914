//! Thread-safe ordered list of records.

use std::sync::RwLock;

use crate::record::Record;

pub struct Records {
    inner: RwLock<Vec<Record>>,
}

impl Records {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Vec::new()),
        }
    }

    pub fn push(&self, record: Record) {
        if let Ok(mut guard) = self.inner.write() {
            guard.push(record);
        }
    }

    /// Drops every record with the given id and returns how many went.
    pub fn remove(&self, id: &str) -> usize {
        match self.inner.write() {
            Ok(mut guard) => {
                let before = guard.len();
                guard.retain(|record| record.id != id);
                before - guard.len()
            }
            Err(_) => 0,
        }
    }

    pub fn replace(&self, records: Vec<Record>) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = records;
        }
    }

    pub fn get(&self, id: &str) -> Option<Record> {
        self.inner
            .read()
            .ok()?
            .iter()
            .find(|record| record.id == id)
            .cloned()
    }

    pub fn find(&self, query: &str) -> Vec<Record> {
        self.inner
            .read()
            .map(|g| g.iter().filter(|r| r.matches(query)).cloned().collect())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> Vec<Record> {
        self.inner.read().map(|g| g.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().map(|g| g.is_empty()).unwrap_or(true)
    }
}

impl Default for Records {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::AdditionalInfo;
    use chrono::Utc;

    fn record(id: &str, phone: &str, name: &str) -> Record {
        Record::new(id, phone, name, AdditionalInfo::new(), Utc::now()).unwrap()
    }

    #[test]
    fn find_keeps_insertion_order() {
        let records = Records::new();
        records.push(record("1", "+111", "Zed Jones"));
        records.push(record("2", "+222", "Amy Jones"));
        records.push(record("3", "+333", "Bob"));

        let ids: Vec<_> = records.find("jones").into_iter().map(|r| r.id).collect();
        assert_eq!(ids, ["1", "2"]);
        assert_eq!(records.find("").len(), 3);
    }

    #[test]
    fn remove_drops_all_matches() {
        let records = Records::new();
        records.push(record("1", "+111", "A"));
        records.push(record("1", "+112", "B"));
        records.push(record("2", "+222", "C"));

        assert_eq!(records.remove("1"), 2);
        assert_eq!(records.remove("9"), 0);
        assert_eq!(records.len(), 1);
        assert!(records.get("2").is_some());
    }
}
