use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::warn;

use crate::models::{AttendanceLogEntry, StudentRecord};

/// Students keyed by id. Built once per fetch and replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    students: Vec<StudentRecord>,
    index: HashMap<i64, usize>,
}

impl Roster {
    /// The first record for an id wins; later duplicates are dropped.
    pub fn from_records(records: Vec<StudentRecord>) -> Self {
        let mut students = Vec::with_capacity(records.len());
        let mut index = HashMap::with_capacity(records.len());

        for record in records {
            if index.contains_key(&record.id) {
                warn!(
                    target: "attendance::store",
                    id = record.id,
                    name = %record.name,
                    "duplicate student id in roster, keeping first record"
                );
                continue;
            }
            index.insert(record.id, students.len());
            students.push(record);
        }

        Self { students, index }
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn name_of(&self, id: i64) -> Option<&str> {
        self.index
            .get(&id)
            .map(|&position| self.students[position].name.as_str())
    }

    pub fn students(&self) -> &[StudentRecord] {
        &self.students
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceLog {
    entries: Vec<AttendanceLogEntry>,
}

impl AttendanceLog {
    pub fn new(entries: Vec<AttendanceLogEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[AttendanceLogEntry] {
        &self.entries
    }

    pub fn find(&self, date: &str) -> Option<&AttendanceLogEntry> {
        self.entries.iter().find(|entry| entry.date == date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogAudit {
    pub duplicate_dates: Vec<String>,
    pub malformed_dates: Vec<String>,
}

impl LogAudit {
    pub fn is_clean(&self) -> bool {
        self.duplicate_dates.is_empty() && self.malformed_dates.is_empty()
    }
}

/// Flags entries the aggregator would pass through silently. Nothing is
/// rejected here.
pub fn audit_log(log: &AttendanceLog) -> LogAudit {
    let mut seen = HashSet::new();
    let mut audit = LogAudit::default();

    for entry in log.entries() {
        if !seen.insert(entry.date.as_str()) && !audit.duplicate_dates.contains(&entry.date) {
            audit.duplicate_dates.push(entry.date.clone());
        }
        if entry.date.len() != 10 || NaiveDate::parse_from_str(&entry.date, "%Y-%m-%d").is_err() {
            audit.malformed_dates.push(entry.date.clone());
        }
    }

    audit
}
