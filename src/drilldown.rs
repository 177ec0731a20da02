use crate::aggregate::display_date;
use crate::models::{AttendanceStatus, StudentDay};
use crate::store::{AttendanceLog, Roster};

pub fn present_names_for_date(
    date: Option<&str>,
    roster: &Roster,
    logs: &AttendanceLog,
) -> Vec<String> {
    let Some(date) = date else {
        return Vec::new();
    };
    if roster.is_empty() {
        return Vec::new();
    }
    let Some(entry) = logs.find(date) else {
        return Vec::new();
    };

    entry
        .present_ids
        .iter()
        .map(|&id| match roster.name_of(id) {
            Some(name) => name.to_string(),
            None => unknown_student_label(id),
        })
        .collect()
}

pub fn unknown_student_label(id: i64) -> String {
    format!("ID: {id}")
}

/// One row per log entry, ordered by "MM-DD". Entries from different years
/// interleave.
pub fn history_for_student(student_id: Option<i64>, logs: &AttendanceLog) -> Vec<StudentDay> {
    let Some(student_id) = student_id else {
        return Vec::new();
    };

    let mut history: Vec<StudentDay> = logs
        .entries()
        .iter()
        .map(|entry| StudentDay {
            date: display_date(&entry.date).to_string(),
            status: if entry.present_ids.contains(&student_id) {
                AttendanceStatus::Present
            } else {
                AttendanceStatus::Absent
            },
        })
        .collect();

    history.sort_by(|a, b| a.date.cmp(&b.date));
    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendanceLogEntry, StudentRecord};

    fn roster() -> Roster {
        Roster::from_records(vec![
            StudentRecord {
                id: 2,
                name: "Jules Moreno".to_string(),
            },
            StudentRecord {
                id: 7,
                name: "Kiara Patel".to_string(),
            },
        ])
    }

    fn log_of(entries: &[(&str, &[i64])]) -> AttendanceLog {
        AttendanceLog::new(
            entries
                .iter()
                .map(|(date, present)| AttendanceLogEntry {
                    date: date.to_string(),
                    present_ids: present.to_vec(),
                })
                .collect(),
        )
    }

    #[test]
    fn unknown_ids_fall_back_to_label() {
        let logs = log_of(&[("2025-05-01", &[2, 7, 99])]);
        let names = present_names_for_date(Some("2025-05-01"), &roster(), &logs);

        assert_eq!(names, vec!["Jules Moreno", "Kiara Patel", "ID: 99"]);
    }

    #[test]
    fn names_follow_present_id_order() {
        let logs = log_of(&[("2025-05-01", &[7, 2])]);
        let names = present_names_for_date(Some("2025-05-01"), &roster(), &logs);

        assert_eq!(names, vec!["Kiara Patel", "Jules Moreno"]);
    }

    #[test]
    fn day_drilldown_is_empty_without_a_match() {
        let logs = log_of(&[("2025-05-01", &[2])]);

        assert!(present_names_for_date(None, &roster(), &logs).is_empty());
        assert!(present_names_for_date(Some("2025-06-01"), &roster(), &logs).is_empty());
        assert!(present_names_for_date(Some("2025-05-01"), &Roster::default(), &logs).is_empty());
    }

    #[test]
    fn history_is_sorted_by_display_date() {
        let logs = log_of(&[
            ("2025-05-03", &[1]),
            ("2025-05-01", &[1]),
            ("2025-05-02", &[3]),
        ]);
        let history = history_for_student(Some(3), &logs);

        assert_eq!(
            history,
            vec![
                StudentDay {
                    date: "05-01".to_string(),
                    status: AttendanceStatus::Absent,
                },
                StudentDay {
                    date: "05-02".to_string(),
                    status: AttendanceStatus::Present,
                },
                StudentDay {
                    date: "05-03".to_string(),
                    status: AttendanceStatus::Absent,
                },
            ]
        );
    }

    #[test]
    fn history_is_empty_without_student_or_logs() {
        let logs = log_of(&[("2025-05-01", &[3])]);

        assert!(history_for_student(None, &logs).is_empty());
        assert!(history_for_student(Some(3), &AttendanceLog::default()).is_empty());
    }

    #[test]
    fn history_covers_unknown_student_as_absent() {
        let logs = log_of(&[("2025-05-01", &[3]), ("2025-05-02", &[])]);
        let history = history_for_student(Some(42), &logs);

        assert_eq!(history.len(), 2);
        assert!(history
            .iter()
            .all(|day| day.status == AttendanceStatus::Absent));
    }
}
