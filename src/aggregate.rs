use crate::models::DailyAggregate;
use crate::store::{AttendanceLog, Roster};

pub fn aggregate(roster: &Roster, logs: &AttendanceLog) -> Vec<DailyAggregate> {
    logs.entries()
        .iter()
        .map(|entry| DailyAggregate {
            display_date: display_date(&entry.date).to_string(),
            full_date: entry.date.clone(),
            percentage: attendance_percentage(entry.present_ids.len(), roster.len()),
            present_ids: entry.present_ids.clone(),
        })
        .collect()
}

pub fn attendance_percentage(present: usize, roster_size: usize) -> f64 {
    if roster_size == 0 {
        return 0.0;
    }
    // Tenths in integer arithmetic so exact midpoints such as 28.75 round up.
    let present = present as u64;
    let roster_size = roster_size as u64;
    let tenths = (2000 * present + roster_size) / (2 * roster_size);
    tenths as f64 / 10.0
}

/// `floor(10x + 0.5) / 10`
pub fn round_half_up_1(value: f64) -> f64 {
    ((value * 10.0) + 0.5).floor() / 10.0
}

/// "YYYY-MM-DD" -> "MM-DD". Shorter input yields "".
pub fn display_date(full_date: &str) -> &str {
    full_date.get(5..).unwrap_or("")
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceSummary {
    pub days: usize,
    pub mean_percentage: f64,
    pub best: Option<DailyAggregate>,
    pub worst: Option<DailyAggregate>,
}

pub fn summarize(aggregates: &[DailyAggregate]) -> AttendanceSummary {
    let mean_percentage = if aggregates.is_empty() {
        0.0
    } else {
        round_half_up_1(
            aggregates.iter().map(|day| day.percentage).sum::<f64>() / aggregates.len() as f64,
        )
    };

    // Ties resolve to the earliest day in source order.
    let mut best: Option<&DailyAggregate> = None;
    let mut worst: Option<&DailyAggregate> = None;
    for day in aggregates {
        if best.map_or(true, |current| day.percentage > current.percentage) {
            best = Some(day);
        }
        if worst.map_or(true, |current| day.percentage < current.percentage) {
            worst = Some(day);
        }
    }

    AttendanceSummary {
        days: aggregates.len(),
        mean_percentage,
        best: best.cloned(),
        worst: worst.cloned(),
    }
}
