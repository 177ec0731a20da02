use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::summarize;
use crate::models::{DailyAggregate, StudentDay};
use crate::selection::Selection;
use crate::session::SessionView;
use crate::store::Roster;

const BAR_WIDTH: usize = 40;
pub const NO_DATA: &str = "No attendance data available.";

pub fn render_bar(percentage: f64) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

pub fn render_chart(aggregates: &[DailyAggregate]) -> String {
    let mut output = String::new();

    if aggregates.is_empty() {
        let _ = writeln!(output, "{NO_DATA}");
        return output;
    }

    for (index, day) in aggregates.iter().enumerate() {
        let _ = writeln!(
            output,
            "[{:>2}] {} |{}| {:>5.1}% ({} present)",
            index,
            day.display_date,
            render_bar(day.percentage),
            day.percentage,
            day.present_ids.len()
        );
    }

    output
}

pub fn render_present_names(date: Option<&str>, names: &[String]) -> String {
    let mut output = String::new();
    match date {
        None => {
            let _ = writeln!(output, "No day selected.");
        }
        Some(date) if names.is_empty() => {
            let _ = writeln!(output, "Nobody recorded present on {date}.");
        }
        Some(date) => {
            let _ = writeln!(output, "Present on {date} ({}):", names.len());
            for name in names {
                let _ = writeln!(output, "- {name}");
            }
        }
    }
    output
}

pub fn render_history(student_label: Option<&str>, history: &[StudentDay]) -> String {
    let mut output = String::new();
    match student_label {
        None => {
            let _ = writeln!(output, "No student selected.");
        }
        Some(label) if history.is_empty() => {
            let _ = writeln!(output, "No attendance history for {label}.");
        }
        Some(label) => {
            let _ = writeln!(output, "History for {label}:");
            for day in history {
                let _ = writeln!(output, "- {}: {}", day.date, day.status);
            }
        }
    }
    output
}

pub fn student_label(roster: &Roster, student_id: i64) -> String {
    match roster.name_of(student_id) {
        Some(name) => format!("{name} (#{student_id})"),
        None => format!("student #{student_id}"),
    }
}

pub fn render_roster(roster: &Roster) -> String {
    let mut output = String::new();
    if roster.is_empty() {
        let _ = writeln!(output, "Roster is empty.");
        return output;
    }
    for student in roster.students() {
        let _ = writeln!(output, "{:>4}  {}", student.id, student.name);
    }
    output
}

pub fn build_report(
    view: &SessionView,
    selection: &Selection,
    roster: &Roster,
    generated_at: DateTime<Utc>,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Classroom Attendance Report");
    let _ = writeln!(output, "Generated {}", generated_at.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(output);

    let (aggregates, present_names, history) = match view {
        SessionView::Loading => {
            let _ = writeln!(output, "Attendance data is still loading.");
            return output;
        }
        SessionView::Failed { message } => {
            let _ = writeln!(output, "{message}");
            return output;
        }
        SessionView::NoData => {
            let _ = writeln!(output, "{NO_DATA}");
            return output;
        }
        SessionView::Ready {
            aggregates,
            present_names,
            history,
        } => (aggregates, present_names, history),
    };

    let summary = summarize(aggregates);
    let _ = writeln!(output, "## Summary");
    let _ = writeln!(
        output,
        "- {} students, {} recorded days",
        roster.len(),
        summary.days
    );
    let _ = writeln!(output, "- Mean attendance {:.1}%", summary.mean_percentage);
    if let Some(best) = &summary.best {
        let _ = writeln!(output, "- Best day {} at {:.1}%", best.full_date, best.percentage);
    }
    if let Some(worst) = &summary.worst {
        let _ = writeln!(output, "- Lowest day {} at {:.1}%", worst.full_date, worst.percentage);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Daily Attendance");
    let _ = writeln!(output, "| Date | Attendance | Present |");
    let _ = writeln!(output, "| --- | ---: | ---: |");
    for day in aggregates {
        let _ = writeln!(
            output,
            "| {} | {:.1}% | {} |",
            day.full_date,
            day.percentage,
            day.present_ids.len()
        );
    }

    if selection.is_idle() {
        let _ = writeln!(output);
        let _ = writeln!(output, "No day or student selected.");
        return output;
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Selected Day");
    output.push_str(&render_present_names(
        selection.selected_date.as_deref(),
        present_names,
    ));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Selected Student");
    let label = selection
        .selected_student_id
        .map(|id| student_label(roster, id));
    output.push_str(&render_history(label.as_deref(), history));

    output
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    display_date: &'a str,
    full_date: &'a str,
    percentage: f64,
    present_count: usize,
    present_ids: String,
}

pub fn write_csv<W: std::io::Write>(writer: W, aggregates: &[DailyAggregate]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);

    for day in aggregates {
        writer.serialize(CsvRow {
            display_date: &day.display_date,
            full_date: &day.full_date,
            percentage: day.percentage,
            present_count: day.present_ids.len(),
            present_ids: day
                .present_ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(";"),
        })?;
    }

    writer.flush()?;
    Ok(())
}
