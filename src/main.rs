use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use attendance_chart::logging::init_logging;
use attendance_chart::report;
use attendance_chart::session::{Session, SessionEvent, SessionView};
use attendance_chart::source::{
    DataSource, FileSource, HttpSource, SourceConfig, DEFAULT_LOGS_PATH, DEFAULT_ROSTER_PATH,
};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "attendance-chart")]
#[command(about = "Daily classroom attendance chart with day and student drill-downs", long_about = None)]
struct Cli {
    /// Base URL serving the roster and attendance endpoints
    #[arg(long, env = "ATTENDANCE_API_URL", global = true)]
    api_url: Option<String>,
    #[arg(long, default_value = DEFAULT_ROSTER_PATH, global = true)]
    roster_path: String,
    #[arg(long, default_value = DEFAULT_LOGS_PATH, global = true)]
    logs_path: String,
    /// Read the roster from a JSON file instead of the API
    #[arg(long, requires = "logs_file", global = true)]
    roster_file: Option<PathBuf>,
    /// Read the attendance log from a JSON file instead of the API
    #[arg(long, requires = "roster_file", global = true)]
    logs_file: Option<PathBuf>,
    #[arg(long, default_value_t = 10, global = true)]
    timeout_secs: u64,
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the daily attendance chart
    Chart {
        /// Activate the bar at this index
        #[arg(long)]
        select_bar: Option<usize>,
        #[arg(long)]
        student: Option<i64>,
    },
    /// List students present on a day
    Day {
        #[arg(long)]
        date: String,
    },
    /// Show one student's attendance history
    Student {
        #[arg(long)]
        id: i64,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        student: Option<i64>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export the daily aggregates as CSV
    Export {
        #[arg(long, default_value = "attendance.csv")]
        out: PathBuf,
    },
    /// List the roster
    Roster,
}

fn build_source(cli: &Cli) -> anyhow::Result<Box<dyn DataSource>> {
    if let (Some(roster_file), Some(logs_file)) = (&cli.roster_file, &cli.logs_file) {
        return Ok(Box::new(FileSource::new(roster_file, logs_file)));
    }

    let Some(api_url) = &cli.api_url else {
        bail!("set ATTENDANCE_API_URL (or --api-url), or pass --roster-file and --logs-file");
    };

    let config = SourceConfig {
        base_url: api_url.clone(),
        roster_path: cli.roster_path.clone(),
        logs_path: cli.logs_path.clone(),
        timeout: Duration::from_secs(cli.timeout_secs.max(1)),
    };
    let source = HttpSource::try_new(&config).context("failed to build HTTP client")?;
    Ok(Box::new(source))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose).context("failed to initialise logging")?;

    let source = build_source(&cli)?;
    let mut session = Session::new();
    session.load(source.as_ref()).await;

    match session.view() {
        SessionView::Failed { message } => bail!(message),
        SessionView::Loading => bail!("attendance data did not finish loading"),
        SessionView::NoData if !matches!(cli.command, Commands::Roster) => {
            println!("{}", report::NO_DATA);
            return Ok(());
        }
        _ => {}
    }

    match cli.command {
        Commands::Chart {
            select_bar,
            student,
        } => {
            print!("{}", report::render_chart(session.aggregates()));

            if let Some(index) = select_bar {
                if !session.apply(SessionEvent::BarActivated(index)) {
                    bail!("no bar at index {index}");
                }
                println!();
                print!(
                    "{}",
                    report::render_present_names(
                        session.selection().selected_date.as_deref(),
                        &session.present_names()
                    )
                );
            }
            if student.is_some() {
                session.apply(SessionEvent::StudentSelected(student));
                println!();
                print_history(&session);
            }
        }
        Commands::Day { date } => {
            session.apply(SessionEvent::DateSelected(date));
            print!(
                "{}",
                report::render_present_names(
                    session.selection().selected_date.as_deref(),
                    &session.present_names()
                )
            );
        }
        Commands::Student { id } => {
            session.apply(SessionEvent::StudentSelected(Some(id)));
            print_history(&session);
        }
        Commands::Report { date, student, out } => {
            if let Some(date) = date {
                session.apply(SessionEvent::DateSelected(date));
            }
            session.apply(SessionEvent::StudentSelected(student));

            let output = report::build_report(
                &session.view(),
                session.selection(),
                session.roster(),
                chrono::Utc::now(),
            );
            std::fs::write(&out, output)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { out } => {
            let file = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            report::write_csv(file, session.aggregates())?;
            println!(
                "Exported {} days to {}.",
                session.aggregates().len(),
                out.display()
            );
        }
        Commands::Roster => {
            print!("{}", report::render_roster(session.roster()));
        }
    }

    Ok(())
}

fn print_history(session: &Session) {
    let label = session
        .selection()
        .selected_student_id
        .map(|id| report::student_label(session.roster(), id));
    print!(
        "{}",
        report::render_history(label.as_deref(), &session.history())
    );
}
