use tracing::{debug, info, warn};

use crate::aggregate::aggregate;
use crate::drilldown::{history_for_student, present_names_for_date};
use crate::error::{FetchError, FetchResult};
use crate::models::{AttendanceLogEntry, DailyAggregate, StudentDay, StudentRecord};
use crate::selection::Selection;
use crate::source::DataSource;
use crate::store::{audit_log, AttendanceLog, Roster};

pub const FETCH_FAILURE_MESSAGE: &str = "Unable to load attendance data. Reload to try again.";

pub type RequestId = u64;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed { message: String },
}

#[derive(Debug)]
pub enum SessionEvent {
    RosterLoaded {
        request: RequestId,
        records: Vec<StudentRecord>,
    },
    LogsLoaded {
        request: RequestId,
        entries: Vec<AttendanceLogEntry>,
    },
    FetchFailed {
        request: RequestId,
        error: FetchError,
    },
    DateSelected(String),
    StudentSelected(Option<i64>),
    BarActivated(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionView {
    Loading,
    Failed {
        message: String,
    },
    NoData,
    Ready {
        aggregates: Vec<DailyAggregate>,
        present_names: Vec<String>,
        history: Vec<StudentDay>,
    },
}

/// Owns both stores, the selection and the last aggregate. All mutation goes
/// through `apply`, on whichever task owns the session.
#[derive(Debug, Default)]
pub struct Session {
    roster: Roster,
    logs: AttendanceLog,
    selection: Selection,
    aggregates: Vec<DailyAggregate>,
    phase: Phase,
    current_request: RequestId,
    roster_arrived: bool,
    logs_arrived: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new load cycle. Completions tagged with an earlier request
    /// are dropped from here on.
    pub fn begin_load(&mut self) -> RequestId {
        self.current_request += 1;
        self.phase = Phase::Loading;
        self.roster_arrived = false;
        self.logs_arrived = false;
        debug!(target: "attendance::session", request = self.current_request, "load started");
        self.current_request
    }

    /// Issues both fetches concurrently and applies each completion as it
    /// arrives.
    pub async fn load(&mut self, source: &dyn DataSource) {
        let request = self.begin_load();
        let roster = source.fetch_roster();
        let logs = source.fetch_logs();
        tokio::pin!(roster, logs);

        let mut roster_done = false;
        let mut logs_done = false;
        while !(roster_done && logs_done) {
            tokio::select! {
                result = &mut roster, if !roster_done => {
                    roster_done = true;
                    self.apply(roster_event(request, result));
                }
                result = &mut logs, if !logs_done => {
                    logs_done = true;
                    self.apply(logs_event(request, result));
                }
            }
        }
    }

    /// Returns false when the event was ignored.
    pub fn apply(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::RosterLoaded { request, records } => {
                if !self.accepts(request) {
                    return false;
                }
                self.roster = Roster::from_records(records);
                self.roster_arrived = true;
                info!(target: "attendance::session", request, students = self.roster.len(), "roster loaded");
                self.after_store_change();
                true
            }
            SessionEvent::LogsLoaded { request, entries } => {
                if !self.accepts(request) {
                    return false;
                }
                self.logs = AttendanceLog::new(entries);
                self.logs_arrived = true;
                info!(target: "attendance::session", request, days = self.logs.len(), "attendance log loaded");

                let audit = audit_log(&self.logs);
                if !audit.is_clean() {
                    warn!(
                        target: "attendance::session",
                        duplicate_dates = ?audit.duplicate_dates,
                        malformed_dates = ?audit.malformed_dates,
                        "attendance log has irregular dates; passing through unchanged"
                    );
                }
                self.after_store_change();
                true
            }
            SessionEvent::FetchFailed { request, error } => {
                if !self.accepts(request) {
                    return false;
                }
                warn!(target: "attendance::session", request, error = %error, "fetch failed");
                self.phase = Phase::Failed {
                    message: FETCH_FAILURE_MESSAGE.to_string(),
                };
                true
            }
            SessionEvent::DateSelected(date) => {
                self.selection = std::mem::take(&mut self.selection).select_date(date);
                true
            }
            SessionEvent::StudentSelected(student_id) => {
                self.selection = std::mem::take(&mut self.selection).select_student(student_id);
                true
            }
            SessionEvent::BarActivated(index) => match self.aggregates.get(index) {
                Some(day) => {
                    let date = day.full_date.clone();
                    self.selection = std::mem::take(&mut self.selection).select_date(date);
                    true
                }
                None => {
                    debug!(target: "attendance::session", index, "bar index out of range");
                    false
                }
            },
        }
    }

    fn accepts(&self, request: RequestId) -> bool {
        if request != self.current_request {
            debug!(
                target: "attendance::session",
                request,
                current = self.current_request,
                "dropping stale completion"
            );
            return false;
        }
        // A failed cycle never reconciles the store that did succeed.
        !matches!(self.phase, Phase::Failed { .. })
    }

    fn after_store_change(&mut self) {
        if !self.roster.is_empty() && !self.logs.is_empty() {
            self.aggregates = aggregate(&self.roster, &self.logs);
        }
        if self.roster_arrived && self.logs_arrived {
            self.phase = Phase::Ready;
        }
    }

    pub fn view(&self) -> SessionView {
        match &self.phase {
            Phase::Idle | Phase::Loading => SessionView::Loading,
            Phase::Failed { message } => SessionView::Failed {
                message: message.clone(),
            },
            Phase::Ready if self.roster.is_empty() || self.logs.is_empty() => SessionView::NoData,
            Phase::Ready => SessionView::Ready {
                aggregates: self.aggregates.clone(),
                present_names: self.present_names(),
                history: self.history(),
            },
        }
    }

    pub fn present_names(&self) -> Vec<String> {
        present_names_for_date(self.selection.selected_date.as_deref(), &self.roster, &self.logs)
    }

    pub fn history(&self) -> Vec<StudentDay> {
        history_for_student(self.selection.selected_student_id, &self.logs)
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn logs(&self) -> &AttendanceLog {
        &self.logs
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn aggregates(&self) -> &[DailyAggregate] {
        &self.aggregates
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }
}

fn roster_event(request: RequestId, result: FetchResult<Vec<StudentRecord>>) -> SessionEvent {
    match result {
        Ok(records) => SessionEvent::RosterLoaded { request, records },
        Err(error) => SessionEvent::FetchFailed { request, error },
    }
}

fn logs_event(request: RequestId, result: FetchResult<Vec<AttendanceLogEntry>>) -> SessionEvent {
    match result {
        Ok(entries) => SessionEvent::LogsLoaded { request, entries },
        Err(error) => SessionEvent::FetchFailed { request, error },
    }
}
