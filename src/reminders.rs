//! Medication reminders: patient-entered schedules and the background
//! watcher that announces doses when the clock reaches a reminder time.
//!
//! The watcher compares the wall clock (minute resolution) against each
//! active medication's `HH:MM` times and hands a `ReminderMessage` to a
//! `ReminderSink`. How the message reaches the patient is the sink's job.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveTime;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::REMINDER_CHECK_INTERVAL_SECS;
use crate::db::{self, repository, DatabaseError};
use crate::models::{Medication, MedicationStatus};

/// Reminder times are stored and compared in this form.
pub const TIME_FORMAT: &str = "%H:%M";

pub const REMINDER_TITLE: &str = "Time to take your medication!";

/// Sleep granularity for shutdown responsiveness.
const SLEEP_GRANULARITY: Duration = Duration::from_millis(500);

#[derive(Error, Debug)]
pub enum ReminderError {
    #[error("Invalid medication: {0}")]
    Validation(String),

    #[error("Invalid reminder time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

// ═══════════════════════════════════════════
// Schedules
// ═══════════════════════════════════════════

/// Input for a new reminder, as entered by the patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMedication {
    pub medicine: String,
    pub dosage: String,
    pub times: Vec<String>,
}

impl NewMedication {
    /// Trim fields, normalize times to zero-padded `HH:MM`, drop duplicate times.
    pub fn validate(&self) -> Result<NewMedication, ReminderError> {
        let medicine = self.medicine.trim();
        if medicine.is_empty() {
            return Err(ReminderError::Validation("medicine name is required".into()));
        }
        let dosage = self.dosage.trim();
        if dosage.is_empty() {
            return Err(ReminderError::Validation("dosage is required".into()));
        }

        let mut times: Vec<String> = Vec::with_capacity(self.times.len());
        for raw in &self.times {
            let normalized = normalize_time(raw)?;
            if !times.contains(&normalized) {
                times.push(normalized);
            }
        }
        if times.is_empty() {
            return Err(ReminderError::Validation(
                "at least one reminder time is required".into(),
            ));
        }

        Ok(NewMedication {
            medicine: medicine.to_string(),
            dosage: dosage.to_string(),
            times,
        })
    }
}

/// Parse a reminder time and return it as `HH:MM`.
pub fn normalize_time(raw: &str) -> Result<String, ReminderError> {
    NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT)
        .map(|t| t.format(TIME_FORMAT).to_string())
        .map_err(|_| ReminderError::InvalidTime(raw.to_string()))
}

/// Validate and store a new active reminder for a patient.
pub fn add_medication(
    conn: &Connection,
    patient_id: &Uuid,
    new: &NewMedication,
) -> Result<Medication, ReminderError> {
    let valid = new.validate()?;

    if repository::get_user(conn, patient_id)?.is_none() {
        return Err(DatabaseError::NotFound {
            entity_type: "User".into(),
            id: patient_id.to_string(),
        }
        .into());
    }

    let med = Medication {
        id: Uuid::new_v4(),
        patient_id: *patient_id,
        medicine: valid.medicine,
        dosage: valid.dosage,
        times: valid.times,
        status: MedicationStatus::Active,
        created_at: repository::now_timestamp(),
    };
    repository::insert_medication(conn, &med)?;

    tracing::info!(
        medication_id = %med.id,
        patient_id = %patient_id,
        times = med.times.len(),
        "Medication reminder added"
    );
    Ok(med)
}

/// Stop reminding for a medication.
pub fn stop_medication(conn: &Connection, medication_id: &Uuid) -> Result<(), ReminderError> {
    repository::update_medication_status(conn, medication_id, MedicationStatus::Stopped)?;
    tracing::info!(medication_id = %medication_id, "Medication reminder stopped");
    Ok(())
}

/// Acknowledge a dose. Nothing is recorded beyond the log line.
pub fn mark_taken(conn: &Connection, medication_id: &Uuid) -> Result<Medication, ReminderError> {
    let med = repository::get_medication(conn, medication_id)?.ok_or_else(|| {
        DatabaseError::NotFound {
            entity_type: "Medication".into(),
            id: medication_id.to_string(),
        }
    })?;
    tracing::info!(
        medication_id = %med.id,
        medicine = %med.medicine,
        "Medication marked as taken"
    );
    Ok(med)
}

/// Active medications with a reminder at `now` (minute resolution).
pub fn due_medications(meds: &[Medication], now: NaiveTime) -> Vec<&Medication> {
    let current = now.format(TIME_FORMAT).to_string();
    meds.iter()
        .filter(|m| m.status == MedicationStatus::Active)
        .filter(|m| m.times.iter().any(|t| *t == current))
        .collect()
}

// ═══════════════════════════════════════════
// Notifications
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderMessage {
    pub medication_id: Uuid,
    pub title: String,
    pub body: String,
}

impl ReminderMessage {
    pub fn for_medication(med: &Medication) -> Self {
        Self {
            medication_id: med.id,
            title: REMINDER_TITLE.to_string(),
            body: format!("{} - {}", med.medicine, med.dosage),
        }
    }
}

/// Delivery target for due reminders.
pub trait ReminderSink: Send {
    fn notify(&self, message: &ReminderMessage);
}

// ═══════════════════════════════════════════
// Background watcher
// ═══════════════════════════════════════════

/// Handle for the reminder watcher thread.
///
/// Supports graceful shutdown via `shutdown()` or automatic cleanup on `Drop`.
pub struct ReminderWatcherHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl ReminderWatcherHandle {
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ReminderWatcherHandle {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

struct WatcherConfig {
    db_path: PathBuf,
    patient_id: Uuid,
    interval: Duration,
    clock: fn() -> NaiveTime,
}

fn local_clock() -> NaiveTime {
    chrono::Local::now().time()
}

/// Start watching a patient's reminders on a separate thread, checking every
/// `REMINDER_CHECK_INTERVAL_SECS`.
pub fn start_reminder_watcher(
    db_path: PathBuf,
    patient_id: Uuid,
    sink: Box<dyn ReminderSink>,
) -> ReminderWatcherHandle {
    spawn_watcher(
        WatcherConfig {
            db_path,
            patient_id,
            interval: Duration::from_secs(REMINDER_CHECK_INTERVAL_SECS),
            clock: local_clock,
        },
        sink,
    )
}

fn spawn_watcher(config: WatcherConfig, sink: Box<dyn ReminderSink>) -> ReminderWatcherHandle {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();

    let handle = std::thread::spawn(move || {
        tracing::info!(
            patient_id = %config.patient_id,
            "Reminder watcher started (check every {}s)",
            config.interval.as_secs()
        );
        match db::open_database(&config.db_path) {
            Ok(conn) => watcher_loop(&conn, &config, sink.as_ref(), &flag),
            Err(e) => tracing::error!(error = %e, "Reminder watcher could not open database"),
        }
        tracing::info!("Reminder watcher shutting down");
    });

    ReminderWatcherHandle {
        shutdown,
        handle: Some(handle),
    }
}

fn watcher_loop(
    conn: &Connection,
    config: &WatcherConfig,
    sink: &dyn ReminderSink,
    shutdown: &AtomicBool,
) {
    // A minute is announced at most once even when checks run faster than the clock.
    let mut last_minute: Option<String> = None;

    while !shutdown.load(Ordering::Relaxed) {
        let now = (config.clock)();
        let minute = now.format(TIME_FORMAT).to_string();

        if last_minute.as_deref() != Some(minute.as_str()) {
            match check_reminders(conn, &config.patient_id, now) {
                Ok(messages) => {
                    for message in &messages {
                        sink.notify(message);
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Reminder check failed"),
            }
            last_minute = Some(minute);
        }

        sleep_unless_shutdown(config.interval, shutdown);
    }
}

fn sleep_unless_shutdown(total: Duration, shutdown: &AtomicBool) {
    let deadline = Instant::now() + total;
    loop {
        if shutdown.load(Ordering::Relaxed) {
            return;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return;
        }
        std::thread::sleep(remaining.min(SLEEP_GRANULARITY));
    }
}

/// One watcher tick: messages for every reminder due at `now`.
pub fn check_reminders(
    conn: &Connection,
    patient_id: &Uuid,
    now: NaiveTime,
) -> Result<Vec<ReminderMessage>, ReminderError> {
    let meds = repository::get_active_medications(conn, patient_id)?;
    let messages: Vec<ReminderMessage> = due_medications(&meds, now)
        .into_iter()
        .map(ReminderMessage::for_medication)
        .collect();

    if !messages.is_empty() {
        tracing::debug!(
            patient_id = %patient_id,
            due = messages.len(),
            "Reminders due"
        );
    }
    Ok(messages)
}
