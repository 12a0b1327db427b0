use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use uuid::Uuid;

use medilens_lib::appointments::{self, NewAppointment};
use medilens_lib::config;
use medilens_lib::db::{self, repository};
use medilens_lib::emergency;
use medilens_lib::models::{User, UserRole};
use medilens_lib::pipeline::extraction::{NoOcr, Upload};
use medilens_lib::pipeline::prediction::predict;
use medilens_lib::pipeline::processor::{self, ReportProcessor};
use medilens_lib::pipeline::storage::LocalFileStore;
use medilens_lib::reminders::{self, NewMedication, ReminderMessage, ReminderSink};

#[derive(Parser, Debug)]
#[command(
    name = "medilens",
    version,
    about = "Detect conditions and vitals in medical report text."
)]
struct Cli {
    /// Database file (defaults to the application data directory).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a report file (image or text).
    Analyze {
        file: PathBuf,
        /// Owner of the report, required with --save.
        #[arg(long)]
        user: Option<Uuid>,
        /// Store the file and save the report.
        #[arg(long, requires = "user")]
        save: bool,
    },
    /// Run the prediction engine on literal text.
    Predict { text: String },
    /// List a user's saved reports, newest first.
    Reports {
        user: Uuid,
        /// Delete this report (and its stored file) instead of listing.
        #[arg(long)]
        delete: Option<Uuid>,
    },
    #[command(subcommand)]
    Remind(RemindCommand),
    #[command(subcommand)]
    Emergency(EmergencyCommand),
    #[command(subcommand)]
    Appointment(AppointmentCommand),
    #[command(subcommand)]
    User(UserCommand),
}

/// Medication reminders.
#[derive(Subcommand, Debug)]
enum RemindCommand {
    Add {
        patient: Uuid,
        #[arg(long)]
        medicine: String,
        #[arg(long)]
        dosage: String,
        /// Reminder time as HH:MM, repeatable.
        #[arg(long = "at", required = true)]
        times: Vec<String>,
    },
    /// Reminders due now.
    Due { patient: Uuid },
    /// Announce reminders as they come due.
    Watch {
        patient: Uuid,
        /// Stop after this many minutes instead of running forever.
        #[arg(long)]
        minutes: Option<u64>,
    },
    Stop { medication: Uuid },
    Taken { medication: Uuid },
}

/// Emergency alerts.
#[derive(Subcommand, Debug)]
enum EmergencyCommand {
    Raise { patient: Uuid, condition: String },
    Pending { doctor: Uuid },
    Ack { emergency: Uuid, doctor: Uuid },
}

/// Doctor appointments.
#[derive(Subcommand, Debug)]
enum AppointmentCommand {
    Book {
        patient: Uuid,
        #[arg(long)]
        doctor: Uuid,
        #[arg(long)]
        department: String,
        /// YYYY-MM-DD, today or later.
        #[arg(long)]
        date: String,
        /// Half-hour slot, "14:30" or "02:30 PM".
        #[arg(long)]
        time: String,
    },
    /// Upcoming appointments first, then past ones.
    List { patient: Uuid },
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Add {
        name: String,
        email: String,
        #[arg(long, value_parser = parse_role, default_value = "patient")]
        role: UserRole,
    },
    List {
        #[arg(long, value_parser = parse_role, default_value = "doctor")]
        role: UserRole,
    },
}

fn parse_role(s: &str) -> Result<UserRole, String> {
    s.parse::<UserRole>().map_err(|e| e.to_string())
}

struct StdoutSink;

impl ReminderSink for StdoutSink {
    fn notify(&self, message: &ReminderMessage) {
        println!("{}\n  {}", message.title, message.body);
    }
}

fn report_processor() -> ReportProcessor {
    ReportProcessor::new(
        Box::new(NoOcr),
        Box::new(LocalFileStore::new(config::reports_dir())),
        config::MAX_UPLOAD_BYTES,
    )
}

/// `--minutes` as a sleep; huge values saturate instead of overflowing.
fn watch_duration(minutes: u64) -> Duration {
    Duration::from_secs(minutes.saturating_mul(60))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    medilens_lib::init_tracing();
    let cli = Cli::parse();

    let db_path = cli.db.unwrap_or_else(config::database_path);
    let open = || {
        db::open_database(&db_path)
            .with_context(|| format!("Cannot open database {}", db_path.display()))
    };

    match cli.command {
        Command::Predict { text } => print_json(&predict(&text))?,

        Command::Analyze { file, user, save } => {
            let upload = Upload::from_path(&file)
                .with_context(|| format!("Cannot read {}", file.display()))?;
            let processor = report_processor();

            match (save, user) {
                (true, Some(user_id)) => {
                    let conn = open()?;
                    let outcome = processor.analyze_medical_report(&conn, &upload, &user_id)?;
                    print_json(&outcome)?;
                }
                (true, None) => bail!("--save needs --user"),
                (false, _) => print_json(&processor.preview(&upload)?)?,
            }
        }

        Command::Reports { user, delete } => {
            let conn = open()?;
            match delete {
                Some(report_id) => {
                    report_processor().delete_report(&conn, &report_id, &user)?;
                    println!("Deleted report {report_id}");
                }
                None => print_json(&processor::get_user_reports(&conn, &user)?)?,
            }
        }

        Command::Remind(cmd) => run_remind(cmd, &db_path, open()?)?,

        Command::Emergency(cmd) => {
            let conn = open()?;
            match cmd {
                EmergencyCommand::Raise { patient, condition } => {
                    print_json(&emergency::raise_emergency(&conn, &patient, &condition)?)?
                }
                EmergencyCommand::Pending { doctor } => {
                    print_json(&emergency::pending_emergencies_for_doctor(&conn, &doctor)?)?
                }
                EmergencyCommand::Ack { emergency: id, doctor } => {
                    print_json(&emergency::acknowledge_emergency(&conn, &id, &doctor)?)?
                }
            }
        }

        Command::Appointment(cmd) => {
            let conn = open()?;
            let today = chrono::Local::now().date_naive();
            match cmd {
                AppointmentCommand::Book {
                    patient,
                    doctor,
                    department,
                    date,
                    time,
                } => {
                    let new = NewAppointment {
                        doctor_id: doctor,
                        department,
                        date,
                        time,
                    };
                    print_json(&appointments::create_appointment(&conn, &patient, &new, today)?)?;
                }
                AppointmentCommand::List { patient } => {
                    print_json(&appointments::get_user_appointments(&conn, &patient, today)?)?
                }
            }
        }

        Command::User(cmd) => {
            let conn = open()?;
            match cmd {
                UserCommand::Add { name, email, role } => {
                    let name = name.trim();
                    if name.is_empty() {
                        bail!("name must not be blank");
                    }
                    let user = User {
                        id: Uuid::new_v4(),
                        name: name.to_string(),
                        email: email.trim().to_string(),
                        role,
                        created_at: repository::now_timestamp(),
                    };
                    repository::insert_user(&conn, &user)?;
                    print_json(&user)?;
                }
                UserCommand::List { role } => {
                    print_json(&repository::list_users_by_role(&conn, role)?)?
                }
            }
        }
    }

    Ok(())
}

fn run_remind(
    cmd: RemindCommand,
    db_path: &std::path::Path,
    conn: rusqlite::Connection,
) -> anyhow::Result<()> {
    match cmd {
        RemindCommand::Add {
            patient,
            medicine,
            dosage,
            times,
        } => {
            let new = NewMedication {
                medicine,
                dosage,
                times,
            };
            print_json(&reminders::add_medication(&conn, &patient, &new)?)?;
        }
        RemindCommand::Due { patient } => {
            let now = chrono::Local::now().time();
            print_json(&reminders::check_reminders(&conn, &patient, now)?)?;
        }
        RemindCommand::Stop { medication } => reminders::stop_medication(&conn, &medication)?,
        RemindCommand::Taken { medication } => {
            let med = reminders::mark_taken(&conn, &medication)?;
            println!("Marked {} as taken", med.medicine);
        }
        RemindCommand::Watch { patient, minutes } => {
            drop(conn);
            let handle =
                reminders::start_reminder_watcher(db_path.to_path_buf(), patient, Box::new(StdoutSink));
            match minutes {
                Some(m) => std::thread::sleep(watch_duration(m)),
                None => loop {
                    std::thread::park();
                },
            }
            drop(handle);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_duration_in_minutes() {
        assert_eq!(watch_duration(0), Duration::ZERO);
        assert_eq!(watch_duration(5), Duration::from_secs(300));
    }

    #[test]
    fn watch_duration_saturates() {
        assert_eq!(watch_duration(u64::MAX), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn appointment_book_arguments_parse() {
        let patient = Uuid::new_v4();
        let doctor = Uuid::new_v4();
        let (patient_arg, doctor_arg) = (patient.to_string(), doctor.to_string());
        let cli = Cli::try_parse_from([
            "medilens",
            "appointment",
            "book",
            patient_arg.as_str(),
            "--doctor",
            doctor_arg.as_str(),
            "--department",
            "Neurology",
            "--date",
            "2030-01-15",
            "--time",
            "02:30 PM",
        ])
        .unwrap();

        match cli.command {
            Command::Appointment(AppointmentCommand::Book {
                patient: p,
                doctor: d,
                time,
                ..
            }) => {
                assert_eq!(p, patient);
                assert_eq!(d, doctor);
                assert_eq!(time, "02:30 PM");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
