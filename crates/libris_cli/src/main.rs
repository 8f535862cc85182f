//! Operator CLI.
//!
//! # Responsibility
//! - Verify `libris_core` linkage without starting the HTTP server.
//! - Bootstrap a database and its first staff account.

use clap::{Parser, Subcommand};
use libris_core::auth::{Pbkdf2Hasher, DEFAULT_ROUNDS};
use libris_core::db::migrations::current_user_version;
use libris_core::model::staff::NewStaff;
use libris_core::repo::borrowing_repo::SqliteBorrowingRepository;
use libris_core::repo::report_repo::SqliteReportRepository;
use libris_core::repo::staff_repo::SqliteStaffRepository;
use libris_core::service::{ReportService, StaffService};
use libris_core::open_db;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "libris", about = "Libris library service tooling", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print core health and version
    Ping,
    /// Create or upgrade a database file
    Migrate {
        #[arg(long)]
        db: PathBuf,
    },
    /// Create a staff account with a login
    CreateStaff {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        name: String,
        #[arg(long)]
        login_id: String,
        #[arg(long)]
        password: String,
        /// PBKDF2 iteration count
        #[arg(long, default_value_t = DEFAULT_ROUNDS)]
        rounds: u32,
    },
    /// Print dashboard counters as JSON
    Stats {
        #[arg(long)]
        db: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Ping => {
            println!("libris_core ping={}", libris_core::ping());
            println!("libris_core version={}", libris_core::core_version());
        }
        Commands::Migrate { db } => {
            let conn = open_db(&db)?;
            println!(
                "database {} at schema version {}",
                db.display(),
                current_user_version(&conn)?
            );
        }
        Commands::CreateStaff {
            db,
            name,
            login_id,
            password,
            rounds,
        } => {
            let conn = open_db(&db)?;
            let hasher = Pbkdf2Hasher::new(rounds)?;
            let service = StaffService::new(SqliteStaffRepository::try_new(&conn)?, &hasher);
            let staff = service.create_staff_account(&NewStaff {
                name,
                login_id,
                password,
            })?;
            println!("created staff_id={} login_id={}", staff.staff_id, staff.login_id);
        }
        Commands::Stats { db } => {
            let conn = open_db(&db)?;
            let service = ReportService::new(
                SqliteReportRepository::try_new(&conn)?,
                SqliteBorrowingRepository::try_new(&conn)?,
            );
            let stats = service.compute_stats(chrono::Local::now().date_naive())?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}
