//! Use-case service layer.
//!
//! # Responsibility
//! - Expose one entry point per library workflow over repository traits.
//! - Convert repository failures into the `LibraryError` taxonomy.
//! - Emit one metadata-only log event per mutating workflow.
//!
//! # Invariants
//! - Services never issue SQL directly.
//! - The current date is always supplied by the caller, never read here.

pub mod catalog_service;
pub mod circulation_service;
pub mod error;
pub mod reader_service;
pub mod report_service;
pub mod staff_service;

pub use catalog_service::{BookService, PublisherService};
pub use circulation_service::CirculationService;
pub use error::{ErrorKind, LibraryError};
pub use reader_service::ReaderService;
pub use report_service::ReportService;
pub use staff_service::StaffService;

pub type LibraryResult<T> = Result<T, LibraryError>;

/// Logs a failed workflow. Domain rejections are warnings; anything
/// unexpected is an error.
pub(crate) fn log_failure(event: &str, module: &str, err: &LibraryError) {
    match err.kind() {
        ErrorKind::Unexpected => log::error!(
            "event={event} module={module} status=error error_code={} detail={err}",
            err.code()
        ),
        _ => log::warn!(
            "event={event} module={module} status=error error_code={}",
            err.code()
        ),
    }
}
