//! SR Form - IT service-request intake form engine
//!
//! # Module layout
//!
//! ```text
//! sr-form/src/
//! ├── validation.rs  # field rules, required-field list
//! ├── progress.rs    # completion percentage
//! ├── draft/         # draft store, redb backend, debounced autosave
//! ├── mapping.rs     # request type → category, payload building
//! ├── service.rs     # ticket service seam
//! ├── controller.rs  # submission state machine
//! ├── config.rs      # environment + reference data
//! ├── clock.rs       # injectable time source
//! └── utils/         # logging
//! ```

pub mod clock;
pub mod config;
pub mod controller;
pub mod draft;
pub mod mapping;
pub mod progress;
pub mod service;
pub mod utils;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AttachmentPolicy, ConfigError, FormConfig};
pub use controller::{
    Confirm, ConfirmationAbort, FormContext, FormController, FormView, Notification,
    SubmissionPhase, SubmitOutcome,
};
pub use draft::{Draft, DraftStore, MemoryDraftBackend, RedbDraftBackend};
pub use mapping::{CategoryMapping, build_payload};
pub use progress::progress;
pub use service::{GENERIC_FAILURE_MESSAGE, SubmissionError, TicketService};
pub use validation::{Field, FieldErrors, required_fields, validate};

pub use utils::logger::init_logger_with_file;
