mod progress;
mod recorder;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::{PersistError, SessionError};
pub use progress::SessionProgress;
pub use recorder::ResultRecorder;
pub use service::{Advance, TestSession};
pub use workflow::{AdvanceOutcome, CompletionReport, TestSessionService};
