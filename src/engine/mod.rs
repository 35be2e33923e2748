mod core;
mod dispatcher;
mod messages;
mod state;
mod worker;

pub use core::{TrainerEngine, TriggerError};
pub use dispatcher::{DetectionDispatcher, DetectionResult, build_request, normalize_response};
pub use messages::{DetectionKind, JobRequest, JobResult};
pub use state::{Notice, NoticeLevel};
