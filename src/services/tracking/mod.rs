//! SCORM 1.2 run-time tracking: the data-model schema, the session state
//! machine and its change notifications.

pub mod defaults;
pub mod error_code;
pub mod events;
pub mod schema;
pub mod session;

pub use error_code::ErrorCode;
pub use events::{ChangeEvent, ChangeKind, ChangeObserver, ChannelObserver, ObserverId};
pub use session::{SessionState, TrackingSession};
