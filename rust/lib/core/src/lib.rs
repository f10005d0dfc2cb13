//! Shared building blocks for the e-commerce backend: the HTTP error
//! envelope, per-request context, failure reporting and configuration.

pub mod config;
pub mod context;
pub mod error;
pub mod module;
pub mod observe;
pub mod request_id;
pub mod types;

pub use config::ServiceConfig;
pub use context::{Interruption, RequestContext};
pub use error::{Envelope, ErrorMessage, ResponseMessage, ServiceError};
pub use module::Module;
pub use observe::{ErrorReporter, RecordingReporter, TracingReporter};
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
pub use types::{new_id, now_millis};
