//! Command normalization and dispatch for the canvas assistant
//!
//! A local language model is asked to turn requests like "create a red circle
//! in the center" into JSON. That output is untrusted: it may be malformed, use
//! alternate field names, carry numbers as strings or place shapes off the
//! canvas. This crate turns it into validated shape operations:
//!
//! - **Parser**: raw model text into one action or a best-effort batch
//! - **Validator**: coerces and checks the fields of a shape creation request
//! - **Geometry**: keeps every placed shape inside the 100×100 canvas
//! - **Dispatcher**: runs actions and produces typed result payloads
//!
//! Nothing here panics or returns an uncontrolled error for bad model output;
//! every failure becomes data the caller can show to the user.
//!
//! # Example
//!
//! ```rust
//! use canvas_commands::{CommandProcessor, CommandResponse};
//!
//! let processor = CommandProcessor::new();
//! let response = processor
//!     .process(r#"{"action":"create_shape","shape":"circle","x":10,"y":90,"radius":25}"#)
//!     .unwrap();
//!
//! match response {
//!     CommandResponse::Single(result) => assert!(result.is_success()),
//!     CommandResponse::Batch(_) => unreachable!(),
//! }
//! ```

pub mod action;
pub mod constants;
pub mod dispatcher;
pub mod error;
pub mod geometry;
pub mod parser;
pub mod processor;
pub mod recorder;
pub mod result;
pub mod validator;

// Re-exports for convenience
pub use action::{Action, ShapeSpec};
pub use dispatcher::Dispatcher;
pub use error::CommandError;
pub use geometry::adjust;
pub use parser::{parse, parse_value, ParsedCommand};
pub use processor::{CommandProcessor, CommandResponse};
pub use recorder::ActionRecorder;
pub use result::{ActionFailure, ActionOutcome, ActionResult, Dimensions, Position};
pub use validator::validate_shape;
