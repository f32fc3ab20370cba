//! # firstlight-pipeline
//!
//! Pure decision logic: raw alert → [`NormalizedAlert`] → gate verdict.
//! No I/O happens here; the orchestrator wires in storage, dedup, and the
//! registry client around this crate.
//!
//! [`NormalizedAlert`]: firstlight_core::entities::NormalizedAlert

pub mod gates;
pub mod normalize;
pub mod stamp;

pub use gates::{GATES, Verdict, evaluate};
pub use normalize::{NormalizeError, normalize};
pub use stamp::{NullStampAnalyzer, StampAnalyzer, StampError};
