//! Type definitions for the API client
//!
//! This module contains the main data structures used for requests, responses
//! and session state.

pub mod request;
pub mod response;
pub mod session;

pub use request::{DirectItem, FollowListKind, Recipients, RequestBody, SignedRequest, ThreadTarget};
pub use response::{ApiErrorPayload, ResponseEnvelope};
pub use session::{Session, SessionState};
