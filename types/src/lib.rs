//! Fundamental types for the campus voting portal.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! identifiers, timestamps, tunable parameters, and parameter validation errors.

pub mod error;
pub mod ids;
pub mod params;
pub mod time;

pub use error::ParamsError;
pub use ids::{CandidateId, ElectionId, SubjectId, VoteId, VoterEmail};
pub use params::PortalParams;
pub use time::Timestamp;
