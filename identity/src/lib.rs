//! Student identity for the voting portal.
//!
//! - [`IdentityService`]: the face registration/matching capability, supplied
//!   by a managed recognition service in production.
//! - [`FaceRegistration`] and [`FaceVerifier`]: camera-driven flows around
//!   that service, gated on a passed liveness session.
//! - [`SessionManager`]: the signed-in voter, created at login and destroyed
//!   at logout, passed explicitly to whatever needs it.

pub mod error;
pub mod registration;
pub mod service;
pub mod session;
pub mod verification;

pub use error::IdentityError;
pub use registration::{FaceRegistration, RegistrationStatus};
pub use service::{FaceMatch, FaceReference, IdentityService};
pub use session::{Role, SessionContext, SessionManager};
pub use verification::FaceVerifier;
