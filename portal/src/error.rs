use campus_ballot::BallotError;
use campus_identity::IdentityError;
use campus_liveness::LivenessError;
use campus_types::ParamsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid parameters: {0}")]
    Params(#[from] ParamsError),

    #[error("ballot error: {0}")]
    Ballot(#[from] BallotError),

    #[error("liveness error: {0}")]
    Liveness(#[from] LivenessError),

    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("no voter is signed in")]
    NoSession,

    #[error("voter {0} has not completed face verification")]
    FaceNotVerified(String),

    #[error("only students may vote")]
    NotStudent,
}
