// Domain-level errors for roster, adjudication and reset workflows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("invalid player: {0}")]
    InvalidPlayer(&'static str),
    #[error("player {0} already exists")]
    DuplicateId(String),
    #[error("User with user_id:{0} not found")]
    NotFound(String),
    #[error("shooter {0} not found")]
    ShooterNotFound(String),
    #[error("target {0} not found")]
    TargetNotFound(String),
    #[error("player {0} cannot hit themselves")]
    SelfHit(String),
    #[error("shooter {0} is eliminated")]
    ShooterEliminated(String),
    #[error("target {0} is already eliminated")]
    TargetEliminated(String),
    #[error("{0} player(s) still registered")]
    PlayersRemaining(usize),
    #[error("invalid submission: {0}")]
    InvalidSubmission(&'static str),
}
