use thiserror::Error;

/// Errors produced while building, solving or replaying a colony.
#[derive(Debug, Error)]
pub enum LemInError {
    #[error("room {0} already exists")]
    DuplicateRoom(String),

    #[error("room {0} cannot be linked to itself")]
    SelfLoop(String),

    #[error("room {0} is not defined")]
    UnknownRoom(String),

    #[error("duplicate link {0}-{1}")]
    DuplicateTunnel(String, String),

    #[error("no path found from {start} to {end}")]
    NoPathFound { start: String, end: String },

    #[error("more than {0} routes between start and end")]
    RouteLimitExceeded(usize),

    #[error("more than {0} ants in the colony")]
    AntLimitExceeded(usize),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("no data in colony file")]
    EmptyInput,

    #[error("invalid number of ants: {0}")]
    InvalidAntCount(String),

    #[error("invalid room: {0}")]
    InvalidRoom(String),

    #[error("invalid link: {0}")]
    InvalidTunnel(String),

    #[error("wrong format on line {line_number}: {line}")]
    UnrecognizedLine { line_number: usize, line: String },

    #[error("start room not defined")]
    MissingStart,

    #[error("end room not defined")]
    MissingEnd,

    #[error("input file must have a .txt extension: {0}")]
    InvalidExtension(String),

    #[error("simulation has not started, call `start` first")]
    SimulationNotStarted,

    #[error("simulation is finished, call `start` to replay it")]
    SimulationFinished,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type LemInResult<T> = Result<T, LemInError>;
