use std::fmt;

/// Errors raised while building the routing table.
///
/// Routing errors are synchronous and fail-fast: a misconfigured route is a
/// programming error, so construction either succeeds completely or nothing
/// is registered or cached.
#[derive(Debug)]
pub enum RouterError {
    /// The namespace prefix is not a plain `/`-leading path string.
    InvalidPrefix(String),
    /// The namespace prefix is a regex pattern.
    RegexPrefix(String),
    /// The namespace prefix is the bare root `/`.
    ReservedPrefix,
    /// A route path is a regex pattern.
    RegexPath(String),
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::InvalidPrefix(got) => {
                write!(f, "only support prefix with string, but got {}", got)
            }
            RouterError::RegexPrefix(got) => {
                write!(f, "got {}, but don't support regex path yet", got)
            }
            RouterError::ReservedPrefix => write!(f, "namespace / is not supported"),
            RouterError::RegexPath(got) => {
                write!(f, "only support path with string, but got {}", got)
            }
        }
    }
}

impl std::error::Error for RouterError {}

pub type RouterResult<T> = Result<T, RouterError>;

/// Errors produced by request handlers.
#[derive(Debug)]
pub enum ServerError {
    ParseError(String),
    NotFound,
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    InternalError(String),
    Conflict(String),
    PanicError(String),
}

impl ServerError {
    pub fn status_code(&self) -> u16 {
        match self {
            ServerError::BadRequest(_) => 400,
            ServerError::Unauthorized(_) => 401,
            ServerError::Forbidden(_) => 403,
            ServerError::NotFound => 404,
            ServerError::Conflict(_) => 409,
            ServerError::ParseError(_) => 422,
            ServerError::InternalError(_) | ServerError::PanicError(_) => 500,
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ServerError::NotFound => write!(f, "Not found"),
            ServerError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ServerError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ServerError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ServerError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ServerError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ServerError::PanicError(msg) => write!(f, "Panic: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {}

pub type ServerResult<T> = Result<T, ServerError>;
