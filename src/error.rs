//! Application error type.
//!
//! Every failure in the pipeline is fatal; the error only needs to carry a
//! message for the user and the process exit code `main` should return.

/// Failure that is not the user's input or the data (e.g. serialization).
pub const EXIT_INTERNAL: u8 = 1;
/// Bad CLI value, unreadable input, missing or non-numeric column.
pub const EXIT_INPUT: u8 = 2;
/// No rows left to estimate on.
pub const EXIT_EMPTY: u8 = 3;
/// Singular design, under-identification, non-finite estimates.
pub const EXIT_NUMERIC: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(EXIT_INPUT, message)
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Self::new(EXIT_EMPTY, message)
    }

    pub fn numeric(message: impl Into<String>) -> Self {
        Self::new(EXIT_NUMERIC, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(EXIT_INTERNAL, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        let line = err
            .position()
            .map(|p| format!(" (line {})", p.line()))
            .unwrap_or_default();
        AppError::input(format!("CSV error{line}: {err}"))
    }
}
