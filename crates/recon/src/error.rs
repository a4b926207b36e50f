use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty rule, conflicting header, etc.).
    ConfigValidation(String),
    /// The submission log could not be read as CSV.
    Csv { line: Option<u64>, message: String },
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Csv { line: Some(line), message } => {
                write!(f, "CSV error at line {line}: {message}")
            }
            Self::Csv { line: None, message } => write!(f, "CSV error: {message}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

impl From<csv::Error> for ReconError {
    fn from(e: csv::Error) -> Self {
        if let csv::ErrorKind::Io(io) = e.kind() {
            return Self::Io(io.to_string());
        }
        Self::Csv {
            line: e.position().map(|p| p.line()),
            message: e.to_string(),
        }
    }
}
