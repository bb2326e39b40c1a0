use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CliError - every failure the command line client reports
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug)]
pub enum CliError {
    // Input errors
    InvalidInput(String),

    // Auth errors
    LoginRequired { feature: String },
    TokenExpired,
    AuthFailed(String),
    /// The server rejected the session (401)
    AuthRequired,

    // Server errors
    Api { status: u16, message: String },
    NotFound(String),
    Network(String),
    InvalidResponse(String),

    // Local state
    /// The draft stays on disk
    SaveFailed(String),
    Storage(String),
    Prompt(String),
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Self::LoginRequired { feature } => {
                write!(f, "Login required for {feature}. Run: mietrecht-cli login")
            }
            Self::TokenExpired => {
                write!(f, "Authentication token expired. Run: mietrecht-cli login")
            }
            Self::AuthFailed(msg) => write!(f, "Authentication failed: {msg}"),
            Self::AuthRequired => write!(
                f,
                "The server requires a login. Run: mietrecht-cli login, then mietrecht-cli resume"
            ),
            Self::Api { status, message } => write!(f, "Server error ({status}): {message}"),
            Self::NotFound(what) => write!(f, "Not found: {what}"),
            Self::Network(msg) => write!(f, "Server unreachable: {msg}"),
            Self::InvalidResponse(msg) => write!(f, "Invalid response from server: {msg}"),
            Self::SaveFailed(msg) => {
                write!(f, "Saving failed, the draft is kept locally: {msg}")
            }
            Self::Storage(msg) => write!(f, "Local storage error: {msg}"),
            Self::Prompt(msg) => write!(f, "Prompt failed: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<reqwest::Error> for CliError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(err: dialoguer::Error) -> Self {
        Self::Prompt(err.to_string())
    }
}

impl CliError {
    /// Whether the caller should log in and retry.
    pub fn needs_login(&self) -> bool {
        matches!(
            self,
            Self::AuthRequired | Self::TokenExpired | Self::LoginRequired { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_hints_name_the_command() {
        let err = CliError::LoginRequired {
            feature: "documents".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("documents"), "Expected feature name in: {msg}");
        assert!(msg.contains("mietrecht-cli login"), "Expected command hint in: {msg}");
        assert!(CliError::AuthRequired.to_string().contains("resume"));
    }

    #[test]
    fn io_errors_convert() {
        let err: CliError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, CliError::Io(_)));
        assert!(!err.needs_login());
        assert!(CliError::TokenExpired.needs_login());
    }

    #[test]
    fn api_errors_show_status() {
        let err = CliError::Api {
            status: 502,
            message: "Kartendienst nicht erreichbar".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Server error (502): Kartendienst nicht erreichbar"
        );
    }
}
