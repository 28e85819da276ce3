use thiserror::Error;

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GOOGLE_REDIRECT_URI is not a valid URL: {0}")]
    RedirectUri(#[source] url::ParseError),
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to open the quiz history store: {0}")]
    Open(#[source] sqlx::Error),
    #[error("failed to record a quiz attempt: {0}")]
    Record(#[source] sqlx::Error),
    #[error("failed to load quiz history: {0}")]
    Load(#[source] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("there is no active quiz to answer")]
    NoActiveQuiz,
    #[error(transparent)]
    Record(#[from] HistoryError),
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("could not read the client secret file: {0}")]
    ClientSecretRead(#[source] std::io::Error),
    #[error("client secret file is malformed: {0}")]
    ClientSecretFormat(#[source] serde_json::Error),
    #[error("client secret file has neither a `web` nor an `installed` section")]
    ClientSecretMissing,
    #[error("client secret has an invalid authorization URI: {0}")]
    AuthUri(#[source] url::ParseError),
    #[error("login was not started from this chat or has expired")]
    StateMismatch,
    #[error("request to the identity provider failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("identity provider answered {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("roster request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("roster service answered {0}")]
    Status(reqwest::StatusCode),
}

/// Failures a page handler cannot turn into a screen.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Quiz(#[from] QuizError),
}
