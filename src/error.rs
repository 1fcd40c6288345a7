use thiserror::Error;

/// Failure reported by the remote service seam.
///
/// Transport failures and `success: false` replies are kept apart here so the
/// transport can be logged accurately; the orchestrators fold both into their
/// own error types and only the message survives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    SessionExpired(String),

    #[error("respuesta inválida del servidor: {0}")]
    Decode(String),
}

impl ServiceError {
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ServiceError::Decode(e.to_string())
        } else if e.status() == Some(reqwest::StatusCode::UNAUTHORIZED) {
            ServiceError::SessionExpired(e.to_string())
        } else {
            ServiceError::Transport(e.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("ya hay un intento de conexión en curso")]
    AlreadyPending,

    #[error("ya existe una sesión activa")]
    AlreadyConnected,

    #[error("{0}")]
    Remote(String),
}

impl From<ServiceError> for ConnectError {
    fn from(e: ServiceError) -> Self {
        ConnectError::Remote(e.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DisconnectError(pub String);

impl From<ServiceError> for DisconnectError {
    fn from(e: ServiceError) -> Self {
        DisconnectError(e.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("la sesión remota expiró: {0}")]
    SessionExpired(String),

    #[error("{0}")]
    Remote(String),
}

impl From<ServiceError> for NavigationError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::SessionExpired(msg) => NavigationError::SessionExpired(msg),
            other => NavigationError::Remote(other.message()),
        }
    }
}

/// Suggestions are best-effort; this error is logged and never shown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SuggestionError(pub String);

impl From<ServiceError> for SuggestionError {
    fn from(e: ServiceError) -> Self {
        SuggestionError(e.message())
    }
}

/// Reasons a search was refused or failed. Cancellation is not one of them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("La búsqueda debe tener al menos {min} caracteres")]
    TooShort { min: usize },

    #[error("Ya hay una búsqueda en progreso")]
    AlreadyRunning,

    #[error("no hay conexión activa")]
    NotConnected,

    #[error("la sesión remota expiró: {0}")]
    SessionExpired(String),

    #[error("{0}")]
    Remote(String),
}

impl From<ServiceError> for SearchError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::SessionExpired(msg) => SearchError::SessionExpired(msg),
            other => SearchError::Remote(other.message()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    #[error("{0}")]
    Remote(String),

    #[error("no se pudo guardar el archivo: {0}")]
    Io(String),
}

impl From<ServiceError> for DownloadError {
    fn from(e: ServiceError) -> Self {
        DownloadError::Remote(e.message())
    }
}

impl From<std::io::Error> for DownloadError {
    fn from(e: std::io::Error) -> Self {
        DownloadError::Io(e.to_string())
    }
}
