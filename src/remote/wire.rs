//! JSON shapes exchanged with the remote file service and their conversion
//! into domain values.
//!
//! Every reply carries `success`; a `false` reply is turned into
//! `ServiceError::Rejected` with the server's message, or into
//! `ServiceError::SessionExpired` when the message says no session is active.

use serde::{Deserialize, Serialize};

use crate::entry::{DirectoryEntry, Listing, SearchOutcome, SearchResultEntry, Suggestion};
use crate::error::ServiceError;
use crate::explorer::path::RemotePath;

/// Prefix the service uses when the session behind the cookie is gone.
const NO_SESSION_PREFIX: &str = "No hay conexión";

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConnectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavigateRequest<'a> {
    pub path: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestionRequest<'a> {
    pub query: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    pub max_results: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadRequest<'a> {
    pub archivo: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct StatusReply {
    #[serde(default)]
    pub conectado: bool,
    #[serde(default)]
    pub directorio_actual: Option<String>,
}

impl StatusReply {
    pub fn into_session(self) -> Option<RemotePath> {
        if self.conectado {
            Some(RemotePath::from(self.directorio_actual.unwrap_or_default()))
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConnectReply {
    pub success: bool,
    #[serde(default)]
    pub directorio_actual: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ConnectReply {
    pub fn into_result(self) -> Result<RemotePath, ServiceError> {
        check(self.success, self.error)?;
        Ok(RemotePath::from(self.directorio_actual.unwrap_or_default()))
    }
}

#[derive(Debug, Deserialize)]
pub struct AckReply {
    pub success: bool,
    #[serde(default)]
    pub directorio_actual: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl AckReply {
    pub fn into_result(self) -> Result<Option<RemotePath>, ServiceError> {
        check(self.success, self.error)?;
        Ok(self.directorio_actual.map(RemotePath::from))
    }
}

#[derive(Debug, Deserialize)]
pub struct WireItem {
    pub nombre: String,
    pub es_directorio: bool,
    #[serde(default)]
    pub tamano: Option<u64>,
    #[serde(default)]
    pub fecha_modificacion: String,
}

impl From<WireItem> for DirectoryEntry {
    fn from(item: WireItem) -> Self {
        DirectoryEntry {
            name: item.nombre,
            is_directory: item.es_directorio,
            size_bytes: if item.es_directorio {
                None
            } else {
                Some(item.tamano.unwrap_or(0))
            },
            modified_at: item.fecha_modificacion,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListReply {
    pub success: bool,
    #[serde(default)]
    pub directorio_actual: Option<String>,
    #[serde(default)]
    pub items: Vec<WireItem>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ListReply {
    pub fn into_result(self) -> Result<Listing, ServiceError> {
        check(self.success, self.error)?;
        Ok(Listing {
            path: RemotePath::from(self.directorio_actual.unwrap_or_default()),
            entries: self.items.into_iter().map(DirectoryEntry::from).collect(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct WireSuggestion {
    pub nombre: String,
    pub es_directorio: bool,
    pub ruta: String,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionReply {
    pub success: bool,
    #[serde(default)]
    pub sugerencias: Vec<WireSuggestion>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SuggestionReply {
    pub fn into_result(self) -> Result<Vec<Suggestion>, ServiceError> {
        check(self.success, self.error)?;
        Ok(self
            .sugerencias
            .into_iter()
            .map(|s| Suggestion {
                name: s.nombre,
                is_directory: s.es_directorio,
                full_path: RemotePath::from(s.ruta),
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
pub struct WireSearchItem {
    pub nombre: String,
    pub ruta: String,
    pub es_directorio: bool,
    #[serde(default)]
    pub tamano: Option<u64>,
    #[serde(default)]
    pub fecha_modificacion: String,
}

impl From<WireSearchItem> for SearchResultEntry {
    fn from(item: WireSearchItem) -> Self {
        let full_path = RemotePath::from(item.ruta);
        let entry = WireItem {
            nombre: item.nombre,
            es_directorio: item.es_directorio,
            tamano: item.tamano,
            fecha_modificacion: item.fecha_modificacion,
        };
        SearchResultEntry {
            entry: entry.into(),
            full_path,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchReply {
    pub success: bool,
    #[serde(default)]
    pub resultados: Vec<WireSearchItem>,
    #[serde(default)]
    pub timeout: bool,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub carpetas_visitadas: u32,
    #[serde(default)]
    pub error: Option<String>,
}

impl SearchReply {
    pub fn into_result(self) -> Result<SearchOutcome, ServiceError> {
        check(self.success, self.error)?;
        let results: Vec<SearchResultEntry> =
            self.resultados.into_iter().map(Into::into).collect();
        let total = self.total.unwrap_or(results.len() as u32);
        Ok(SearchOutcome {
            results,
            timed_out: self.timeout,
            folders_visited: self.carpetas_visitadas,
            total,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct DownloadReply {
    pub success: bool,
    #[serde(default)]
    pub archivo: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl DownloadReply {
    pub fn into_result(self) -> Result<String, ServiceError> {
        check(self.success, self.error)?;
        self.archivo
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ServiceError::Decode("falta el campo 'archivo'".to_string()))
    }
}

fn check(success: bool, error: Option<String>) -> Result<(), ServiceError> {
    if success {
        return Ok(());
    }
    let message = error.unwrap_or_else(|| "error desconocido del servidor".to_string());
    if message.starts_with(NO_SESSION_PREFIX) {
        Err(ServiceError::SessionExpired(message))
    } else {
        Err(ServiceError::Rejected(message))
    }
}
