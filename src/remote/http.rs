use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::wire::{
    AckReply, ConnectReply, ConnectRequest, DownloadReply, DownloadRequest, ListReply,
    NavigateRequest, SearchReply, SearchRequest, StatusReply, SuggestionReply, SuggestionRequest,
};
use super::{Credentials, RemoteService};
use crate::config::ExplorerConfig;
use crate::entry::{Listing, SearchOutcome, Suggestion};
use crate::error::ServiceError;
use crate::explorer::path::RemotePath;

/// JSON-over-HTTP client for the remote file service.
///
/// The session lives in a cookie, so one `HttpService` is one remote session.
/// No request timeout is set on the client: the service bounds its own
/// search and the user cancels anything longer.
pub struct HttpService {
    client: Client,
    base: Url,
}

impl HttpService {
    pub fn new(config: &ExplorerConfig) -> Result<Self, ServiceError> {
        let mut raw = config.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base = Url::parse(&raw)
            .map_err(|e| ServiceError::Transport(format!("URL inválida {raw}: {e}")))?;

        let client = Client::builder()
            .cookie_store(true)
            .connect_timeout(config.connect_timeout)
            .build()?;

        info!("remote service at {}", base);
        Ok(Self { client, base })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base
            .join(path)
            .map_err(|e| ServiceError::Transport(format!("endpoint {path}: {e}")))
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ServiceError> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        decode(response).await
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ServiceError> {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);
        let response = self.client.post(url).json(body).send().await?;
        decode(response).await
    }
}

/// Rejections come back as JSON with a 4xx/5xx status, so the body is
/// decoded before the status is looked at.
async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, ServiceError> {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ServiceError::SessionExpired(format!("HTTP {status}")));
    }
    match response.json::<R>().await {
        Ok(reply) => Ok(reply),
        Err(_) if !status.is_success() => Err(ServiceError::Transport(format!("HTTP {status}"))),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl RemoteService for HttpService {
    async fn status(&self) -> Result<Option<RemotePath>, ServiceError> {
        let reply: StatusReply = self.get("estado").await?;
        Ok(reply.into_session())
    }

    async fn connect(&self, credentials: &Credentials) -> Result<RemotePath, ServiceError> {
        let body = ConnectRequest {
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        };
        let reply: ConnectReply = self.post("conectar", &body).await?;
        reply.into_result()
    }

    async fn disconnect(&self) -> Result<(), ServiceError> {
        let reply: AckReply = self.post("desconectar", &serde_json::json!({})).await?;
        reply.into_result().map(|_| ())
    }

    async fn list(&self) -> Result<Listing, ServiceError> {
        let reply: ListReply = self.get("listar").await?;
        reply.into_result()
    }

    async fn navigate(&self, target: &str) -> Result<Option<RemotePath>, ServiceError> {
        let reply: AckReply = self.post("navegar", &NavigateRequest { path: target }).await?;
        reply.into_result()
    }

    async fn suggestions(&self, query: &str) -> Result<Vec<Suggestion>, ServiceError> {
        let reply: SuggestionReply = self
            .post("sugerencias", &SuggestionRequest { query })
            .await?;
        reply.into_result()
    }

    async fn search(&self, query: &str, max_results: u32) -> Result<SearchOutcome, ServiceError> {
        let reply: SearchReply = self
            .post("buscar", &SearchRequest { query, max_results })
            .await?;
        reply.into_result()
    }

    async fn prepare_download(&self, archivo: &str) -> Result<String, ServiceError> {
        let reply: DownloadReply = self
            .post("descargar", &DownloadRequest { archivo })
            .await?;
        reply.into_result()
    }

    async fn fetch_download(&self, prepared: &str) -> Result<Vec<u8>, ServiceError> {
        let mut url = self.endpoint("download/")?;
        url.path_segments_mut()
            .map_err(|_| ServiceError::Transport("URL base sin ruta".to_string()))?
            .pop_if_empty()
            .push(prepared);
        debug!("GET {}", url);
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Answers one request with `status` and a fixed body, then closes.
    async fn reply_once(status: &'static str, body: &'static str) -> HttpService {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        let config = ExplorerConfig {
            base_url: format!("http://{addr}/"),
            ..ExplorerConfig::default()
        };
        HttpService::new(&config).unwrap()
    }

    #[tokio::test]
    async fn listing_error_status_keeps_session_message() {
        let service = reply_once(
            "500 Internal Server Error",
            r#"{"success": false, "error": "No hay conexión SFTP activa"}"#,
        )
        .await;
        assert_eq!(
            service.list().await.unwrap_err(),
            ServiceError::SessionExpired("No hay conexión SFTP activa".into())
        );
    }

    #[tokio::test]
    async fn listing_error_status_keeps_server_message() {
        let service = reply_once(
            "400 Bad Request",
            r#"{"success": false, "error": "Error al listar directorio: permiso denegado"}"#,
        )
        .await;
        assert_eq!(
            service.list().await.unwrap_err(),
            ServiceError::Rejected("Error al listar directorio: permiso denegado".into())
        );
    }

    #[tokio::test]
    async fn error_status_without_json_is_a_transport_failure() {
        let service = reply_once("502 Bad Gateway", "<html>bad gateway</html>").await;
        assert_eq!(
            service.status().await.unwrap_err(),
            ServiceError::Transport("HTTP 502 Bad Gateway".into())
        );
    }

    #[test]
    fn endpoints_are_relative_to_base() {
        let config = ExplorerConfig {
            base_url: "http://localhost:5000/modulos/consolidador-t25".to_string(),
            ..ExplorerConfig::default()
        };
        let service = HttpService::new(&config).unwrap();
        assert_eq!(
            service.endpoint("listar").unwrap().as_str(),
            "http://localhost:5000/modulos/consolidador-t25/listar"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let config = ExplorerConfig {
            base_url: "not a url".to_string(),
            ..ExplorerConfig::default()
        };
        assert!(HttpService::new(&config).is_err());
    }
}
