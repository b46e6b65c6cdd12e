mod errors;
mod state;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Response, StatusCode};

use crate::api::{ErrorBody, PALETTES_ROUTE};
use crate::model::Palette;

pub use errors::ClientError;
pub use state::ClientState;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Data-access layer for the palette API.
///
/// Holds the last fetched collection as an immutable [`ClientState`]
/// snapshot. Every mutation is followed by a full refresh, so indices
/// always come from the server; do not keep an index across a mutation.
#[derive(Debug, Clone)]
pub struct PaletteClient {
    http: reqwest::Client,
    endpoint: String,
    state: Arc<ClientState>,
}

impl PaletteClient {
    /// Create a client for the server at `base_url` (e.g.
    /// `http://127.0.0.1:3001`). Requests fail after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            endpoint: format!("{}{PALETTES_ROUTE}", base_url.trim_end_matches('/')),
            state: Arc::default(),
        })
    }

    /// Current snapshot.
    pub fn state(&self) -> Arc<ClientState> {
        Arc::clone(&self.state)
    }

    /// Re-fetch the collection.
    ///
    /// Failures are recorded in the returned state rather than returned as
    /// errors; the previous palettes are kept and flagged stale.
    pub async fn refresh(&mut self) -> Arc<ClientState> {
        self.state = Arc::new(self.state.loading());
        let next = match self.fetch().await {
            Ok(palettes) => ClientState::loaded(palettes),
            Err(err) => {
                log::warn!("refresh from {} failed: {err}", self.endpoint);
                self.state.failed(err.to_string())
            },
        };
        self.state = Arc::new(next);
        self.state()
    }

    /// Validate and append `palette`, then refresh.
    pub async fn add(&mut self, palette: Palette) -> Result<Palette, ClientError> {
        let palette = Palette::new(&palette.name, &palette.colors)?;
        let result = self.post(&palette).await;
        self.refresh().await;
        result.map(|()| palette)
    }

    /// Remove the palette at `index`, then refresh.
    pub async fn delete_at(&mut self, index: i64) -> Result<(), ClientError> {
        let result = self.delete(index).await;
        self.refresh().await;
        result
    }

    /// Pretty JSON document of the local collection. Makes no request.
    pub fn export(&self) -> Result<String, ClientError> {
        Ok(serde_json::to_string_pretty(self.state.palettes())?)
    }

    /// Write [`export`](Self::export) to `path`.
    pub fn export_to(&self, path: &Path) -> Result<(), ClientError> {
        std::fs::write(path, self.export()?)?;
        Ok(())
    }

    /// Replace the server collection with the palettes in `document`, then
    /// refresh. Invalid documents fail before any request is sent.
    pub async fn import(&mut self, document: &str) -> Result<(), ClientError> {
        let palettes = parse_import(document)?;
        let result = self.put(&palettes).await;
        self.refresh().await;
        result
    }

    /// Read an import document from `path` and [`import`](Self::import) it.
    pub async fn import_from(&mut self, path: &Path) -> Result<(), ClientError> {
        let document = std::fs::read_to_string(path)?;
        self.import(&document).await
    }

    async fn fetch(&self) -> Result<Vec<Palette>, ClientError> {
        let response = self.http.get(&self.endpoint).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn post(&self, palette: &Palette) -> Result<(), ClientError> {
        let response = self.http.post(&self.endpoint).json(palette).send().await?;
        check(response).await.map(drop)
    }

    async fn put(&self, palettes: &[Palette]) -> Result<(), ClientError> {
        let response = self.http.put(&self.endpoint).json(palettes).send().await?;
        check(response).await.map(drop)
    }

    async fn delete(&self, index: i64) -> Result<(), ClientError> {
        let url = format!("{}/{index}", self.endpoint);
        let response = self.http.delete(url).send().await?;
        match check(response).await {
            Err(ClientError::Api { status, .. }) if status == StatusCode::BAD_REQUEST => {
                Err(ClientError::IndexOutOfRange(index))
            },
            other => other.map(drop),
        }
    }
}

/// Parse an import document into palettes.
pub fn parse_import(document: &str) -> Result<Vec<Palette>, ClientError> {
    let value: serde_json::Value = serde_json::from_str(document)
        .map_err(|e| ClientError::InvalidImportFormat(e.to_string()))?;
    if !value.is_array() {
        return Err(ClientError::InvalidImportFormat(
            "top-level value is not an array".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|e| ClientError::InvalidImportFormat(e.to_string()))
}

/// Turn a non-2xx response into [`ClientError::Api`].
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };
    Err(ClientError::Api { status, message })
}
