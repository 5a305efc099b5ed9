use futures::future::BoxFuture;
use reqwest::Client;
use tracing::debug;

use super::{
    PlaylistSource,
    error::{CatalogError, CatalogResult},
    models::PlaylistPage,
};

/// Fetches playlist pages from the provider's public HTTP API.
#[derive(Clone)]
pub struct HttpPlaylistSource {
    client: Client,
}

impl HttpPlaylistSource {
    /// Build a source backed by a fresh reqwest client.
    pub fn new() -> CatalogResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CatalogError::ClientBuilder { source })?;
        Ok(Self { client })
    }
}

impl PlaylistSource for HttpPlaylistSource {
    fn fetch_page(&self, uri: &str) -> BoxFuture<'static, CatalogResult<PlaylistPage>> {
        let client = self.client.clone();
        let uri = uri.to_string();
        Box::pin(async move {
            debug!(%uri, "fetching playlist page");
            let response =
                client
                    .get(&uri)
                    .send()
                    .await
                    .map_err(|source| CatalogError::RequestSend {
                        uri: uri.clone(),
                        source,
                    })?;

            let status = response.status();
            if !status.is_success() {
                return Err(CatalogError::RequestStatus { uri, status });
            }

            let body = response
                .bytes()
                .await
                .map_err(|source| CatalogError::RequestSend {
                    uri: uri.clone(),
                    source,
                })?;

            serde_json::from_slice::<PlaylistPage>(&body)
                .map_err(|source| CatalogError::DecodeResponse { uri, source })
        })
    }
}
