use async_trait::async_trait;
use bytes::Bytes;
use readshim_core::{Error, ForeignId, Result, Upstream};
use reqwest::StatusCode;
use tracing::{trace, warn};
use url::Url;

/// An [`Upstream`] that fetches resources from an HTTP backend serving
/// `/work/{id}`, `/book/{id}` and `/author/{id}`.
///
/// The client is injected so that timeouts and connection pooling are
/// configured once by the caller.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpUpstream {
    pub fn new(client: reqwest::Client, mut base_url: Url) -> Self {
        // Joining relative paths keeps the base path only with a trailing slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn fetch(&self, kind: &str, id: ForeignId) -> Result<Bytes> {
        let url = self
            .base_url
            .join(&format!("{kind}/{id}"))
            .map_err(|e| Error::Internal(format!("building upstream url: {e}")))?;
        trace!(url = %url, "fetching from upstream");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("{kind}:{id}")));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(kind, id = %id, status = status.as_u16(), "upstream request failed");
            return Err(Error::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        response.bytes().await.map_err(map_reqwest_error)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> Error {
    let status = if err.is_timeout() {
        StatusCode::GATEWAY_TIMEOUT
    } else {
        StatusCode::BAD_GATEWAY
    };
    Error::Upstream {
        status: status.as_u16(),
        message: err.to_string(),
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn book(&self, id: ForeignId) -> Result<Bytes> {
        self.fetch("book", id).await
    }

    async fn work(&self, id: ForeignId) -> Result<Bytes> {
        self.fetch("work", id).await
    }

    async fn author(&self, id: ForeignId) -> Result<Bytes> {
        self.fetch("author", id).await
    }
}
