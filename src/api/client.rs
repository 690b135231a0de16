use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use reqwest::{Client, Method, RequestBuilder, Response};
use thiserror::Error;
use url::Url;

use super::models::{
    AlbumResponseDto, ApiConfig, AssetIdsDto, AssetResponseDto, DownloadInfoDto,
    DownloadResponseDto, ErrorResponseDto,
};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Message supplied by the server in the error body, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Streamed response body plus the advertised content length
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    /// Joins `segments` onto the base URL, percent-encoding each one, and
    /// appends the shared-link key followed by any set `params`.
    fn endpoint(&self, segments: &[&str], params: &[(&str, Option<&str>)]) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", self.config.base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(format!("{} cannot be a base", self.config.base_url)))?
            .pop_if_empty()
            .extend(segments);

        let mut pairs: Vec<(&str, &str)> = Vec::new();
        if let Some(key) = self.config.shared_key.as_deref() {
            pairs.push(("key", key));
        }
        pairs.extend(params.iter().filter_map(|(name, value)| value.map(|v| (*name, v))));

        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match self.config.api_key.as_deref() {
            Some(api_key) => builder.header("x-api-key", api_key),
            None => builder,
        }
    }

    async fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponseDto>(&body)
            .ok()
            .and_then(|dto| dto.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))
    }

    fn into_stream(response: Response) -> (Option<u64>, ByteStream) {
        let total_size = response.content_length();
        let stream = response
            .bytes_stream()
            .map_err(ApiError::RequestError)
            .boxed();
        (total_size, stream)
    }

    /// Ask the server to partition the requested assets into archives
    pub async fn get_download_info(&self, dto: &DownloadInfoDto) -> Result<DownloadResponseDto> {
        let url = self.endpoint(&["download", "info"], &[])?;
        let response = self.request(Method::POST, url).json(dto).send().await?;
        let response = Self::ensure_success(response).await?;
        Self::json(response).await
    }

    /// Stream a zip archive containing `dto.asset_ids`
    pub async fn download_archive(&self, dto: &AssetIdsDto) -> Result<(Option<u64>, ByteStream)> {
        let url = self.endpoint(&["download", "archive"], &[])?;
        let response = self.request(Method::POST, url).json(dto).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(Self::into_stream(response))
    }

    /// Stream the original file of one asset
    pub async fn download_asset(&self, id: &str) -> Result<(Option<u64>, ByteStream)> {
        let url = self.endpoint(&["assets", id, "original"], &[])?;
        let response = self.request(Method::GET, url).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(Self::into_stream(response))
    }

    pub async fn get_asset_info(&self, id: &str) -> Result<AssetResponseDto> {
        let url = self.endpoint(&["assets", id], &[])?;
        let response = self.request(Method::GET, url).send().await?;
        let response = Self::ensure_success(response).await?;
        Self::json(response).await
    }

    pub async fn get_album_info(&self, id: &str, without_assets: bool) -> Result<AlbumResponseDto> {
        let without_assets = without_assets.then_some("true");
        let url = self.endpoint(&["albums", id], &[("withoutAssets", without_assets)])?;
        let response = self.request(Method::GET, url).send().await?;
        let response = Self::ensure_success(response).await?;
        Self::json(response).await
    }

    pub fn asset_original_url(&self, id: &str, checksum: Option<&str>) -> Result<String> {
        self.endpoint(&["assets", id, "original"], &[("c", checksum)])
            .map(String::from)
    }

    /// Public URL of a shared link; falls back to the server origin when no
    /// external domain is configured.
    pub fn shared_link_url(&self, external_domain: &str, key: &str) -> Result<String> {
        let base = if external_domain.is_empty() {
            let server = Url::parse(&self.config.base_url)
                .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
            server.origin().ascii_serialization()
        } else {
            external_domain.to_string()
        };

        Url::parse(&base)
            .and_then(|base| base.join(&format!("share/{}", key)))
            .map(String::from)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::Server, shared_key: Option<&str>) -> ApiClient {
        ApiClient::new(ApiConfig {
            base_url: format!("{}/api", server.url()),
            api_key: Some("secret".to_string()),
            shared_key: shared_key.map(String::from),
        })
    }

    #[tokio::test]
    async fn get_download_info_posts_dto_with_key_and_api_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/download/info")
            .match_query(Matcher::UrlEncoded("key".into(), "shared".into()))
            .match_header("x-api-key", "secret")
            .match_body(Matcher::Json(json!({ "albumId": "album-1", "archiveSize": 1024 })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "archives": [{ "assetIds": ["a", "b"], "size": 300 }],
                    "totalSize": 300
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server, Some("shared"));
        let info = client
            .get_download_info(&DownloadInfoDto {
                album_id: Some("album-1".into()),
                archive_size: Some(1024),
                ..Default::default()
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(info.total_size, 300);
        assert_eq!(info.archives[0].asset_ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn non_success_status_carries_server_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/download/info")
            .with_status(400)
            .with_body(json!({ "message": "Not found or no asset.download access" }).to_string())
            .create_async()
            .await;

        let client = client_for(&server, None);
        let err = client
            .get_download_info(&DownloadInfoDto::default())
            .await
            .unwrap_err();

        match &err {
            ApiError::Status { status, .. } => assert_eq!(*status, 400),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.server_message(), Some("Not found or no asset.download access"));
    }

    #[tokio::test]
    async fn non_json_error_falls_back_to_reason() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/assets/a1")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let err = client_for(&server, None).get_asset_info("a1").await.unwrap_err();
        assert_eq!(err.server_message(), Some("Internal Server Error"));
    }

    #[tokio::test]
    async fn download_archive_streams_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/download/archive")
            .match_body(Matcher::Json(json!({ "assetIds": ["a", "b"] })))
            .with_status(200)
            .with_body(vec![7u8; 64])
            .create_async()
            .await;

        let client = client_for(&server, None);
        let (total, stream) = client
            .download_archive(&AssetIdsDto {
                asset_ids: vec!["a".into(), "b".into()],
            })
            .await
            .unwrap();

        let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();
        let received: usize = chunks.iter().map(|c| c.len()).sum();
        assert_eq!(total, Some(64));
        assert_eq!(received, 64);
    }

    #[tokio::test]
    async fn get_album_info_sends_without_assets_flag() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/albums/album-1")
            .match_query(Matcher::UrlEncoded("withoutAssets".into(), "true".into()))
            .with_status(200)
            .with_body(json!({ "id": "album-1", "albumName": "Summer", "assetCount": 3 }).to_string())
            .create_async()
            .await;

        let album = client_for(&server, None)
            .get_album_info("album-1", true)
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(album.album_name, "Summer");
    }

    #[test]
    fn asset_urls_encode_ids_and_append_params() {
        let client = ApiClient::new(ApiConfig {
            base_url: "https://photos.example.com/api/".into(),
            api_key: None,
            shared_key: Some("k1".into()),
        });

        assert_eq!(
            client.asset_original_url("a/1", Some("abc")).unwrap(),
            "https://photos.example.com/api/assets/a%2F1/original?key=k1&c=abc"
        );
    }

    #[test]
    fn urls_without_params_have_no_query() {
        let client = ApiClient::new(ApiConfig::default());
        assert_eq!(
            client.asset_original_url("a1", None).unwrap(),
            "http://localhost:2283/api/assets/a1/original"
        );
    }

    #[test]
    fn shared_link_url_prefers_external_domain() {
        let client = ApiClient::new(ApiConfig::default());
        assert_eq!(
            client.shared_link_url("https://share.example.com", "xyz").unwrap(),
            "https://share.example.com/share/xyz"
        );
        assert_eq!(
            client.shared_link_url("", "xyz").unwrap(),
            "http://localhost:2283/share/xyz"
        );
    }
}
