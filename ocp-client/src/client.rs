//! Core OCP client implementation.

use crate::error::{ClientError, Result};
use ocp_core::ProviderConfig;
use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A client for the OCP backend API.
///
/// # Example
///
/// ```no_run
/// use ocp_client::Client;
/// use ocp_core::{ProviderConfig, Region};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ProviderConfig::builder()
///     .token("my-api-token")
///     .region(Region::Pl)
///     .build()?;
/// let client = Client::new(&config)?;
///
/// let versions = client.cluster_versions().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    /// Base URL, ending with `/`.
    base_url: String,
    /// HTTP client.
    http: HttpClient,
    /// API token sent with every request.
    token: String,
}

impl Client {
    /// Create a client from provider configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not HTTP(S) or the HTTP client
    /// cannot be created.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let base_url = config.base_url();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                base_url
            )));
        }

        let http = HttpClient::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent())
            .build()?;

        Ok(Self {
            base_url,
            http,
            token: config.token().to_string(),
        })
    }

    /// Build a full URL from a path.
    fn url(&self, path: &str) -> String {
        let path = path.strip_prefix('/').unwrap_or(path);
        format!("{}{}", self.base_url, path)
    }

    /// Add authentication headers to a request.
    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("Authorization", format!("OpenAPIToken {}", self.token))
    }

    /// Execute a GET request.
    pub(crate) async fn get(&self, path: &str) -> Result<Response> {
        let url = self.url(path);
        tracing::trace!(method = "GET", url = %url, "sending request");
        let request = self.with_auth(self.http.get(&url));

        request.send().await.map_err(ClientError::Http)
    }

    /// Execute a POST request with a JSON body.
    pub(crate) async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let url = self.url(path);
        tracing::trace!(method = "POST", url = %url, "sending request");
        let request = self.with_auth(self.http.post(&url)).json(body);

        request.send().await.map_err(ClientError::Http)
    }

    /// Execute a PATCH request with a JSON body.
    pub(crate) async fn patch<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let url = self.url(path);
        tracing::trace!(method = "PATCH", url = %url, "sending request");
        let request = self.with_auth(self.http.patch(&url)).json(body);

        request.send().await.map_err(ClientError::Http)
    }

    /// Execute a DELETE request.
    pub(crate) async fn delete(&self, path: &str) -> Result<Response> {
        let url = self.url(path);
        tracing::trace!(method = "DELETE", url = %url, "sending request");
        let request = self.with_auth(self.http.delete(&url));

        request.send().await.map_err(ClientError::Http)
    }

    /// Handle a response and deserialize JSON.
    pub(crate) async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.bytes().await.map_err(ClientError::Http)?;
            serde_json::from_slice(&body).map_err(ClientError::Deserialize)
        } else {
            Err(api_error(status, response).await)
        }
    }

    /// Handle a response for a lookup, mapping 404 to `None`.
    pub(crate) async fn handle_optional<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<Option<T>> {
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        self.handle_response(response).await.map(Some)
    }

    /// Handle a response whose body may be empty (204 No Content).
    pub(crate) async fn handle_maybe_empty<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<Option<T>> {
        let status = response.status();

        if status.is_success() {
            let body = response.bytes().await.map_err(ClientError::Http)?;
            if body.iter().all(u8::is_ascii_whitespace) {
                return Ok(None);
            }
            serde_json::from_slice(&body)
                .map(Some)
                .map_err(ClientError::Deserialize)
        } else {
            Err(api_error(status, response).await)
        }
    }
}

/// Build an API error, extracting the message from a JSON body when present.
async fn api_error(status: StatusCode, response: Response) -> ClientError {
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|json| {
            ["error", "detail", "message"]
                .iter()
                .find_map(|key| json[*key].as_str().map(str::to_string))
        })
        .unwrap_or(body);

    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocp_core::Region;

    fn config(endpoint: Option<&str>) -> ProviderConfig {
        let mut builder = ProviderConfig::builder().token("test-token");
        if let Some(endpoint) = endpoint {
            builder = builder.endpoint(endpoint);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_client_new() {
        let client = Client::new(&config(None)).unwrap();
        assert_eq!(client.base_url, "https://core.ocplanet.cloud/backend/api/");
        assert_eq!(client.token, "test-token");
    }

    #[test]
    fn test_client_region_host() {
        let config = ProviderConfig::builder()
            .token("t")
            .region(Region::Pl)
            .build()
            .unwrap();
        let client = Client::new(&config).unwrap();
        assert_eq!(
            client.url("cluster/"),
            "https://core-pl.ocplanet.cloud/backend/api/cluster/"
        );
    }

    #[test]
    fn test_client_invalid_url() {
        let result = Client::new(&config(Some("localhost:8080")));
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }

    #[test]
    fn test_url_building() {
        let client = Client::new(&config(Some("http://localhost:8080"))).unwrap();
        assert_eq!(
            client.url("operations/op-1"),
            "http://localhost:8080/operations/op-1"
        );
        assert_eq!(
            client.url("/node-pool/np-1/"),
            "http://localhost:8080/node-pool/np-1/"
        );
    }
}
