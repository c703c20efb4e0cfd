//! Request helpers for the printer host REST API.
//!
//! [`ApiClient::fetch_api`] is used for requests whose answer the caller
//! reads as JSON, [`ApiClient::send_api_cmd`] for commands that change the
//! printer's state. A successful command asks the status poller for an
//! immediate refresh so consumers see its effect without waiting a full tick.
//!
//! Requests are owned by the future that issued them. Stopping a
//! [`StatusPoller`](crate::poller::StatusPoller) never aborts one midway.
//!
//! ## Example
//!
//! ```no_run
//! use yocto_client::{ApiClient, ServerAddress, StatusPoller, PollerConfig};
//! use yocto_core::RelativeMove;
//!
//! # async fn example() -> yocto_client::Result<()> {
//! let client = ApiClient::new(ServerAddress::new("octopi.local"));
//! let poller = StatusPoller::new(client.clone(), PollerConfig::default());
//! let mut updates = poller.subscribe();
//!
//! let refresh = poller.refresh_handle();
//! client.move_relative(&RelativeMove::new().z(5.0), Some(&refresh)).await?;
//!
//! if let Some(status) = updates.next().await {
//!     println!("{status}");
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;
use yocto_core::{GcodeFileList, RelativeMove, StatusSnapshot};

use crate::address::ServerAddress;
use crate::error::{ClientError, Result};
use crate::poller::{RefreshHandle, StatusSource};

/// Path of the status endpoint, relative to the API base.
pub const STATUS_PATH: &str = "status";
/// Path of the homing command.
pub const HOME_PATH: &str = "home";
/// Path of the relative move command.
pub const MOVE_PATH: &str = "move";
/// Path of the G-code file listing.
pub const LIST_GCODE_PATH: &str = "list_gcode";
/// Path of the G-code upload.
pub const UPLOAD_GCODE_PATH: &str = "upload_gcode";

const JSON_MIME: &str = "application/json";
const OCTET_STREAM_MIME: &str = "application/octet-stream";

/// Parse an HTTP method name such as `"POST"`.
pub fn parse_method(name: &str) -> Result<Method> {
    Method::from_bytes(name.to_ascii_uppercase().as_bytes())
        .map_err(|_| ClientError::InvalidMethod(name.to_string()))
}

/// Client for the printer host API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    address: ServerAddress,
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a client for the given host.
    pub fn new(address: ServerAddress) -> Self {
        Self::with_http_client(address, reqwest::Client::new())
    }

    /// Create a client reusing an existing `reqwest` client.
    pub fn with_http_client(address: ServerAddress, client: reqwest::Client) -> Self {
        Self { address, client }
    }

    pub fn address(&self) -> &ServerAddress {
        &self.address
    }

    /// Base URL of the REST API.
    pub fn api_url(&self) -> String {
        self.address.api_url()
    }

    /// URL of the live console WebSocket.
    pub fn console_url(&self) -> String {
        self.address.console_url()
    }

    fn request(&self, method: Method, path: &str, body: Option<&Value>) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.address.endpoint(path))
            .header(ACCEPT, JSON_MIME);

        match body {
            Some(body) => builder.header(CONTENT_TYPE, JSON_MIME).json(body),
            None => builder,
        }
    }

    /// Issue a request and parse the response body as JSON.
    ///
    /// The HTTP status is not inspected: an error status with a JSON body
    /// resolves successfully. No retries and no timeout.
    pub async fn fetch_api(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        debug!(%method, path, "fetching from host API");

        let response = self.request(method, path, body).send().await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Issue a command request without parsing its body.
    ///
    /// Once the request succeeded, `refresh` (if any) is asked for one
    /// immediate status refresh. The refresh runs in the background and is
    /// not awaited. On failure the error is returned and nothing is refreshed.
    pub async fn send_api_cmd(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        refresh: Option<&RefreshHandle>,
    ) -> Result<Response> {
        debug!(%method, path, "sending command to host API");

        let response = self.request(method, path, body).send().await?;
        request_refresh(path, refresh);

        Ok(response)
    }

    /// Fetch the status once, with `host_connected` forced to `true`.
    pub async fn fetch_status(&self) -> Result<StatusSnapshot> {
        let value = self.fetch_api(Method::GET, STATUS_PATH, None).await?;
        StatusSnapshot::from_value(value)
            .map(StatusSnapshot::mark_host_connected)
            .ok_or_else(|| ClientError::NotAnObject {
                path: STATUS_PATH.to_string(),
            })
    }

    /// Home all axes.
    pub async fn home(&self, refresh: Option<&RefreshHandle>) -> Result<Response> {
        self.send_api_cmd(Method::POST, HOME_PATH, None, refresh)
            .await
    }

    /// Jog the printer head relative to its current position.
    pub async fn move_relative(
        &self,
        offset: &RelativeMove,
        refresh: Option<&RefreshHandle>,
    ) -> Result<Response> {
        let body = serde_json::to_value(offset)?;
        self.send_api_cmd(Method::POST, MOVE_PATH, Some(&body), refresh)
            .await
    }

    /// List the G-code files stored on the host.
    pub async fn list_gcode(&self) -> Result<GcodeFileList> {
        let value = self.fetch_api(Method::GET, LIST_GCODE_PATH, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Store a G-code file on the host as `gcode/<filename>`.
    ///
    /// The file is sent as a raw octet stream, not JSON. The host refuses to
    /// overwrite an existing file and answers with an error text, which the
    /// caller finds in the returned response. Refreshes like
    /// [`send_api_cmd`](Self::send_api_cmd).
    pub async fn upload_gcode(
        &self,
        filename: &str,
        data: Vec<u8>,
        refresh: Option<&RefreshHandle>,
    ) -> Result<Response> {
        debug!(filename, bytes = data.len(), "uploading G-code to host");

        let response = self
            .client
            .put(self.address.endpoint(UPLOAD_GCODE_PATH))
            .query(&[("filename", filename)])
            .header(ACCEPT, JSON_MIME)
            .header(CONTENT_TYPE, OCTET_STREAM_MIME)
            .body(data)
            .send()
            .await?;
        request_refresh(UPLOAD_GCODE_PATH, refresh);

        Ok(response)
    }
}

/// Ask the poller behind `refresh` for one background refresh.
fn request_refresh(path: &str, refresh: Option<&RefreshHandle>) {
    match refresh {
        Some(handle) => {
            if handle.refresh_now().is_none() {
                debug!(path, "status poller is gone, skipping refresh");
            }
        }
        None => {
            // No poller registered: nothing to refresh
        }
    }
}

#[async_trait]
impl StatusSource for ApiClient {
    async fn fetch_status(&self) -> Result<StatusSnapshot> {
        ApiClient::fetch_status(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_method() {
        assert_eq!(parse_method("GET").unwrap(), Method::GET);
        assert_eq!(parse_method("post").unwrap(), Method::POST);
        assert_eq!(parse_method("PUT").unwrap(), Method::PUT);
    }

    #[test]
    fn test_parse_invalid_method() {
        let err = parse_method("GE T").unwrap_err();
        assert!(matches!(err, ClientError::InvalidMethod(_)));
    }

    #[test]
    fn test_client_urls() {
        let client = ApiClient::new(ServerAddress::new("printer.lan"));
        assert_eq!(client.api_url(), "http://printer.lan:5000/api/");
        assert_eq!(client.console_url(), "ws://printer.lan:5000/api/console");
        assert_eq!(client.address().host(), "printer.lan");
    }
}
