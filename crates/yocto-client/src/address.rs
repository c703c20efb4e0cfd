//! Location of the printer host.

/// Port the printer host serves its API on.
pub const API_PORT: u16 = 5000;

/// Host name (and port) of the printer host, fixed for the life of a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    host: String,
    port: u16,
}

impl ServerAddress {
    /// Address of a printer host on the standard API port.
    pub fn new(host: impl Into<String>) -> Self {
        Self::with_port(host, API_PORT)
    }

    /// Address on a non-standard port, e.g. a stub server in tests.
    pub fn with_port(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Base URL of the REST API, with trailing slash.
    pub fn api_url(&self) -> String {
        format!("http://{}:{}/api/", self.authority_host(), self.port)
    }

    /// WebSocket URL of the host's live console stream.
    pub fn console_url(&self) -> String {
        format!("ws://{}:{}/api/console", self.authority_host(), self.port)
    }

    /// Full URL of an API endpoint. A leading slash on `path` is ignored.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url(), path.trim_start_matches('/'))
    }

    // IPv6 literals need brackets inside a URL
    fn authority_host(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        }
    }
}

impl std::fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.authority_host(), self.port)
    }
}
