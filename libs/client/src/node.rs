//! Resolved network endpoint of a deployment target.

/// Endpoint descriptor produced by target resolution.
///
/// The HTTP port is always present; the HTTPS port only exists when an
/// enabled secure listener was found on the target's virtual servers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAddress {
    /// Name of the server instance this endpoint belongs to.
    pub server_name: String,

    /// Host name or IP of the node.
    pub host: String,

    /// Port for plain HTTP requests.
    pub http_port: u16,

    /// Port for HTTPS requests, when a secure listener is configured.
    pub https_port: Option<u16>,
}

impl NodeAddress {
    pub fn new(
        server_name: impl Into<String>,
        host: impl Into<String>,
        http_port: u16,
        https_port: Option<u16>,
    ) -> Self {
        Self {
            server_name: server_name.into(),
            host: host.into(),
            http_port,
            https_port,
        }
    }

    /// Base URL for plain HTTP requests against this endpoint.
    pub fn http_url(&self) -> String {
        format!("http://{}:{}", self.host, self.http_port)
    }

    /// Base URL for HTTPS requests, when a secure listener exists.
    pub fn https_url(&self) -> Option<String> {
        self.https_port
            .map(|port| format!("https://{}:{}", self.host, port))
    }
}

impl std::fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.http_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_construction() {
        let node = NodeAddress::new("server", "ci.example.com", 8080, Some(8181));
        assert_eq!(node.http_url(), "http://ci.example.com:8080");
        assert_eq!(node.https_url().as_deref(), Some("https://ci.example.com:8181"));
    }

    #[test]
    fn test_https_url_absent_without_secure_listener() {
        let node = NodeAddress::new("inst1", "ci.example.com", 8080, None);
        assert_eq!(node.https_url(), None);
    }
}
