//! Client configuration for one container session.
//!
//! The configuration is owned by the adapter and read-only to the client;
//! harnesses typically deserialize it from their own config files.

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Reserved target name addressing the Domain Administration Server.
pub const ADMIN_SERVER_TARGET: &str = "server";

/// Configuration of a GlassFish management session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// DAS host address, used to build the management URL.
    #[serde(default = "default_admin_host")]
    pub admin_host: String,

    /// DAS administration port.
    #[serde(default = "default_admin_port")]
    pub admin_port: u16,

    /// Whether the management URL uses a secure connection.
    #[serde(default)]
    pub admin_https: bool,

    /// Whether deployed applications are addressed over HTTPS.
    #[serde(default)]
    pub app_https: bool,

    /// Deployment target: the admin server, a standalone instance name or
    /// a cluster name.
    #[serde(default = "default_target")]
    pub target: String,

    /// Whether the DAS requires an authenticated admin user.
    #[serde(default)]
    pub authorisation: bool,

    /// Admin user in the remote admin realm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_user: Option<String>,

    /// Admin user password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,

    /// Comma-separated library JARs handed to the deploy command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub libraries: Option<String>,

    /// Additional keyword-value deployment properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<String>,

    /// Archive type hint; only `osgi` is meaningful.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_type: Option<String>,

    /// Context root override for the deployed application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_root: Option<String>,
}

fn default_admin_host() -> String {
    "localhost".to_string()
}

fn default_admin_port() -> u16 {
    4848
}

fn default_target() -> String {
    ADMIN_SERVER_TARGET.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            admin_host: default_admin_host(),
            admin_port: default_admin_port(),
            admin_https: false,
            app_https: false,
            target: default_target(),
            authorisation: false,
            admin_user: None,
            admin_password: None,
            libraries: None,
            properties: None,
            app_type: None,
            context_root: None,
        }
    }
}

impl ClientConfig {
    /// Base URL of the domain management tree.
    pub fn management_url(&self) -> String {
        let scheme = if self.admin_https { "https" } else { "http" };
        format!(
            "{}://{}:{}/management/domain",
            scheme, self.admin_host, self.admin_port
        )
    }

    /// Check that the configuration is usable before any network traffic.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.authorisation {
            if self.admin_user.is_none() {
                return Err(ClientError::Config(
                    "admin_user must be specified to use authorisation".to_string(),
                ));
            }
            if self.admin_password.is_none() {
                return Err(ClientError::Config(
                    "admin_password must be specified to use authorisation".to_string(),
                ));
            }
        }
        Ok(())
    }
}
