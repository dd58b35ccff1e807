//! Error type for the management client.
//!
//! Every failure of this crate surfaces as a [`ClientError`]; adapters
//! re-wrap it into their own lifecycle or deployment error types. The only
//! outcomes that are deliberately not errors are `WARNING` exit codes and
//! 404 responses on optional-resource probes.

use thiserror::Error;

use crate::value::DecodeError;

/// Errors raised by the GlassFish management client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The DAS did not answer the first management call of a session.
    #[error("cannot reach DAS at {url}: {source}")]
    DasUnreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Connection-level failure (refused, DNS, TLS).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx response whose body carries no `exit_code` field.
    #[error("management API returned no exit code: {message}")]
    MissingExitCode { message: String },

    /// The management API reported a failure exit code.
    #[error("management API call failed: {message}")]
    Management { message: String },

    /// Unclassified non-2xx transport status.
    #[error("management API returned {status}: {reason}")]
    Status { status: u16, reason: String },

    /// The response body could not be decoded.
    #[error("invalid management response: {0}")]
    Decode(#[from] DecodeError),

    /// The configured target matches no known deployment destination.
    #[error("target {0:?} is neither the admin server, a standalone instance nor a cluster")]
    UnknownTarget(String),

    /// A resource answered without an attribute the resolution relies on.
    #[error("resource {resource} has no {attribute} attribute")]
    MissingAttribute {
        resource: String,
        attribute: &'static str,
    },

    /// No enabled plain-HTTP listener could be found for the target.
    #[error("no enabled HTTP listener for target {0}")]
    NoHttpListener(String),

    /// A `${...}` port expression resolved through neither the config nor
    /// the instance system properties.
    #[error("could not resolve port property {property} for server {server}")]
    UnresolvedPort { property: String, server: String },

    /// A listener port value that is not a valid port number.
    #[error("invalid port value {value:?} for server {server}")]
    InvalidPort { value: String, server: String },

    /// The target instance exists but is not running.
    #[error("instance {name} is not running (status: {status})")]
    InstanceNotRunning { name: String, status: String },

    /// No member of the target cluster reports a running status.
    #[error("cluster {0} has no running instance")]
    NoRunningInstance(String),

    /// A web module's context root could not be derived.
    #[error("could not derive a context root for web module {0}")]
    ModuleContextRoot(String),

    /// Deployment failed; the source carries the underlying cause.
    #[error("could not deploy {name}: {source}")]
    Deploy {
        name: String,
        #[source]
        source: Box<ClientError>,
    },

    /// Undeployment failed; the source carries the underlying cause.
    #[error("could not undeploy {name}: {source}")]
    Undeploy {
        name: String,
        #[source]
        source: Box<ClientError>,
    },

    /// The client configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),
}
