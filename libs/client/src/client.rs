//! Client facade consumed by container adapters.
//!
//! One container session is a single logical flow: build the client,
//! `start_up` to resolve the target, deploy and undeploy as the tests
//! demand, drop the client. Every management call is awaited before the
//! next starts; the DAS state machine does not tolerate concurrent
//! structural changes, so nothing here pipelines or retries.

use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::deploy::{DeployArchive, Deployer, HttpContext};
use crate::error::ClientError;
use crate::node::NodeAddress;
use crate::rest::RestClient;
use crate::topology::TargetResolver;

/// REST management client for one GlassFish domain.
pub struct GlassFishClient {
    config: ClientConfig,
    rest: RestClient,
}

/// A resolved container session: the endpoint target resolution picked.
///
/// Resolution happens exactly once per session; the session value is
/// threaded into `deploy` instead of living as hidden client state.
#[derive(Debug, Clone)]
pub struct Session {
    node: NodeAddress,
}

impl Session {
    /// Build a session around an already-resolved endpoint.
    pub fn new(node: NodeAddress) -> Self {
        Self { node }
    }

    /// The endpoint deployments are served from.
    pub fn node(&self) -> &NodeAddress {
        &self.node
    }
}

impl GlassFishClient {
    /// Validate the configuration and build the HTTP layer.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let rest = RestClient::new(&config)?;
        Ok(Self { config, rest })
    }

    /// Resolve the configured target into a running, reachable endpoint.
    pub async fn start_up(&self) -> Result<Session, ClientError> {
        let resolver = TargetResolver::new(&self.rest, &self.config);
        let node = resolver
            .resolve()
            .await
            .map_err(|err| self.frame_das_error(err))?;
        info!(
            server = %node.server_name,
            host = %node.host,
            http_port = node.http_port,
            "resolved deployment target"
        );
        Ok(Session::new(node))
    }

    /// Deploy an archive and discover its HTTP surface.
    pub async fn deploy(
        &self,
        session: &Session,
        archive: &DeployArchive,
    ) -> Result<HttpContext, ClientError> {
        Deployer::new(&self.rest, &self.config)
            .deploy(archive, session.node())
            .await
    }

    /// Undeploy the application previously deployed under `name`.
    pub async fn undeploy(&self, name: &str) -> Result<(), ClientError> {
        Deployer::new(&self.rest, &self.config).undeploy(name).await
    }

    /// Probe whether the DAS answers management calls at all.
    ///
    /// Transport failure means "not running"; callers drive their own
    /// polling loops around this. Application-level errors still surface.
    pub async fn is_das_running(&self) -> Result<bool, ClientError> {
        match self.rest.get("").await {
            Ok(_) => Ok(true),
            Err(ClientError::Transport(err)) => {
                debug!(error = %err, "DAS probe failed");
                Ok(false)
            }
            Err(other) => Err(other),
        }
    }

    /// A transport failure during start-up means the DAS itself is
    /// unreachable; frame it with the management URL.
    fn frame_das_error(&self, err: ClientError) -> ClientError {
        match err {
            ClientError::Transport(source) => ClientError::DasUnreachable {
                url: self.rest.base_url().to_string(),
                source,
            },
            other => other,
        }
    }
}
