//! Deployment-target resolution over the domain resource graph.
//!
//! A symbolic target denotes the admin server, a standalone instance or a
//! cluster; which one is decided by membership probes against the live
//! domain, never by configuration alone. Endpoint resolution then walks
//! virtual servers to network listeners to protocols to find the HTTP and
//! HTTPS ports, resolves `${...}` system-property port expressions with
//! instance-level overrides winning, and cross-checks non-admin targets
//! against the instance status API. Every resolution re-reads live server
//! state; nothing is cached across calls.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::{ClientConfig, ADMIN_SERVER_TARGET};
use crate::error::ClientError;
use crate::node::NodeAddress;
use crate::rest::RestClient;
use crate::value::Value;

// Resource path templates on the domain management tree.
const SERVERS: &str = "/servers/server";
const CLUSTERS: &str = "/clusters/cluster";
const SERVER_RESOURCE: &str = "/servers/server/{server}";
const CLUSTER_RESOURCE: &str = "/clusters/cluster/{cluster}";
const NODE_RESOURCE: &str = "/nodes/node/{node}";
const CLUSTER_MEMBERS: &str = "/clusters/cluster/{target}/server-ref";
const VIRTUAL_SERVERS: &str =
    "/configs/config/{config}/http-service/list-virtual-servers?target={target}";
const VIRTUAL_SERVER_RESOURCE: &str = "/configs/config/{config}/http-service/virtual-server/{vs}";
const LISTENER_RESOURCE: &str =
    "/configs/config/{config}/network-config/network-listeners/network-listener/{listener}";
const PROTOCOL_RESOURCE: &str =
    "/configs/config/{config}/network-config/protocols/protocol/{protocol}";
const CONFIG_PROPERTY: &str = "/configs/config/{config}/system-property/{property}";
const INSTANCE_PROPERTY: &str = "/servers/server/{server}/system-property/{property}";
const LIST_INSTANCES: &str = "/list-instances";

/// Internal administrative virtual server; never serves deployments.
const ADMIN_VIRTUAL_SERVER: &str = "__asadmin";

const STATUS_RUNNING: &str = "RUNNING";

/// What a symbolic deployment target denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    AdminServer,
    Standalone,
    Cluster,
}

/// Raw port values picked off the listener graph.
///
/// These may still be `${...}` system-property expressions; clusters walk
/// the graph once against the shared config and resolve the expressions
/// per member instance.
struct RawPorts {
    http: String,
    https: Option<String>,
}

/// One-shot resolver from the configured target to a reachable endpoint.
pub(crate) struct TargetResolver<'a> {
    rest: &'a RestClient,
    config: &'a ClientConfig,
}

impl<'a> TargetResolver<'a> {
    pub fn new(rest: &'a RestClient, config: &'a ClientConfig) -> Self {
        Self { rest, config }
    }

    /// Decide what the configured target denotes.
    ///
    /// The reserved admin-server name short-circuits; everything else is a
    /// membership probe against the live server and cluster collections.
    pub async fn classify(&self) -> Result<TargetKind, ClientError> {
        let target = &self.config.target;
        if target == ADMIN_SERVER_TARGET {
            return Ok(TargetKind::AdminServer);
        }
        let servers = self.rest.child_resources(SERVERS).await?;
        if servers.contains_key(target) {
            return Ok(TargetKind::Standalone);
        }
        let clusters = self.rest.child_resources(CLUSTERS).await?;
        if clusters.contains_key(target) {
            return Ok(TargetKind::Cluster);
        }
        // A domain name or a typo; neither is a deployable destination.
        Err(ClientError::UnknownTarget(target.clone()))
    }

    /// Resolve the configured target into the endpoint for this session.
    pub async fn resolve(&self) -> Result<NodeAddress, ClientError> {
        let kind = self.classify().await?;
        debug!(target_name = %self.config.target, ?kind, "resolving deployment target");
        match kind {
            TargetKind::AdminServer => self.resolve_admin().await,
            TargetKind::Standalone => self.resolve_standalone().await,
            TargetKind::Cluster => self.resolve_cluster().await,
        }
    }

    /// The DAS is addressed by the configured admin host; its node record
    /// may describe an interface that means nothing to a remote client.
    async fn resolve_admin(&self) -> Result<NodeAddress, ClientError> {
        let attributes = self.server_attributes(ADMIN_SERVER_TARGET).await?;
        let config_name = required(&attributes, "configRef", ADMIN_SERVER_TARGET)?;

        let ports = self.listener_ports(&config_name, ADMIN_SERVER_TARGET).await?;
        let http_port = self
            .resolve_port(&ports.http, &config_name, ADMIN_SERVER_TARGET)
            .await?;
        let https_port = match &ports.https {
            Some(raw) => Some(
                self.resolve_port(raw, &config_name, ADMIN_SERVER_TARGET)
                    .await?,
            ),
            None => None,
        };

        Ok(NodeAddress::new(
            ADMIN_SERVER_TARGET,
            self.config.admin_host.clone(),
            http_port,
            https_port,
        ))
    }

    async fn resolve_standalone(&self) -> Result<NodeAddress, ClientError> {
        let target = self.config.target.clone();
        let attributes = self.server_attributes(&target).await?;
        let config_name = required(&attributes, "configRef", &target)?;
        let node_ref = required(&attributes, "nodeRef", &target)?;

        let node_host = self.node_host(&node_ref).await?;
        let host = effective_host(&node_host, &self.config.admin_host);

        let ports = self.listener_ports(&config_name, &target).await?;
        let http_port = self.resolve_port(&ports.http, &config_name, &target).await?;
        let https_port = match &ports.https {
            Some(raw) => Some(self.resolve_port(raw, &config_name, &target).await?),
            None => None,
        };

        let node = NodeAddress::new(target, host, http_port, https_port);
        self.require_running(&node.server_name).await?;
        Ok(node)
    }

    /// Clusters are homogeneous: the listener graph is walked once against
    /// the cluster's shared config, then applied to every member with
    /// per-member host lookup and port overrides. The first member the
    /// status API reports as running wins.
    async fn resolve_cluster(&self) -> Result<NodeAddress, ClientError> {
        let target = &self.config.target;
        let cluster_path = CLUSTER_RESOURCE.replace("{cluster}", target);
        let attributes = self.rest.attributes(&cluster_path).await?;
        let config_name = required(&attributes, "configRef", target)?;

        let ports = self.listener_ports(&config_name, target).await?;

        let members = self
            .rest
            .child_resources(&CLUSTER_MEMBERS.replace("{target}", target))
            .await?;

        for (name, status) in self.instance_statuses().await? {
            if !members.contains_key(&name) {
                continue;
            }
            if status != STATUS_RUNNING {
                debug!(member = %name, status = %status, "skipping cluster member");
                continue;
            }

            let member_attributes = self.server_attributes(&name).await?;
            let node_ref = required(&member_attributes, "nodeRef", &name)?;
            let node_host = self.node_host(&node_ref).await?;
            let host = effective_host(&node_host, &self.config.admin_host);

            let http_port = self.resolve_port(&ports.http, &config_name, &name).await?;
            let https_port = match &ports.https {
                Some(raw) => Some(self.resolve_port(raw, &config_name, &name).await?),
                None => None,
            };

            debug!(member = %name, host = %host, "selected running cluster member");
            return Ok(NodeAddress::new(name, host, http_port, https_port));
        }

        Err(ClientError::NoRunningInstance(target.clone()))
    }

    /// Walk virtual servers to network listeners to protocols under
    /// `config_name` and pick the first enabled listener for each security
    /// mode. HTTP is mandatory; a missing secure listener leaves the HTTPS
    /// port unset rather than failing.
    async fn listener_ports(
        &self,
        config_name: &str,
        target: &str,
    ) -> Result<RawPorts, ClientError> {
        let mut http = None;
        let mut https = None;

        let virtual_servers_path = VIRTUAL_SERVERS
            .replace("{config}", config_name)
            .replace("{target}", target);
        let virtual_servers = self.rest.child_resources(&virtual_servers_path).await?;

        for name in virtual_servers.keys() {
            if name == ADMIN_VIRTUAL_SERVER {
                continue;
            }
            if http.is_some() && https.is_some() {
                break;
            }

            let virtual_server_path = VIRTUAL_SERVER_RESOURCE
                .replace("{config}", config_name)
                .replace("{vs}", name);
            let virtual_server = self.rest.attributes(&virtual_server_path).await?;
            let Some(listeners) = virtual_server.get("networkListeners") else {
                continue;
            };

            for listener_name in listeners.split(',').map(str::trim).filter(|l| !l.is_empty()) {
                let listener_path = LISTENER_RESOURCE
                    .replace("{config}", config_name)
                    .replace("{listener}", listener_name);
                let listener = self.rest.attributes(&listener_path).await?;

                if listener.get("enabled").map(String::as_str) == Some("false") {
                    continue;
                }
                let Some(port) = listener.get("port") else {
                    continue;
                };
                let Some(protocol_name) = listener.get("protocol") else {
                    continue;
                };

                let protocol_path = PROTOCOL_RESOURCE
                    .replace("{config}", config_name)
                    .replace("{protocol}", protocol_name);
                let protocol = self.rest.attributes(&protocol_path).await?;
                let secure = protocol.get("securityEnabled").map(String::as_str) == Some("true");

                if secure {
                    if https.is_none() {
                        debug!(listener = listener_name, port = %port, "found secure listener");
                        https = Some(port.clone());
                    }
                } else if http.is_none() {
                    debug!(listener = listener_name, port = %port, "found plain listener");
                    http = Some(port.clone());
                }
            }
        }

        match http {
            Some(http) => Ok(RawPorts { http, https }),
            None => Err(ClientError::NoHttpListener(target.to_string())),
        }
    }

    /// Resolve a raw listener port value to a number.
    ///
    /// A literal parses directly. A `${name}` expression reads the owning
    /// config's system property first, then lets a same-named property on
    /// the specific server instance override it; instances on a shared
    /// node rely on those overrides.
    async fn resolve_port(
        &self,
        raw: &str,
        config_name: &str,
        server: &str,
    ) -> Result<u16, ClientError> {
        let Some(property) = property_name(raw) else {
            return parse_port(raw, server);
        };

        let config_path = CONFIG_PROPERTY
            .replace("{config}", config_name)
            .replace("{property}", property);
        let mut value = self.system_property(&config_path).await?;

        let instance_path = INSTANCE_PROPERTY
            .replace("{server}", server)
            .replace("{property}", property);
        if let Some(instance_value) = self.system_property(&instance_path).await? {
            value = Some(instance_value);
        }

        match value {
            Some(value) => parse_port(&value, server),
            None => Err(ClientError::UnresolvedPort {
                property: property.to_string(),
                server: server.to_string(),
            }),
        }
    }

    /// The property resource 404s when undefined; the tolerant transport
    /// layer turns that into an empty attribute map.
    async fn system_property(&self, path: &str) -> Result<Option<String>, ClientError> {
        Ok(self.rest.attributes(path).await?.get("value").cloned())
    }

    async fn server_attributes(
        &self,
        server: &str,
    ) -> Result<BTreeMap<String, String>, ClientError> {
        self.rest
            .attributes(&SERVER_RESOURCE.replace("{server}", server))
            .await
    }

    async fn node_host(&self, node_ref: &str) -> Result<String, ClientError> {
        let attributes = self
            .rest
            .attributes(&NODE_RESOURCE.replace("{node}", node_ref))
            .await?;
        required(&attributes, "nodeHost", node_ref)
    }

    /// Cross-check a standalone candidate against the instance status API.
    async fn require_running(&self, name: &str) -> Result<(), ClientError> {
        for (instance, status) in self.instance_statuses().await? {
            if instance == name {
                if status == STATUS_RUNNING {
                    return Ok(());
                }
                return Err(ClientError::InstanceNotRunning {
                    name: name.to_string(),
                    status,
                });
            }
        }
        Err(ClientError::InstanceNotRunning {
            name: name.to_string(),
            status: "unknown".to_string(),
        })
    }

    /// Instance name and status pairs, in the order the status API reports
    /// them.
    async fn instance_statuses(&self) -> Result<Vec<(String, String)>, ClientError> {
        let entries = self.rest.instance_list(LIST_INSTANCES).await?;
        Ok(entries
            .iter()
            .filter_map(|entry| {
                let name = entry.get("name").and_then(Value::as_str)?;
                let status = entry.get("status").and_then(Value::as_str)?;
                Some((name.to_string(), status.to_string()))
            })
            .collect())
    }
}

/// A node registered as `localhost` is only meaningful on the node itself;
/// the configured admin host is the closest reachable proxy for a remote
/// client.
fn effective_host(node_host: &str, admin_host: &str) -> String {
    if node_host == "localhost" {
        admin_host.to_string()
    } else {
        node_host.to_string()
    }
}

/// Extract the property name from a `${name}` port expression.
fn property_name(raw: &str) -> Option<&str> {
    raw.strip_prefix("${").and_then(|rest| rest.strip_suffix('}'))
}

fn parse_port(value: &str, server: &str) -> Result<u16, ClientError> {
    value.parse().map_err(|_| ClientError::InvalidPort {
        value: value.to_string(),
        server: server.to_string(),
    })
}

fn required(
    attributes: &BTreeMap<String, String>,
    attribute: &'static str,
    resource: &str,
) -> Result<String, ClientError> {
    attributes
        .get(attribute)
        .cloned()
        .ok_or_else(|| ClientError::MissingAttribute {
            resource: resource.to_string(),
            attribute,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loopback_node_host_is_replaced_by_admin_host() {
        assert_eq!(effective_host("localhost", "ci.example.com"), "ci.example.com");
    }

    #[test]
    fn test_concrete_node_host_wins() {
        assert_eq!(
            effective_host("worker1.example.com", "ci.example.com"),
            "worker1.example.com"
        );
    }

    #[test]
    fn test_property_name_extraction() {
        assert_eq!(property_name("${HTTP_LISTENER_PORT}"), Some("HTTP_LISTENER_PORT"));
        assert_eq!(property_name("8080"), None);
        assert_eq!(property_name("${unterminated"), None);
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("8080", "inst1").unwrap(), 8080);
        assert!(matches!(
            parse_port("not-a-port", "inst1"),
            Err(ClientError::InvalidPort { .. })
        ));
    }
}
