//! Deployment, undeployment and sub-component discovery.
//!
//! Deploying posts the archive as a multipart form to the applications
//! collection, then reconciles what the server actually created: the
//! application's context root, its servlets, and (for enterprise
//! archives) the context roots and servlets of each web module.

use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::node::NodeAddress;
use crate::rest::{properties_map, RestClient};
use crate::value::Value;

const APPLICATIONS: &str = "/applications/application";
const APPLICATION_RESOURCE: &str = "/applications/application/{name}";
const SUB_COMPONENTS: &str =
    "/applications/application/list-sub-components?id={application}&type=servlets";
const MODULE_SUB_COMPONENTS: &str =
    "/applications/application/list-sub-components?appname={application}&id={module}&type=servlets";

/// Marker posted as the `operation` field to delete an application.
const DELETE_OPERATION: &str = "__deleteoperation";

// Sub-component types reported by the management API.
const SERVLET: &str = "Servlet";
const WEB_MODULE: &str = "WebModule";

/// An archive handed over by the harness: a file name plus its bytes.
#[derive(Debug, Clone)]
pub struct DeployArchive {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl DeployArchive {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// The name the application is deployed under: the file name without
    /// any leading `/` or extension.
    pub fn deployment_name(&self) -> String {
        deployment_name(&self.file_name)
    }
}

pub(crate) fn deployment_name(file_name: &str) -> String {
    let name = file_name.strip_prefix('/').unwrap_or(file_name);
    match name.rfind('.') {
        Some(dot) => name[..dot].to_string(),
        None => name.to_string(),
    }
}

/// A servlet reported by the management API, attached to its context root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Servlet {
    pub name: String,
    pub context_root: String,
}

/// HTTP entry point of a deployed application: the resolved endpoint plus
/// the servlets reachable through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpContext {
    pub host: String,
    pub port: u16,
    pub servlets: Vec<Servlet>,
}

impl HttpContext {
    fn new(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            servlets: Vec::new(),
        }
    }

    fn add(&mut self, servlet: Servlet) {
        self.servlets.push(servlet);
    }
}

/// Drives deploy/undeploy calls against the applications resource.
pub(crate) struct Deployer<'a> {
    rest: &'a RestClient,
    config: &'a ClientConfig,
}

impl<'a> Deployer<'a> {
    pub fn new(rest: &'a RestClient, config: &'a ClientConfig) -> Self {
        Self { rest, config }
    }

    /// Deploy the archive to the configured target and discover its HTTP
    /// surface on the resolved endpoint.
    pub async fn deploy(
        &self,
        archive: &DeployArchive,
        node: &NodeAddress,
    ) -> Result<HttpContext, ClientError> {
        let name = archive.deployment_name();
        self.deploy_inner(&name, archive, node)
            .await
            .map_err(|source| ClientError::Deploy {
                name,
                source: Box::new(source),
            })
    }

    async fn deploy_inner(
        &self,
        name: &str,
        archive: &DeployArchive,
        node: &NodeAddress,
    ) -> Result<HttpContext, ClientError> {
        debug!(name, target_name = %self.config.target, "deploying application");
        self.rest
            .post_multipart(APPLICATIONS, self.deploy_form(name, archive))
            .await?;

        let context_root = self.application_context_root(name).await?;

        let sub_components_path = SUB_COMPONENTS.replace("{application}", name);
        let response = self.rest.get(&sub_components_path).await?;
        let sub_components = properties_map(&response);

        let port = if self.config.app_https {
            node.https_port.ok_or_else(|| {
                ClientError::Config(format!(
                    "application TLS requested but target {} has no secure listener",
                    node.server_name
                ))
            })?
        } else {
            node.http_port
        };
        let mut context = HttpContext::new(node.host.clone(), port);

        for (component, kind) in &sub_components {
            if kind == WEB_MODULE {
                // Enterprise archive: the module's own context root wins
                // over the application-level one for its servlets.
                let module_root = web_module_context_root(component, &response)?;
                self.add_module_servlets(name, component, &module_root, &mut context)
                    .await?;
            } else if kind == SERVLET {
                context.add(Servlet {
                    name: component.clone(),
                    context_root: context_root.clone(),
                });
            }
        }

        debug!(name, servlets = context.servlets.len(), "application deployed");
        Ok(context)
    }

    /// Undeploy the named application from the configured target.
    pub async fn undeploy(&self, name: &str) -> Result<(), ClientError> {
        debug!(name, target_name = %self.config.target, "undeploying application");
        let form = Form::new()
            .text("target", self.config.target.clone())
            .text("operation", DELETE_OPERATION);
        let path = APPLICATION_RESOURCE.replace("{name}", name);
        self.rest
            .post_multipart(&path, form)
            .await
            .map(|_| ())
            .map_err(|source| ClientError::Undeploy {
                name: name.to_string(),
                source: Box::new(source),
            })
    }

    fn deploy_form(&self, name: &str, archive: &DeployArchive) -> Form {
        let part = Part::bytes(archive.bytes.clone()).file_name(archive.file_name.clone());
        let mut form = Form::new()
            .part("id", part)
            .text("name", name.to_string())
            .text("target", self.config.target.clone());

        if let Some(libraries) = &self.config.libraries {
            form = form.text("libraries", libraries.clone());
        }
        if let Some(properties) = &self.config.properties {
            form = form.text("properties", properties.clone());
        }
        if let Some(context_root) = &self.config.context_root {
            form = form.text("contextRoot", context_root.clone());
        }
        // The only valid archive type is osgi; anything else is omitted.
        if self.config.app_type.as_deref() == Some("osgi") {
            form = form.text("type", "osgi");
        }
        form
    }

    async fn application_context_root(&self, name: &str) -> Result<String, ClientError> {
        let path = APPLICATION_RESOURCE.replace("{name}", name);
        let attributes = self.rest.attributes(&path).await?;
        attributes
            .get("contextRoot")
            .cloned()
            .ok_or_else(|| ClientError::MissingAttribute {
                resource: name.to_string(),
                attribute: "contextRoot",
            })
    }

    async fn add_module_servlets(
        &self,
        application: &str,
        module: &str,
        context_root: &str,
        context: &mut HttpContext,
    ) -> Result<(), ClientError> {
        let path = MODULE_SUB_COMPONENTS
            .replace("{application}", application)
            .replace("{module}", module);
        let response = self.rest.get(&path).await?;
        for (servlet, kind) in properties_map(&response) {
            if kind == SERVLET {
                context.add(Servlet {
                    name: servlet,
                    context_root: context_root.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Derive a web module's context root from its `moduleInfo` property in
/// the sub-component listing's `children`.
///
/// `moduleInfo` is a compound `<module>/<context-root>` string; everything
/// from the first `/` is the context root. An absent property is fatal:
/// there is nothing to guess from.
fn web_module_context_root(module: &str, response: &Value) -> Result<String, ClientError> {
    let children = response
        .get("children")
        .and_then(Value::as_list)
        .unwrap_or(&[]);

    for child in children {
        let Some(info) = child
            .get("properties")
            .and_then(|properties| properties.get("moduleInfo"))
            .and_then(Value::as_str)
        else {
            continue;
        };
        if !info.starts_with(module) {
            continue;
        }
        if let Some(slash) = info.find('/') {
            return Ok(info[slash..].to_string());
        }
    }

    Err(ClientError::ModuleContextRoot(module.to_string()))
}
