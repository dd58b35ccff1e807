//! REST management client for GlassFish 3.1 domains.
//!
//! Test harnesses drive a remote GlassFish through its REST management
//! API: resolve a symbolic deployment target (the admin server, a
//! standalone instance or a cluster) into a reachable endpoint, deploy
//! and undeploy archives, and discover the servlets of a deployed
//! application.
//!
//! The flow per container session:
//!
//! - [`GlassFishClient::new`] validates the configuration and builds the
//!   HTTP layer.
//! - [`GlassFishClient::start_up`] walks the domain resource graph to
//!   turn the target name into a [`NodeAddress`], returned as a
//!   [`Session`].
//! - [`GlassFishClient::deploy`] posts the archive and reconciles the
//!   deployed servlets into an [`HttpContext`].
//! - [`GlassFishClient::undeploy`] removes the application again.

pub mod client;
pub mod config;
pub mod deploy;
pub mod error;
pub mod node;
pub mod rest;
pub mod topology;
pub mod value;

pub use client::{GlassFishClient, Session};
pub use config::{ClientConfig, ADMIN_SERVER_TARGET};
pub use deploy::{DeployArchive, HttpContext, Servlet};
pub use error::ClientError;
pub use node::NodeAddress;
pub use value::{DecodeError, Value};
