//! HTTP layer for the domain management API.
//!
//! Every call goes to `{scheme}://{admin_host}:{admin_port}/management/domain`
//! plus a resource path, accepts XML, and is classified in three tiers:
//! the transport status, the application-level `exit_code` embedded in the
//! response body, and a deliberate tolerance for 404 so callers can probe
//! optional resources (an absent HTTPS listener, an undefined system
//! property) without failing.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::multipart::Form;
use reqwest::{RequestBuilder, StatusCode};
use tracing::{debug, error, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::value::Value;

/// Exit code of a successful management call.
pub const EXIT_SUCCESS: &str = "SUCCESS";

/// Exit code of a management call that ended in a warning.
pub const EXIT_WARNING: &str = "WARNING";

/// Header the 3.1 management API expects on every request.
const GLASSFISH_3_HEADER: &str = "X-GlassFish-3";

/// CSRF-protection header required on state-changing requests.
const REQUESTED_BY_HEADER: &str = "X-Requested-By";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated HTTP client bound to one management base URL.
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl RestClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/xml"));
        headers.insert(GLASSFISH_3_HEADER, HeaderValue::from_static("junk"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let credentials = if config.authorisation {
            // validate() has already required both fields.
            match (&config.admin_user, &config.admin_password) {
                (Some(user), Some(password)) => Some((user.clone(), password.clone())),
                _ => None,
            }
        } else {
            None
        };

        Ok(Self {
            http,
            base_url: config.management_url(),
            credentials,
        })
    }

    /// The management base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Credentials are attached per request; no session affinity is
    /// assumed on the server side.
    fn authenticated(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((user, password)) => request.basic_auth(user, Some(password)),
            None => request,
        }
    }

    /// GET a management resource and classify the response.
    pub async fn get(&self, path: &str) -> Result<Value, ClientError> {
        debug!(path, "GET management resource");
        let request = self.authenticated(self.http.get(self.url(path)));
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        classify(status, &body)
    }

    /// POST a multipart form to a management resource and classify the
    /// response.
    pub async fn post_multipart(&self, path: &str, form: Form) -> Result<Value, ClientError> {
        debug!(path, "POST multipart to management resource");
        let request = self
            .authenticated(self.http.post(self.url(path)))
            .header(REQUESTED_BY_HEADER, "gfkit-client")
            .multipart(form);
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        classify(status, &body)
    }

    /// Scalar attributes of a resource (`extraProperties.entity`).
    ///
    /// Absent sub-trees yield an empty map; resolution code treats missing
    /// attributes as optional fields.
    pub async fn attributes(&self, path: &str) -> Result<BTreeMap<String, String>, ClientError> {
        let response = self.get(path).await?;
        Ok(extra_properties_map(&response, "entity"))
    }

    /// Child resources of a collection (`extraProperties.childResources`),
    /// keyed by resource name.
    pub async fn child_resources(
        &self,
        path: &str,
    ) -> Result<BTreeMap<String, String>, ClientError> {
        let response = self.get(path).await?;
        Ok(extra_properties_map(&response, "childResources"))
    }

    /// Instance status entries of a listing (`extraProperties.instanceList`).
    pub async fn instance_list(&self, path: &str) -> Result<Vec<Value>, ClientError> {
        let response = self.get(path).await?;
        Ok(response
            .get("extraProperties")
            .and_then(|extra| extra.get("instanceList"))
            .and_then(Value::as_list)
            .map(<[Value]>::to_vec)
            .unwrap_or_default())
    }
}

/// Classify a management response from its transport status and XML body.
///
/// 2xx responses must carry an `exit_code`: `SUCCESS` passes, `WARNING` is
/// logged and tolerated, anything else fails with the embedded message.
/// 404 is non-fatal so callers can probe optional resources. Any other
/// status is fatal.
pub fn classify(status: StatusCode, body: &str) -> Result<Value, ClientError> {
    let decoded = Value::from_xml(body)?;
    let exit_code = decoded.get("exit_code").and_then(Value::as_str);
    let message = decoded
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if status.is_success() {
        match exit_code {
            None => {
                error!(status = status.as_u16(), "management API returned no exit code");
                Err(ClientError::MissingExitCode { message })
            }
            Some(code) if code == EXIT_WARNING => {
                // Some warnings are unavoidable (persistence-related ones in
                // particular) and must not fail the call.
                warn!(message = %message, "management call ended in a warning");
                Ok(decoded)
            }
            Some(code) if code == EXIT_SUCCESS => Ok(decoded),
            Some(code) => {
                error!(exit_code = code, message = %message, "management call failed");
                Err(ClientError::Management { message })
            }
        }
    } else if status == StatusCode::NOT_FOUND {
        // Optional-resource probing; the caller decides what absence means.
        warn!(status = status.as_u16(), "management resource not found");
        Ok(decoded)
    } else {
        let reason = status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string();
        error!(status = status.as_u16(), reason = %reason, "management call rejected");
        Err(ClientError::Status {
            status: status.as_u16(),
            reason,
        })
    }
}

/// Project a named sub-map of `extraProperties` into scalar strings.
fn extra_properties_map(response: &Value, key: &str) -> BTreeMap<String, String> {
    response
        .get("extraProperties")
        .and_then(|extra| extra.get(key))
        .and_then(Value::as_map)
        .map(string_map)
        .unwrap_or_default()
}

/// Top-level `properties` map of a command response (sub-component
/// listings report component name to component type there).
pub(crate) fn properties_map(response: &Value) -> BTreeMap<String, String> {
    response
        .get("properties")
        .and_then(Value::as_map)
        .map(string_map)
        .unwrap_or_default()
}

fn string_map(map: &BTreeMap<String, Value>) -> BTreeMap<String, String> {
    map.iter()
        .filter_map(|(key, value)| value.scalar_string().map(|scalar| (key.clone(), scalar)))
        .collect()
}
