//! Shared fixtures: XML envelopes the management API answers with, plus
//! mock wiring against a wiremock server.
#![allow(dead_code)]

use gfkit_client::ClientConfig;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Root of the domain management tree.
pub const BASE: &str = "/management/domain";

/// Client configuration pointing at the mock DAS.
pub fn config_for(server: &MockServer) -> ClientConfig {
    let address = server.address();
    ClientConfig {
        admin_host: address.ip().to_string(),
        admin_port: address.port(),
        ..ClientConfig::default()
    }
}

/// A `SUCCESS` envelope with the given `extraProperties` entries.
pub fn envelope(extra_properties: &str) -> String {
    format!(
        r#"<map>
             <entry key="exit_code" value="SUCCESS"/>
             <entry key="message" value=""/>
             <entry key="extraProperties"><map>{extra_properties}</map></entry>
           </map>"#
    )
}

/// Envelope carrying a resource's scalar attributes.
pub fn entity(attributes: &[(&str, &str)]) -> String {
    let entries: String = attributes
        .iter()
        .map(|(key, value)| format!(r#"<entry key="{key}" value="{value}"/>"#))
        .collect();
    envelope(&format!(r#"<entry key="entity"><map>{entries}</map></entry>"#))
}

/// Envelope listing a collection's child resources.
pub fn child_resources(names: &[&str]) -> String {
    let entries: String = names
        .iter()
        .map(|name| format!(r#"<entry key="{name}" value="{BASE}/resource/{name}"/>"#))
        .collect();
    envelope(&format!(
        r#"<entry key="childResources"><map>{entries}</map></entry>"#
    ))
}

/// Envelope of the instance status listing.
pub fn instance_list(instances: &[(&str, &str)]) -> String {
    let maps: String = instances
        .iter()
        .map(|(name, status)| {
            format!(
                r#"<map><entry key="name" value="{name}"/><entry key="status" value="{status}"/></map>"#
            )
        })
        .collect();
    envelope(&format!(
        r#"<entry key="instanceList"><list>{maps}</list></entry>"#
    ))
}

/// Envelope of a sub-component listing: the component-to-type `properties`
/// map plus optional raw `children` markup.
pub fn sub_components(components: &[(&str, &str)], children: &str) -> String {
    let entries: String = components
        .iter()
        .map(|(name, kind)| format!(r#"<entry key="{name}" value="{kind}"/>"#))
        .collect();
    format!(
        r#"<map>
             <entry key="exit_code" value="SUCCESS"/>
             <entry key="properties"><map>{entries}</map></entry>
             {children}
           </map>"#
    )
}

/// Raw `children` markup for web modules and their `moduleInfo` property.
pub fn module_children(modules: &[(&str, &str)]) -> String {
    let maps: String = modules
        .iter()
        .map(|(name, module_info)| {
            format!(
                r#"<map>
                     <entry key="message" value="{name}"/>
                     <entry key="properties">
                       <map><entry key="moduleInfo" value="{module_info}"/></map>
                     </entry>
                   </map>"#
            )
        })
        .collect();
    format!(r#"<entry key="children"><list>{maps}</list></entry>"#)
}

/// Mount a GET mock for a management resource.
pub async fn mock_get(server: &MockServer, resource: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("{BASE}{resource}")))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/xml"))
        .mount(server)
        .await;
}

/// Mount a GET mock for a management resource with query parameters.
pub async fn mock_get_query(
    server: &MockServer,
    resource: &str,
    params: &[(&str, &str)],
    body: String,
) {
    let mut mock = Mock::given(method("GET")).and(path(format!("{BASE}{resource}")));
    for (key, value) in params {
        mock = mock.and(query_param(*key, *value));
    }
    mock.respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/xml"))
        .mount(server)
        .await;
}

/// Mount a GET mock that must never be called.
pub async fn mock_get_never(server: &MockServer, resource: &str) {
    Mock::given(method("GET"))
        .and(path(format!("{BASE}{resource}")))
        .respond_with(ResponseTemplate::new(200).set_body_raw(envelope(""), "application/xml"))
        .expect(0)
        .mount(server)
        .await;
}
