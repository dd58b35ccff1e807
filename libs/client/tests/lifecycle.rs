//! DAS reachability probing and start-up error framing.

mod support;

use anyhow::Result;
use gfkit_client::{ClientError, GlassFishClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::*;

#[tokio::test]
async fn test_is_das_running_against_live_das() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(BASE))
        .respond_with(ResponseTemplate::new(200).set_body_raw(envelope(""), "application/xml"))
        .mount(&server)
        .await;

    let client = GlassFishClient::new(config_for(&server))?;
    assert!(client.is_das_running().await?);
    Ok(())
}

#[tokio::test]
async fn test_is_das_running_is_false_when_connection_is_refused() -> Result<()> {
    let server = MockServer::start().await;
    let config = config_for(&server);
    // Shut the mock down so the port refuses connections.
    drop(server);

    let client = GlassFishClient::new(config)?;
    assert!(!client.is_das_running().await?);
    Ok(())
}

#[tokio::test]
async fn test_start_up_frames_transport_failure_as_das_unreachable() -> Result<()> {
    let server = MockServer::start().await;
    let mut config = config_for(&server);
    config.target = "inst1".to_string();
    drop(server);

    let client = GlassFishClient::new(config)?;
    match client.start_up().await {
        Err(ClientError::DasUnreachable { url, .. }) => {
            assert!(url.ends_with("/management/domain"));
        }
        other => panic!("expected DasUnreachable, got {other:?}"),
    }
    Ok(())
}
