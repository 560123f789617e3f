mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn root_reports_service_info() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::get(format!("{}/", server.base_url)).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let payload = res.json::<serde_json::Value>().await?;
    assert_eq!(payload["code"], 200);
    assert_eq!(payload["data"]["name"], "Home Inventory API");
    assert!(payload["timestamp"].is_i64(), "missing timestamp: {}", payload);
    Ok(())
}

#[tokio::test]
async fn health_uses_the_envelope_either_way() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::get(format!("{}/health", server.base_url)).await?;
    let status = res.status();
    let payload = res.json::<serde_json::Value>().await?;

    match status {
        StatusCode::OK => {
            assert_eq!(payload["data"]["status"], "ok");
            assert!(payload.get("error").is_none());
        }
        StatusCode::SERVICE_UNAVAILABLE => {
            assert_eq!(payload["code"], 503);
            assert_eq!(payload["data"]["status"], "degraded");
            assert_eq!(payload["error"]["type"], "SERVICE_UNAVAILABLE");
        }
        other => panic!("unexpected status {}: {}", other, payload),
    }
    Ok(())
}
