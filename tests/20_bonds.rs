mod common;

use anyhow::{Context, Result};
use common::{bond_body, TestServer};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

async fn create_bond(server: &TestServer, token: &str, body: &Value) -> Result<i64> {
    let (status, created) = server.send(Method::POST, token, "/api/bond/", body).await?;
    anyhow::ensure!(status == StatusCode::CREATED, "create failed: {} {}", status, created);
    created["data"]["id"].as_i64().context("created bond has no id")
}

#[tokio::test]
async fn create_list_and_retrieve() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.access_token("owner@example.com").await?;

    let (status, body) = server
        .send(Method::POST, &token, "/api/bond/", &bond_body("Apple 2030", "US0378331005", "1000"))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let bond = &body["data"];
    assert_eq!(bond["value"], "1000.00");
    assert_eq!(bond["interest_rate"], "5.00");
    assert_eq!(bond["is_active"], true);
    assert!(bond["future_value"].is_string());
    let id = bond["id"].as_i64().context("missing id")?;

    let (status, list) = server.get(&token, "/api/bond/").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["data"].as_array().map(Vec::len), Some(1));

    let (status, one) = server.get(&token, &format!("/api/bond/{}/", id)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one["data"]["isin"], "US0378331005");
    Ok(())
}

#[tokio::test]
async fn other_users_bonds_are_invisible() -> Result<()> {
    let server = TestServer::spawn().await?;
    let alice = server.access_token("alice@example.com").await?;
    let mallory = server.access_token("mallory@example.com").await?;

    let id = create_bond(&server, &alice, &bond_body("Mine", "CZ0003551251", "500")).await?;

    let (status, list) = server.get(&mallory, "/api/bond/").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["data"], json!([]));

    let path = format!("/api/bond/{}/", id);
    let (status, _) = server.get(&mallory, &path).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server
        .send(Method::PATCH, &mallory, &path, &json!({"name": "Stolen"}))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server.send(Method::DELETE, &mallory, &path, &json!({})).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn invalid_payload_reports_each_field() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.access_token("v@example.com").await?;

    let body = json!({
        "name": "  ",
        "isin": "US0378331006",
        "value": "-5",
        "interest_rate": "150",
        "purchase_date": "2024-01-01",
        "maturity_date": "2023-01-01",
        "interest_payment_frequency": "Annually"
    });
    let (status, err) = server.send(Method::POST, &token, "/api/bond/", &body).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "VALIDATION_ERROR");
    for field in ["name", "value", "interest_rate", "maturity_date"] {
        assert!(err["field_errors"][field].is_string(), "missing error for {}", field);
    }
    Ok(())
}

#[tokio::test]
async fn bad_check_digit_is_an_isin_error() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.access_token("isin@example.com").await?;

    let (status, err) = server
        .send(Method::POST, &token, "/api/bond/", &bond_body("Typo", "US0378331006", "100"))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["field_errors"]["isin"].is_string());
    Ok(())
}

#[tokio::test]
async fn duplicate_isin_is_rejected_across_users() -> Result<()> {
    let server = TestServer::spawn().await?;
    let a = server.access_token("a@example.com").await?;
    let b = server.access_token("b@example.com").await?;

    create_bond(&server, &a, &bond_body("First", "DE0001102580", "100")).await?;

    let (status, err) = server
        .send(Method::POST, &b, "/api/bond/", &bond_body("Second", "DE0001102580", "100"))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["field_errors"]["isin"].is_string());
    Ok(())
}

#[tokio::test]
async fn put_requires_full_record_and_patch_merges() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.access_token("edit@example.com").await?;
    let id = create_bond(&server, &token, &bond_body("Edit me", "XS2314659447", "1000")).await?;
    let path = format!("/api/bond/{}/", id);

    let (status, err) = server.send(Method::PUT, &token, &path, &json!({"name": "Partial"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["field_errors"]["isin"].is_string());

    let (status, body) = server
        .send(Method::PATCH, &token, &path, &json!({"value": 1250.5}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["value"], "1250.50");
    assert_eq!(body["data"]["name"], "Edit me");

    let mut full = bond_body("Renamed", "XS2314659447", "900");
    full["interest_rate"] = json!("3.25");
    let (status, body) = server.send(Method::PUT, &token, &path, &full).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Renamed");
    assert_eq!(body["data"]["interest_rate"], "3.25");
    Ok(())
}

#[tokio::test]
async fn delete_deactivates_unless_forced() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.access_token("del@example.com").await?;

    let soft = create_bond(&server, &token, &bond_body("Soft", "CZ0001007306", "100")).await?;
    let hard = create_bond(&server, &token, &bond_body("Hard", "CZ0001005037", "100")).await?;

    let (status, body) = server
        .send(Method::DELETE, &token, &format!("/api/bond/{}/", soft), &json!({}))
        .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = server.get(&token, &format!("/api/bond/{}/", soft)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Inactive rows still hold their ISIN
    let (status, _) = server
        .send(Method::POST, &token, "/api/bond/", &bond_body("Again", "CZ0001007306", "100"))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .send(Method::DELETE, &token, &format!("/api/bond/{}/?force=true", hard), &json!({}))
        .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // A purged ISIN is free again
    create_bond(&server, &token, &bond_body("Reused", "CZ0001005037", "100")).await?;
    Ok(())
}

#[tokio::test]
async fn non_numeric_id_is_404() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.access_token("id@example.com").await?;

    let (status, body) = server.get(&token, "/api/bond/abc/").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn empty_portfolio_analysis() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.access_token("empty@example.com").await?;

    let (status, body) = server.get(&token, "/api/bond/analysis/").await?;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["average_interest_rate"], Value::Null);
    assert_eq!(data["nearest_maturity_bond"], Value::Null);
    assert_eq!(data["total_value"], "0.00");
    assert_eq!(data["future_value"], "0.00");
    Ok(())
}

#[tokio::test]
async fn analysis_follows_writes() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.access_token("analysis@example.com").await?;

    let mut early = bond_body("Early", "US0378331005", "1000");
    early["maturity_date"] = json!("2028-06-30");
    early["interest_rate"] = json!("4.00");
    let early_id = create_bond(&server, &token, &early).await?;

    let mut late = bond_body("Late", "DE0001102580", "2000");
    late["interest_rate"] = json!("6.00");
    create_bond(&server, &token, &late).await?;

    let (status, body) = server.get(&token, "/api/bond/analysis/").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_value"], "3000.00");
    assert_eq!(body["data"]["average_interest_rate"], json!(5.0));
    assert_eq!(body["data"]["nearest_maturity_bond"]["id"], json!(early_id));

    // Deactivation must be reflected immediately, not after the cache TTL
    let (status, _) = server
        .send(Method::DELETE, &token, &format!("/api/bond/{}/", early_id), &json!({}))
        .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = server.get(&token, "/api/bond/analysis/").await?;
    assert_eq!(body["data"]["total_value"], "2000.00");
    assert_eq!(body["data"]["average_interest_rate"], json!(6.0));
    assert_eq!(body["data"]["nearest_maturity_bond"]["name"], "Late");
    Ok(())
}
