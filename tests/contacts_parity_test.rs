use anyhow::Result;
use contact_doctor::core::contacts::ContactsCheck;
use contact_doctor::{BackendClient, CheckStatus, CheckSuite, TomlConfig};
use httpmock::prelude::*;
use std::sync::Arc;

fn client_for(server: &MockServer) -> Arc<BackendClient> {
    let toml_content = format!(
        r#"
[backend]
base_url = "{}"
anon_key = "test-anon-key"
"#,
        server.url("")
    );
    let config = TomlConfig::from_toml_str(&toml_content).unwrap();
    Arc::new(BackendClient::from_config(&config).unwrap())
}

async fn run_contacts_check(server: &MockServer) -> Result<contact_doctor::CheckReport> {
    let client = client_for(server);

    let mut suite = CheckSuite::new("parity-test".to_string());
    suite.add_check(Box::new(ContactsCheck::new(
        client,
        "contacts".to_string(),
        "get_user_contacts".to_string(),
    )));

    let mut reports = suite.run_all().await?;
    Ok(reports.remove(0))
}

/// 資料表直查和 RPC 回傳一致 → 通過
#[tokio::test]
async fn test_table_and_rpc_agree() -> Result<()> {
    let server = MockServer::start();

    let rows = serde_json::json!([
        {"id": 1, "full_name": "Alice"},
        {"id": 2, "full_name": "Bob"},
        {"id": 3, "full_name": "Carol"}
    ]);

    let table_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/contacts")
            .query_param("select", "*");
        then.status(200).json_body(rows.clone());
    });

    let rpc_mock = server.mock(|when, then| {
        when.method(POST).path("/rest/v1/rpc/get_user_contacts");
        then.status(200).json_body(rows);
    });

    let report = run_contacts_check(&server).await?;

    table_mock.assert();
    rpc_mock.assert();

    assert_eq!(report.status, CheckStatus::Passed);
    assert_eq!(report.records.len(), 3);
    assert_eq!(
        report.metadata.get("parity").unwrap(),
        &serde_json::Value::Bool(true)
    );
    assert_eq!(
        report.metadata.get("direct_count").unwrap(),
        &serde_json::Value::Number(3.into())
    );
    assert_eq!(
        report.metadata.get("rpc_count").unwrap(),
        &serde_json::Value::Number(3.into())
    );

    Ok(())
}

/// RPC 少了一列 → 警告並點名缺的 id
#[tokio::test]
async fn test_row_mismatch_is_warning() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/contacts");
        then.status(200).json_body(serde_json::json!([
            {"id": 1, "full_name": "Alice"},
            {"id": 2, "full_name": "Bob"}
        ]));
    });

    server.mock(|when, then| {
        when.method(POST).path("/rest/v1/rpc/get_user_contacts");
        then.status(200).json_body(serde_json::json!([
            {"id": 1, "full_name": "Alice"}
        ]));
    });

    let report = run_contacts_check(&server).await?;

    assert_eq!(report.status, CheckStatus::Warning);
    assert_eq!(
        report.metadata.get("parity").unwrap(),
        &serde_json::Value::Bool(false)
    );
    assert!(report
        .details
        .iter()
        .any(|line| line.contains("Ids missing from RPC: 2")));

    Ok(())
}

/// RPC 失敗（函式不存在）→ 警告，但直查的資料列還是回報
#[tokio::test]
async fn test_rpc_failure_keeps_direct_rows() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/contacts");
        then.status(200).json_body(serde_json::json!([
            {"id": 1, "full_name": "Alice"}
        ]));
    });

    server.mock(|when, then| {
        when.method(POST).path("/rest/v1/rpc/get_user_contacts");
        then.status(404).json_body(serde_json::json!({
            "message": "function public.get_user_contacts does not exist"
        }));
    });

    let report = run_contacts_check(&server).await?;

    assert_eq!(report.status, CheckStatus::Warning);
    assert_eq!(report.records.len(), 1);
    assert!(report.details.iter().any(|line| line.contains("RPC")));

    Ok(())
}

/// 資料表直查就失敗 → 整個檢查失敗
#[tokio::test]
async fn test_direct_query_failure_fails_check() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/contacts");
        then.status(401).body("permission denied");
    });

    let report = run_contacts_check(&server).await?;

    assert_eq!(report.status, CheckStatus::Failed);
    assert!(report.details.iter().any(|line| line.contains("401")));

    Ok(())
}
