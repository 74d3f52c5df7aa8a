use anyhow::Result;
use chrono::NaiveDate;
use contact_doctor::core::birthdays::BirthdayCheck;
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

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, 20).unwrap()
}

/// 單獨跑生日檢查時自己去抓聯絡人
#[tokio::test]
async fn test_standalone_birthday_check_fetches_contacts() -> Result<()> {
    let server = MockServer::start();

    let contacts_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/contacts")
            .query_param("select", "*");
        then.status(200).json_body(serde_json::json!([
            {"id": 1, "full_name": "Alice", "birth_date": "1990-10-21"},
            {"id": 2, "full_name": "Bob", "birth_date": "1985-01-15"}
        ]));
    });

    let mut suite = CheckSuite::new("birthday-standalone".to_string());
    suite.add_check(Box::new(BirthdayCheck::new(
        client_for(&server),
        "contacts".to_string(),
        reference_date(),
        30,
    )));

    let reports = suite.run_all().await?;

    contacts_mock.assert();
    let report = &reports[0];
    assert_eq!(report.status, CheckStatus::Passed);
    assert_eq!(
        report.metadata.get("next_birthday_contact").unwrap(),
        &serde_json::Value::String("Alice".to_string())
    );
    assert_eq!(
        report.metadata.get("next_birthday_days").unwrap(),
        &serde_json::Value::Number(1.into())
    );
    // 1985-01-15 已過 → 滾到 2025-01-15，離參考日 87 天
    let bob = report
        .records
        .iter()
        .find(|r| r.get_str("full_name") == Some("Bob"))
        .unwrap();
    assert_eq!(bob.get_i64("days_until_birthday"), Some(87));

    Ok(())
}

/// 生日檢查跟在聯絡人檢查後面時重用其資料列
#[tokio::test]
async fn test_birthday_check_reuses_contact_rows() -> Result<()> {
    let server = MockServer::start();

    let rows = serde_json::json!([
        {"id": 1, "full_name": "Alice", "birth_date": "1990-10-27"},
        {"id": 2, "full_name": "Bob", "birth_date": "bad-date"}
    ]);

    let contacts_mock = server.mock(|when, then| {
        when.method(GET).path("/rest/v1/contacts");
        then.status(200).json_body(rows.clone());
    });

    let rpc_mock = server.mock(|when, then| {
        when.method(POST).path("/rest/v1/rpc/get_user_contacts");
        then.status(200).json_body(rows);
    });

    let client = client_for(&server);
    let mut suite = CheckSuite::new("birthday-chained".to_string());
    suite.add_check(Box::new(ContactsCheck::new(
        client.clone(),
        "contacts".to_string(),
        "get_user_contacts".to_string(),
    )));
    suite.add_check(Box::new(BirthdayCheck::new(
        client,
        "contacts".to_string(),
        reference_date(),
        30,
    )));

    let reports = suite.run_all().await?;

    // 資料表只被查一次
    contacts_mock.assert();
    rpc_mock.assert();

    let birthday_report = &reports[1];
    // Bob 的生日格式錯誤 → 警告 + 計數
    assert_eq!(birthday_report.status, CheckStatus::Warning);
    assert_eq!(
        birthday_report.metadata.get("malformed_birth_dates").unwrap(),
        &serde_json::Value::Number(1.into())
    );
    assert_eq!(
        birthday_report.metadata.get("next_birthday_days").unwrap(),
        &serde_json::Value::Number(7.into())
    );

    Ok(())
}

/// 生日當天的聯絡人要報 0 天
#[tokio::test]
async fn test_birthday_today_counts_zero() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/contacts");
        then.status(200).json_body(serde_json::json!([
            {"id": 1, "full_name": "Alice", "birth_date": "1990-10-20"}
        ]));
    });

    let mut suite = CheckSuite::new("birthday-today".to_string());
    suite.add_check(Box::new(BirthdayCheck::new(
        client_for(&server),
        "contacts".to_string(),
        reference_date(),
        30,
    )));

    let reports = suite.run_all().await?;

    let report = &reports[0];
    assert_eq!(
        report.metadata.get("next_birthday_days").unwrap(),
        &serde_json::Value::Number(0.into())
    );
    assert!(report.details[0].contains("today"));

    Ok(())
}
