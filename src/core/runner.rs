use crate::domain::model::{CheckReport, CheckStatus, Record};
use crate::utils::error::{DiagError, Result};
use crate::utils::monitor::SystemMonitor;
use std::collections::HashMap;
use std::time::Instant;

/// 檢查執行上下文，用於在檢查之間傳遞資料（token、查回的資料列）
#[derive(Debug, Clone, Default)]
pub struct CheckContext {
    pub reports: Vec<CheckReport>,
    pub shared_data: HashMap<String, serde_json::Value>,
    pub execution_id: String,
    check_records: HashMap<String, Vec<Record>>,
}

impl CheckContext {
    pub fn new(execution_id: String) -> Self {
        Self {
            execution_id,
            ..Default::default()
        }
    }

    /// 取得最後一個完成的檢查報告
    pub fn last_report(&self) -> Option<&CheckReport> {
        self.reports.last()
    }

    /// 依名稱取得檢查報告
    pub fn report_for(&self, name: &str) -> Option<&CheckReport> {
        self.reports.iter().find(|r| r.check_name == name)
    }

    /// 依名稱取得某個檢查發佈的資料列
    pub fn records_of(&self, name: &str) -> Option<&Vec<Record>> {
        self.check_records.get(name)
    }

    pub fn add_shared_data(&mut self, key: String, value: serde_json::Value) {
        self.shared_data.insert(key, value);
    }

    pub fn get_shared_data(&self, key: &str) -> Option<&serde_json::Value> {
        self.shared_data.get(key)
    }

    /// 登入檢查發佈的 access token，下游檢查用它發認證請求
    pub fn access_token(&self) -> Option<&str> {
        self.get_shared_data("access_token").and_then(|v| v.as_str())
    }

    pub fn add_report(&mut self, report: CheckReport) {
        self.check_records
            .insert(report.check_name.clone(), report.records.clone());

        // token 之類的共享值由檢查寫進 metadata 的 shared.* 鍵發佈
        for (key, value) in &report.metadata {
            if let Some(shared_key) = key.strip_prefix("shared.") {
                self.shared_data
                    .insert(shared_key.to_string(), value.clone());
            }
        }

        self.reports.push(report);
    }
}

/// 單一診斷檢查的介面
#[async_trait::async_trait]
pub trait Check: Send + Sync {
    fn name(&self) -> &str;

    /// 根據上下文決定是否執行（例如沒有帳密就跳過登入檢查）
    fn should_run(&self, _context: &CheckContext) -> bool {
        true
    }

    async fn run(&self, context: &CheckContext) -> Result<CheckReport>;
}

/// 檢查序列，依序執行並收集所有報告。
/// 預設失敗不中斷：診斷工具要給出完整的健康圖像。
pub struct CheckSuite {
    checks: Vec<Box<dyn Check>>,
    monitor: Option<SystemMonitor>,
    monitor_enabled: bool,
    halt_on_failure: bool,
    execution_id: String,
}

impl CheckSuite {
    pub fn new(execution_id: String) -> Self {
        Self {
            checks: Vec::new(),
            monitor: None,
            monitor_enabled: false,
            halt_on_failure: false,
            execution_id,
        }
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor_enabled = enabled;
        if enabled {
            self.monitor = Some(SystemMonitor::new(enabled));
        }
        self
    }

    /// 任一檢查失敗就中止，行為等同原本手動逐個跑腳本
    pub fn with_halt_on_failure(mut self, halt: bool) -> Self {
        self.halt_on_failure = halt;
        self
    }

    pub fn add_check(&mut self, check: Box<dyn Check>) {
        self.checks.push(check);
    }

    pub async fn run_all(&mut self) -> Result<Vec<CheckReport>> {
        let mut context = CheckContext::new(self.execution_id.clone());

        if self.monitor_enabled {
            if let Some(monitor) = &self.monitor {
                monitor.log_stats("Check suite started");
            }
        }

        for check in &self.checks {
            if !check.should_run(&context) {
                tracing::info!("⏭️ Skipping check: {} (condition not met)", check.name());
                let report = CheckReport::new(check.name()).with_status(CheckStatus::Skipped);
                context.add_report(report);
                continue;
            }

            let start_time = Instant::now();

            match check.run(&context).await {
                Ok(mut report) => {
                    report.duration = start_time.elapsed();
                    tracing::info!(
                        "{} Check finished: {} ({:?})",
                        report.status.symbol(),
                        report.check_name,
                        report.duration
                    );
                    context.add_report(report);
                }
                Err(e) => {
                    tracing::error!("❌ Check failed: {}: {}", check.name(), e);
                    tracing::error!("💡 {}", e.recovery_suggestion());

                    if self.halt_on_failure {
                        return Err(DiagError::CheckError {
                            check: check.name().to_string(),
                            details: e.to_string(),
                        });
                    }

                    let mut report =
                        CheckReport::new(check.name()).with_status(CheckStatus::Failed);
                    report.duration = start_time.elapsed();
                    report.details.push(e.to_string());
                    report.details.push(e.recovery_suggestion());
                    context.add_report(report);
                }
            }
        }

        if self.monitor_enabled {
            if let Some(monitor) = &self.monitor {
                monitor.log_stats("Check suite completed");
            }
        }

        Ok(context.reports)
    }

    /// 執行摘要
    pub fn get_execution_summary(reports: &[CheckReport]) -> HashMap<String, serde_json::Value> {
        let mut summary = HashMap::new();

        let count_with = |status: CheckStatus| {
            reports.iter().filter(|r| r.status == status).count()
        };

        let total_duration: std::time::Duration = reports.iter().map(|r| r.duration).sum();

        summary.insert(
            "total_checks".to_string(),
            serde_json::Value::Number(reports.len().into()),
        );
        summary.insert(
            "passed".to_string(),
            serde_json::Value::Number(count_with(CheckStatus::Passed).into()),
        );
        summary.insert(
            "warnings".to_string(),
            serde_json::Value::Number(count_with(CheckStatus::Warning).into()),
        );
        summary.insert(
            "failed".to_string(),
            serde_json::Value::Number(count_with(CheckStatus::Failed).into()),
        );
        summary.insert(
            "skipped".to_string(),
            serde_json::Value::Number(count_with(CheckStatus::Skipped).into()),
        );
        summary.insert(
            "total_duration_ms".to_string(),
            serde_json::Value::Number((total_duration.as_millis() as u64).into()),
        );

        let executed: Vec<serde_json::Value> = reports
            .iter()
            .map(|r| serde_json::Value::String(r.check_name.clone()))
            .collect();
        summary.insert("executed_checks".to_string(), serde_json::Value::Array(executed));

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Record;

    struct MockCheck {
        name: String,
        should_run: bool,
        outcome: MockOutcome,
        publish_token: bool,
    }

    enum MockOutcome {
        Pass(Vec<Record>),
        Fail,
    }

    impl MockCheck {
        fn passing(name: &str) -> Self {
            Self {
                name: name.to_string(),
                should_run: true,
                outcome: MockOutcome::Pass(Vec::new()),
                publish_token: false,
            }
        }

        fn with_records(mut self, records: Vec<Record>) -> Self {
            self.outcome = MockOutcome::Pass(records);
            self
        }

        fn with_should_run(mut self, should_run: bool) -> Self {
            self.should_run = should_run;
            self
        }

        fn failing(name: &str) -> Self {
            Self {
                name: name.to_string(),
                should_run: true,
                outcome: MockOutcome::Fail,
                publish_token: false,
            }
        }

        fn publishing_token(mut self) -> Self {
            self.publish_token = true;
            self
        }
    }

    #[async_trait::async_trait]
    impl Check for MockCheck {
        fn name(&self) -> &str {
            &self.name
        }

        fn should_run(&self, _context: &CheckContext) -> bool {
            self.should_run
        }

        async fn run(&self, _context: &CheckContext) -> Result<CheckReport> {
            match &self.outcome {
                MockOutcome::Pass(records) => {
                    let mut report = CheckReport::new(&self.name);
                    report.records = records.clone();
                    if self.publish_token {
                        report = report.meta(
                            "shared.access_token",
                            serde_json::Value::String("tok-abc".to_string()),
                        );
                    }
                    Ok(report)
                }
                MockOutcome::Fail => Err(DiagError::CheckError {
                    check: self.name.clone(),
                    details: "boom".to_string(),
                }),
            }
        }
    }

    fn contact_record(id: i64, name: &str) -> Record {
        Record::from_value(serde_json::json!({"id": id, "full_name": name}))
    }

    #[tokio::test]
    async fn test_context_shared_data() {
        let mut context = CheckContext::new("test".to_string());

        context.add_shared_data(
            "key1".to_string(),
            serde_json::Value::String("value1".to_string()),
        );

        assert_eq!(
            context.get_shared_data("key1").unwrap(),
            &serde_json::Value::String("value1".to_string())
        );
        assert!(context.get_shared_data("nonexistent").is_none());
    }

    #[tokio::test]
    async fn test_report_publishes_shared_metadata() {
        let mut context = CheckContext::new("test".to_string());

        let report = CheckReport::new("auth").meta(
            "shared.access_token",
            serde_json::Value::String("tok-abc".to_string()),
        );
        context.add_report(report);

        assert_eq!(context.access_token(), Some("tok-abc"));
    }

    #[tokio::test]
    async fn test_suite_runs_checks_in_order() {
        let mut suite = CheckSuite::new("ordered".to_string());
        suite.add_check(Box::new(
            MockCheck::passing("first").with_records(vec![contact_record(1, "Alice")]),
        ));
        suite.add_check(Box::new(MockCheck::passing("second")));

        let reports = suite.run_all().await.unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].check_name, "first");
        assert_eq!(reports[1].check_name, "second");
        assert_eq!(reports[0].records.len(), 1);
    }

    #[tokio::test]
    async fn test_suite_records_skipped_checks() {
        let mut suite = CheckSuite::new("skipping".to_string());
        suite.add_check(Box::new(MockCheck::passing("runs")));
        suite.add_check(Box::new(
            MockCheck::passing("gated").with_should_run(false),
        ));

        let reports = suite.run_all().await.unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].status, CheckStatus::Skipped);
    }

    #[tokio::test]
    async fn test_suite_continues_after_failure() {
        let mut suite = CheckSuite::new("resilient".to_string());
        suite.add_check(Box::new(MockCheck::failing("broken")));
        suite.add_check(Box::new(MockCheck::passing("still-runs")));

        let reports = suite.run_all().await.unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].status, CheckStatus::Failed);
        assert!(!reports[0].details.is_empty());
        assert_eq!(reports[1].status, CheckStatus::Passed);
    }

    #[tokio::test]
    async fn test_suite_halt_on_failure() {
        let mut suite = CheckSuite::new("strict".to_string()).with_halt_on_failure(true);
        suite.add_check(Box::new(MockCheck::failing("broken")));
        suite.add_check(Box::new(MockCheck::passing("never-runs")));

        let result = suite.run_all().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_token_flows_between_checks() {
        let mut suite = CheckSuite::new("token-flow".to_string());
        suite.add_check(Box::new(MockCheck::passing("auth").publishing_token()));

        let reports = suite.run_all().await.unwrap();
        assert_eq!(reports.len(), 1);

        // 重建 context 驗證 token 確實被發佈
        let mut context = CheckContext::new("verify".to_string());
        context.add_report(reports[0].clone());
        assert_eq!(context.access_token(), Some("tok-abc"));
    }

    #[test]
    fn test_execution_summary() {
        let mut passed = CheckReport::new("connectivity");
        passed.duration = std::time::Duration::from_millis(100);

        let mut failed = CheckReport::new("auth").with_status(CheckStatus::Failed);
        failed.duration = std::time::Duration::from_millis(200);

        let skipped = CheckReport::new("contacts").with_status(CheckStatus::Skipped);

        let summary = CheckSuite::get_execution_summary(&[passed, failed, skipped]);

        assert_eq!(
            summary.get("total_checks").unwrap(),
            &serde_json::Value::Number(3.into())
        );
        assert_eq!(
            summary.get("passed").unwrap(),
            &serde_json::Value::Number(1.into())
        );
        assert_eq!(
            summary.get("failed").unwrap(),
            &serde_json::Value::Number(1.into())
        );
        assert_eq!(
            summary.get("skipped").unwrap(),
            &serde_json::Value::Number(1.into())
        );
        assert_eq!(
            summary.get("total_duration_ms").unwrap(),
            &serde_json::Value::Number(300.into())
        );

        let executed = summary.get("executed_checks").unwrap().as_array().unwrap();
        assert_eq!(executed.len(), 3);
        assert_eq!(executed[0], serde_json::Value::String("connectivity".to_string()));
    }
}
