use chrono::NaiveDate;
use clap::Parser;
use contact_doctor::core::auth::AuthCheck;
use contact_doctor::core::birthdays::BirthdayCheck;
use contact_doctor::core::connectivity::ConnectivityCheck;
use contact_doctor::core::contacts::ContactsCheck;
use contact_doctor::core::session::SessionCheck;
use contact_doctor::core::ConfigProvider;
use contact_doctor::utils::{logger, validation::Validate};
use contact_doctor::{
    BackendClient, CheckStatus, CheckSuite, CliConfig, DiagError, LocalStorage, TomlConfig,
};
use std::sync::Arc;

/// 兩種配置來源（CLI 旗標 / TOML 檔）收斂後的執行計畫
struct SuitePlan {
    contacts_table: String,
    rpc_function: String,
    email: Option<String>,
    password: Option<String>,
    session_path: String,
    session_file: String,
    checks: Vec<String>,
    halt_on_failure: bool,
    upcoming_window_days: i64,
    monitor: bool,
}

fn assemble_suite(client: Arc<BackendClient>, plan: &SuitePlan, today: NaiveDate) -> CheckSuite {
    let mut suite = CheckSuite::new(format!("contact-doctor-{}", today))
        .with_monitoring(plan.monitor)
        .with_halt_on_failure(plan.halt_on_failure);

    for check_name in &plan.checks {
        match check_name.as_str() {
            "connectivity" => {
                suite.add_check(Box::new(ConnectivityCheck::new(client.clone())));
            }
            "auth" => {
                suite.add_check(Box::new(AuthCheck::new(
                    client.clone(),
                    plan.email.clone(),
                    plan.password.clone(),
                )));
            }
            "contacts" => {
                suite.add_check(Box::new(ContactsCheck::new(
                    client.clone(),
                    plan.contacts_table.clone(),
                    plan.rpc_function.clone(),
                )));
            }
            "session" => {
                let storage = LocalStorage::new(plan.session_path.clone());
                suite.add_check(Box::new(SessionCheck::new(
                    storage,
                    plan.session_file.clone(),
                )));
            }
            "birthdays" => {
                suite.add_check(Box::new(BirthdayCheck::new(
                    client.clone(),
                    plan.contacts_table.clone(),
                    today,
                    plan.upcoming_window_days,
                )));
            }
            // 配置驗證已擋掉未知名稱
            other => tracing::warn!("Unknown check name ignored: {}", other),
        }
    }

    suite
}

fn exit_code_for(e: &DiagError) -> i32 {
    match e.severity() {
        contact_doctor::utils::error::ErrorSeverity::Low => 0,
        contact_doctor::utils::error::ErrorSeverity::Medium => 2,
        contact_doctor::utils::error::ErrorSeverity::High => 1,
        contact_doctor::utils::error::ErrorSeverity::Critical => 3,
    }
}

fn fail(e: DiagError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code_for(&e).max(1));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting contact-doctor");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 當天零點為所有生日倒數的參考日期
    let today = chrono::Local::now().date_naive();

    let (client, plan) = match &cli.config {
        Some(path) => {
            // TOML 驅動：帳密、金鑰經環境變數替換後進來
            let toml = match TomlConfig::from_file(path) {
                Ok(toml) => toml,
                Err(e) => fail(e),
            };
            if let Err(e) = toml.validate() {
                fail(e);
            }

            let client = match BackendClient::from_config(&toml) {
                Ok(client) => Arc::new(client),
                Err(e) => fail(e),
            };

            let plan = SuitePlan {
                contacts_table: toml.contacts_table().to_string(),
                rpc_function: toml.rpc_function().to_string(),
                email: toml.email(),
                password: toml.password(),
                session_path: toml.session_path().to_string(),
                session_file: toml.session_file().to_string(),
                checks: toml.checks_to_run(),
                halt_on_failure: toml.halt_on_failure(),
                upcoming_window_days: toml.upcoming_window_days(),
                monitor: cli.monitor || toml.monitoring_enabled(),
            };
            (client, plan)
        }
        None => {
            if let Err(e) = cli.validate() {
                fail(e);
            }

            let client = match BackendClient::from_config(&cli) {
                Ok(client) => Arc::new(client),
                Err(e) => fail(e),
            };

            let plan = SuitePlan {
                contacts_table: cli.contacts_table.clone(),
                rpc_function: cli.rpc_function.clone(),
                email: cli.email.clone(),
                password: cli.password.clone(),
                session_path: cli.session_path.clone(),
                session_file: cli.session_file.clone(),
                checks: cli.checks.clone(),
                halt_on_failure: cli.halt_on_failure,
                upcoming_window_days: cli.upcoming_window_days,
                monitor: cli.monitor,
            };
            (client, plan)
        }
    };

    if plan.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let mut suite = assemble_suite(client, &plan, today);

    match suite.run_all().await {
        Ok(reports) => {
            println!("\n📋 Diagnosis for {}:", today);
            for report in &reports {
                println!(
                    "  {} {} ({:?})",
                    report.status.symbol(),
                    report.check_name,
                    report.duration
                );
                for line in &report.details {
                    println!("      {}", line);
                }
            }

            let summary = CheckSuite::get_execution_summary(&reports);
            println!(
                "📈 {} checks: {} passed, {} warnings, {} failed, {} skipped",
                summary.get("total_checks").and_then(|v| v.as_u64()).unwrap_or(0),
                summary.get("passed").and_then(|v| v.as_u64()).unwrap_or(0),
                summary.get("warnings").and_then(|v| v.as_u64()).unwrap_or(0),
                summary.get("failed").and_then(|v| v.as_u64()).unwrap_or(0),
                summary.get("skipped").and_then(|v| v.as_u64()).unwrap_or(0),
            );

            let failed = reports
                .iter()
                .any(|r| r.status == CheckStatus::Failed);
            if failed {
                eprintln!("❌ Some checks failed, see details above");
                std::process::exit(1);
            }
            println!("✅ Backend looks healthy");
        }
        Err(e) => fail(e),
    }

    Ok(())
}
