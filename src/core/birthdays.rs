use crate::core::api::BackendClient;
use crate::core::contacts::ContactsCheck;
use crate::core::runner::{Check, CheckContext};
use crate::domain::birthday::{next_birthday, try_days_until_birthday};
use crate::domain::model::{CheckReport, CheckStatus, Contact, Record};
use crate::utils::error::Result;
use chrono::NaiveDate;
use std::sync::Arc;

/// 生日倒數檢查：對每個聯絡人算出距離下次生日的天數。
///
/// 參考日期由呼叫端注入（已正規化到當天零點），計算本身不碰時鐘。
pub struct BirthdayCheck {
    client: Arc<BackendClient>,
    table: String,
    today: NaiveDate,
    upcoming_window_days: i64,
}

impl BirthdayCheck {
    pub const NAME: &'static str = "birthdays";

    pub fn new(
        client: Arc<BackendClient>,
        table: String,
        today: NaiveDate,
        upcoming_window_days: i64,
    ) -> Self {
        Self {
            client,
            table,
            today,
            upcoming_window_days,
        }
    }

    async fn contact_rows(&self, context: &CheckContext) -> Result<Vec<Record>> {
        // 聯絡人檢查跑過就直接用它發佈的資料列，不重複打後端
        if let Some(rows) = context.records_of(ContactsCheck::NAME) {
            return Ok(rows.clone());
        }
        self.client
            .select(&self.table, "select=*", context.access_token())
            .await
    }
}

#[async_trait::async_trait]
impl Check for BirthdayCheck {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&self, context: &CheckContext) -> Result<CheckReport> {
        let rows = self.contact_rows(context).await?;

        let mut soonest: Option<(String, i64, NaiveDate)> = None;
        let mut upcoming = 0usize;
        let mut malformed = 0usize;
        let mut without_date = 0usize;
        let mut countdowns = Vec::new();

        for row in &rows {
            let Some(contact) = Contact::from_record(row) else {
                without_date += 1;
                continue;
            };

            let Some(raw) = contact.birth_date.as_deref() else {
                without_date += 1;
                continue;
            };

            match try_days_until_birthday(raw, self.today) {
                Some(days) => {
                    if days <= self.upcoming_window_days {
                        upcoming += 1;
                    }
                    if soonest.as_ref().map(|(_, d, _)| days < *d).unwrap_or(true) {
                        if let Some(date) = next_birthday(raw, self.today) {
                            soonest = Some((contact.full_name.clone(), days, date));
                        }
                    }
                    countdowns.push(Record::from_value(serde_json::json!({
                        "full_name": contact.full_name,
                        "birth_date": raw,
                        "days_until_birthday": days,
                    })));
                }
                None => {
                    malformed += 1;
                    tracing::warn!(
                        "🎂 Contact {} has malformed birth date {:?}, counting down from 0",
                        contact.full_name,
                        raw
                    );
                }
            }
        }

        let mut report = CheckReport::new(Self::NAME)
            .meta("contact_count", serde_json::Value::Number(rows.len().into()))
            .meta(
                "upcoming_within_window",
                serde_json::Value::Number(upcoming.into()),
            )
            .meta(
                "window_days",
                serde_json::Value::Number(self.upcoming_window_days.into()),
            )
            .meta(
                "malformed_birth_dates",
                serde_json::Value::Number(malformed.into()),
            );

        if let Some((name, days, date)) = &soonest {
            report = report
                .detail(match days {
                    0 => format!("🎂 {}'s birthday is today!", name),
                    1 => format!("🎂 Next birthday: {} tomorrow ({})", name, date),
                    _ => format!("🎂 Next birthday: {} in {} days ({})", name, days, date),
                })
                .meta(
                    "next_birthday_contact",
                    serde_json::Value::String(name.clone()),
                )
                .meta("next_birthday_days", serde_json::Value::Number((*days).into()));
        }

        report = report.detail(format!(
            "{} of {} contacts have a birthday within {} days",
            upcoming,
            rows.len(),
            self.upcoming_window_days
        ));

        if without_date > 0 {
            report = report.detail(format!("{} contacts have no birth date", without_date));
        }

        if malformed > 0 {
            report = report.with_status(CheckStatus::Warning).detail(format!(
                "{} contacts have malformed birth dates (countdown degrades to 0)",
                malformed
            ));
        }

        report.records = countdowns;
        Ok(report)
    }
}
