//! CSV export for spreadsheets
//!
//! Exports reuse the report and schedule queries and flatten their output
//! into one row per line.

use super::reports::ReportService;
use super::schedules::ScheduleService;
use crate::config::StudioConfig;
use crate::error::ApiError;
use chrono::NaiveDate;
use pilates_studio_shared::{DateRange, FinancialReport, ScheduleResponse};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

/// One line of the financial export; `section` tells which breakdown it belongs to
#[derive(Debug, Clone, Serialize)]
pub struct FinancialCsvRow {
    pub section: &'static str,
    pub label: String,
    pub count: Option<i64>,
    pub amount: Decimal,
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleCsvRow {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub student: String,
    pub instructor: String,
    pub class_type: String,
    pub room: String,
    pub status: String,
    pub payment_status: String,
    pub price: Decimal,
}

/// CSV export service
pub struct ExportService;

impl ExportService {
    pub async fn financial_csv(
        pool: &PgPool,
        studio: &StudioConfig,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<String, ApiError> {
        let report = ReportService::financial(pool, studio, start, end).await?;
        Self::to_csv(&financial_rows(&report))
    }

    pub async fn schedules_csv(
        pool: &PgPool,
        studio: &StudioConfig,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<String, ApiError> {
        let range = DateRange::bounded(start, end, studio.max_report_days)?;
        let schedules = ScheduleService::by_date_range(pool, studio, range.start, range.end).await?;
        let rows: Vec<ScheduleCsvRow> = schedules.iter().map(schedule_row).collect();
        Self::to_csv(&rows)
    }

    /// Convert rows to a CSV string with a header line
    fn to_csv<T: Serialize>(data: &[T]) -> Result<String, ApiError> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| ApiError::Internal(anyhow::anyhow!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("CSV flush error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("CSV encoding error: {}", e)))
    }
}

fn financial_rows(report: &FinancialReport) -> Vec<FinancialCsvRow> {
    let mut rows = vec![FinancialCsvRow {
        section: "total",
        label: format!("{} to {}", report.start_date, report.end_date),
        count: Some(report.total_classes),
        amount: report.total_revenue,
        percentage: None,
    }];

    rows.extend(report.revenue_by_class_type.iter().map(|e| FinancialCsvRow {
        section: "class_type",
        label: e.label.clone(),
        count: None,
        amount: e.revenue,
        percentage: None,
    }));
    rows.extend(report.revenue_by_instructor.iter().map(|e| FinancialCsvRow {
        section: "instructor",
        label: e.label.clone(),
        count: None,
        amount: e.revenue,
        percentage: None,
    }));
    rows.extend(report.revenue_by_day.iter().map(|d| FinancialCsvRow {
        section: "day",
        label: d.date.to_string(),
        count: None,
        amount: d.revenue,
        percentage: None,
    }));
    rows.extend(report.payment_summary.iter().map(|p| FinancialCsvRow {
        section: "payment_status",
        label: p.payment_status.to_string(),
        count: Some(p.count),
        amount: p.amount,
        percentage: Some(p.percentage),
    }));
    rows
}

fn schedule_row(s: &ScheduleResponse) -> ScheduleCsvRow {
    ScheduleCsvRow {
        date: s.date.to_string(),
        start_time: s.start_time.format("%H:%M").to_string(),
        end_time: s.end_time.format("%H:%M").to_string(),
        student: s.student_name.clone(),
        instructor: s.instructor_name.clone(),
        class_type: s.class_type.clone(),
        room: s.room.clone(),
        status: s.status.to_string(),
        payment_status: s.payment_status.to_string(),
        price: s.price,
    }
}
