//! Report service
//!
//! Reports load the schedules of a date range once and aggregate them in
//! memory. The aggregation functions are pure so they can be tested
//! without a database.

use super::schedules::ScheduleService;
use crate::config::StudioConfig;
use crate::error::ApiError;
use crate::repositories::{
    EvaluationRecord, EvaluationRepository, EvolutionRecord, EvolutionRepository,
    InstructorRepository, ScheduleRecord, ScheduleRepository, StudentRepository,
};
use chrono::{Datelike, NaiveDate, Weekday};
use pilates_studio_shared::calendar::weekday_label;
use pilates_studio_shared::{
    average_rating, progress_score, AttendanceBucket, AttendanceReport, ClassTypeStats,
    DailyRevenue, DashboardStats, DateRange, FinancialReport, InstructorPerformance,
    InstructorStatus, MeasurementDelta, MonthlyReport, PaymentStatus, PaymentSummary,
    ProgressMetrics, RevenueEntry, ScheduleStatus, StudentAttendance, StudentProgressReport,
    StudentStatus,
};
use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::PgPool;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;
use uuid::Uuid;

/// Report service for business logic
pub struct ReportService;

impl ReportService {
    /// Figures for the calendar month containing `month` (default: current month)
    pub async fn monthly(
        pool: &PgPool,
        studio: &StudioConfig,
        month: Option<NaiveDate>,
    ) -> Result<MonthlyReport, ApiError> {
        let range = DateRange::month_of(month.unwrap_or_else(|| studio.today()));

        let total_students = StudentRepository::count_all(pool)
            .await
            .map_err(ApiError::Internal)?;
        let active_students = StudentRepository::count_by_status(pool, StudentStatus::Active)
            .await
            .map_err(ApiError::Internal)?;
        let new_students = StudentRepository::count_registered_between(pool, range.start, range.end)
            .await
            .map_err(ApiError::Internal)?;

        let classes = load_classes(pool, range).await?;
        let records = EvolutionRepository::list_between(pool, range.start, range.end)
            .await
            .map_err(ApiError::Internal)?;

        let totals = Totals::of(&classes);
        debug!(start = %range.start, end = %range.end, classes = classes.len(), "Monthly report");

        Ok(MonthlyReport {
            period_start: range.start,
            period_end: range.end,
            total_students,
            active_students,
            new_students,
            total_classes: totals.total,
            completed_classes: totals.completed,
            total_revenue: totals.paid_revenue,
            average_class_price: average_price(totals.paid_revenue, totals.completed),
            attendance_rate: rate(totals.completed, totals.total - totals.cancelled),
            instructor_performance: instructor_performance(&classes, &records),
            class_type_stats: class_type_stats(&classes),
        })
    }

    pub async fn financial(
        pool: &PgPool,
        studio: &StudioConfig,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FinancialReport, ApiError> {
        let range = DateRange::bounded(start, end, studio.max_report_days)?;
        let classes = load_classes(pool, range).await?;
        Ok(financial_report(range, &classes))
    }

    pub async fn attendance(
        pool: &PgPool,
        studio: &StudioConfig,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AttendanceReport, ApiError> {
        let range = DateRange::bounded(start, end, studio.max_report_days)?;
        let classes = load_classes(pool, range).await?;
        Ok(attendance_report(range, &classes))
    }

    pub async fn student_progress(
        pool: &PgPool,
        student_id: Uuid,
    ) -> Result<StudentProgressReport, ApiError> {
        let student = StudentRepository::find_by_id(pool, student_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound(format!("Student {} not found", student_id)))?;

        let records = EvolutionRepository::list_for_student(pool, student_id)
            .await
            .map_err(ApiError::Internal)?;
        let evaluations = EvaluationRepository::list_for_student(pool, student_id)
            .await
            .map_err(ApiError::Internal)?;

        // Both lists come newest first
        let latest = records.first();
        let ratings: Vec<i32> = records.iter().rev().filter_map(|r| r.overall_rating).collect();

        Ok(StudentProgressReport {
            student_id,
            student_name: student.name,
            registration_date: student.registration_date,
            total_sessions: records.len() as i64,
            average_rating: average_rating(&ratings),
            last_focus: latest.map(|r| r.focus.clone()),
            last_session_date: latest.map(|r| r.date),
            progress_score: rating_trend(&ratings),
            evaluations_count: evaluations.len() as i64,
            progress_metrics: progress_metrics(&evaluations),
        })
    }

    pub async fn dashboard(pool: &PgPool, studio: &StudioConfig) -> Result<DashboardStats, ApiError> {
        let month = DateRange::month_of(studio.today());

        let active_students = StudentRepository::count_by_status(pool, StudentStatus::Active)
            .await
            .map_err(ApiError::Internal)?;
        let active_instructors =
            InstructorRepository::count_by_status(pool, InstructorStatus::Active)
                .await
                .map_err(ApiError::Internal)?;
        let monthly_revenue = ScheduleRepository::paid_revenue(pool, month.start, month.end)
            .await
            .map_err(ApiError::Internal)?;
        let monthly_completed_classes = ScheduleRepository::count_with_status(
            pool,
            ScheduleStatus::Completed,
            month.start,
            month.end,
        )
        .await
        .map_err(ApiError::Internal)?;

        Ok(DashboardStats {
            active_students,
            active_instructors,
            confirmed_today: ScheduleService::confirmed_today(pool, studio).await?,
            monthly_revenue,
            monthly_completed_classes,
            today_schedules: ScheduleService::today(pool, studio).await?,
            upcoming_schedules: ScheduleService::upcoming(pool, studio).await?,
        })
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// The fields of a schedule that reports aggregate over
#[derive(Debug, Clone)]
pub(crate) struct Class {
    pub student_id: Uuid,
    pub student_name: String,
    pub instructor_id: Uuid,
    pub instructor_name: String,
    pub date: NaiveDate,
    pub class_type: String,
    pub price: Decimal,
    pub status: ScheduleStatus,
    pub payment_status: PaymentStatus,
}

impl Class {
    fn from_record(record: ScheduleRecord) -> Result<Self, ApiError> {
        Ok(Self {
            status: record.status()?,
            payment_status: record.payment_status()?,
            student_id: record.student_id,
            student_name: record.student_name,
            instructor_id: record.instructor_id,
            instructor_name: record.instructor_name,
            date: record.date,
            class_type: record.class_type,
            price: record.price,
        })
    }

    /// Price counted as revenue: only paid classes bring money in
    fn revenue(&self) -> Decimal {
        if self.payment_status == PaymentStatus::Paid {
            self.price
        } else {
            Decimal::ZERO
        }
    }
}

async fn load_classes(pool: &PgPool, range: DateRange) -> Result<Vec<Class>, ApiError> {
    ScheduleRepository::list_between(pool, range.start, range.end)
        .await
        .map_err(ApiError::Internal)?
        .into_iter()
        .map(Class::from_record)
        .collect()
}

#[derive(Debug, Default, PartialEq)]
struct Totals {
    total: i64,
    completed: i64,
    cancelled: i64,
    no_show: i64,
    paid_revenue: Decimal,
}

impl Totals {
    fn of<'a>(classes: impl IntoIterator<Item = &'a Class>) -> Self {
        let mut totals = Totals::default();
        for class in classes {
            totals.total += 1;
            match class.status {
                ScheduleStatus::Completed => totals.completed += 1,
                ScheduleStatus::Cancelled => totals.cancelled += 1,
                ScheduleStatus::NoShow => totals.no_show += 1,
                ScheduleStatus::Scheduled | ScheduleStatus::Confirmed => {}
            }
            totals.paid_revenue += class.revenue();
        }
        totals
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole` in percent, two decimals; `None` when `whole` is 0
fn rate(part: i64, whole: i64) -> Option<f64> {
    if whole <= 0 {
        return None;
    }
    Some(round2(part as f64 / whole as f64 * 100.0))
}

/// Like `rate`, but 0 for an empty whole
fn share(part: i64, whole: i64) -> f64 {
    rate(part, whole).unwrap_or(0.0)
}

/// `total / count` to two decimals; `None` when `count` is 0
fn average_price(total: Decimal, count: i64) -> Option<Decimal> {
    if count <= 0 {
        return None;
    }
    Some((total / Decimal::from(count)).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Progress score from the first and last rated sessions, chronological input
fn rating_trend(ratings: &[i32]) -> Option<f64> {
    match ratings {
        [first, .., last] => Some(progress_score(*first, *last)),
        _ => None,
    }
}

fn instructor_performance(classes: &[Class], records: &[EvolutionRecord]) -> Vec<InstructorPerformance> {
    let mut groups: HashMap<Uuid, Vec<&Class>> = HashMap::new();
    for class in classes {
        groups.entry(class.instructor_id).or_default().push(class);
    }

    let mut ratings: HashMap<Uuid, Vec<i32>> = HashMap::new();
    for record in records {
        if let Some(rating) = record.overall_rating {
            ratings.entry(record.instructor_id).or_default().push(rating);
        }
    }

    let mut performance: Vec<InstructorPerformance> = groups
        .into_iter()
        .map(|(instructor_id, group)| {
            let totals = Totals::of(group.iter().copied());
            let students: HashSet<Uuid> = group.iter().map(|c| c.student_id).collect();
            InstructorPerformance {
                instructor_id,
                instructor_name: group[0].instructor_name.clone(),
                total_classes: totals.total,
                completed_classes: totals.completed,
                revenue: totals.paid_revenue,
                distinct_students: students.len() as i64,
                attendance_rate: rate(totals.completed, totals.total - totals.cancelled),
                average_rating: ratings
                    .get(&instructor_id)
                    .and_then(|r| average_rating(r)),
            }
        })
        .collect();

    performance.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| a.instructor_name.cmp(&b.instructor_name))
    });
    performance
}

fn class_type_stats(classes: &[Class]) -> Vec<ClassTypeStats> {
    let all = classes.len() as i64;
    let mut groups: BTreeMap<&str, Vec<&Class>> = BTreeMap::new();
    for class in classes {
        groups.entry(class.class_type.as_str()).or_default().push(class);
    }

    let mut stats: Vec<ClassTypeStats> = groups
        .into_iter()
        .map(|(class_type, group)| {
            let count = group.len() as i64;
            let price_sum: Decimal = group.iter().map(|c| c.price).sum();
            let students: HashSet<Uuid> = group.iter().map(|c| c.student_id).collect();
            ClassTypeStats {
                class_type: class_type.to_string(),
                total_classes: count,
                revenue: group.iter().map(|c| c.revenue()).sum(),
                average_price: average_price(price_sum, count),
                distinct_students: students.len() as i64,
                share_percent: share(count, all),
            }
        })
        .collect();

    // BTreeMap gives name order; the stable sort keeps it among equal counts
    stats.sort_by(|a, b| b.total_classes.cmp(&a.total_classes));
    stats
}

/// Paid revenue per key, largest first; keys without paid classes are left out
///
/// Entries are grouped by `key` and shown with the first label seen for it,
/// so two instructors sharing a name stay apart.
fn revenue_by<'a, K, F>(classes: &'a [Class], key: F) -> Vec<RevenueEntry>
where
    K: Ord,
    F: Fn(&'a Class) -> (K, &'a str),
{
    let mut sums: BTreeMap<K, (&'a str, Decimal)> = BTreeMap::new();
    for class in classes.iter().filter(|c| c.payment_status == PaymentStatus::Paid) {
        let (k, label) = key(class);
        sums.entry(k).or_insert((label, Decimal::ZERO)).1 += class.price;
    }

    let mut entries: Vec<RevenueEntry> = sums
        .into_values()
        .map(|(label, revenue)| RevenueEntry {
            label: label.to_string(),
            revenue,
        })
        .collect();
    entries.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    entries
}

pub(crate) fn financial_report(range: DateRange, classes: &[Class]) -> FinancialReport {
    let totals = Totals::of(classes);

    let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for class in classes.iter().filter(|c| c.payment_status == PaymentStatus::Paid) {
        *by_day.entry(class.date).or_default() += class.price;
    }

    let payment_summary = PaymentStatus::ALL
        .iter()
        .map(|&status| {
            let matching: Vec<&Class> = classes
                .iter()
                .filter(|c| c.payment_status == status)
                .collect();
            PaymentSummary {
                payment_status: status,
                count: matching.len() as i64,
                amount: matching.iter().map(|c| c.price).sum(),
                percentage: share(matching.len() as i64, totals.total),
            }
        })
        .collect();

    FinancialReport {
        start_date: range.start,
        end_date: range.end,
        total_revenue: totals.paid_revenue,
        total_classes: totals.total,
        average_class_price: average_price(totals.paid_revenue, totals.total),
        revenue_by_class_type: revenue_by(classes, |c| (c.class_type.as_str(), c.class_type.as_str())),
        revenue_by_instructor: revenue_by(classes, |c| (c.instructor_id, c.instructor_name.as_str())),
        revenue_by_day: by_day
            .into_iter()
            .map(|(date, revenue)| DailyRevenue { date, revenue })
            .collect(),
        payment_summary,
    }
}

fn bucket(label: String, classes: &[&Class]) -> AttendanceBucket {
    let totals = Totals::of(classes.iter().copied());
    AttendanceBucket {
        label,
        total: totals.total,
        completed: totals.completed,
        attendance_rate: rate(totals.completed, totals.total),
    }
}

fn attendance_report(range: DateRange, classes: &[Class]) -> AttendanceReport {
    let totals = Totals::of(classes);

    let mut by_weekday: BTreeMap<u32, Vec<&Class>> = BTreeMap::new();
    let mut by_type: BTreeMap<&str, Vec<&Class>> = BTreeMap::new();
    let mut by_student: HashMap<Uuid, Vec<&Class>> = HashMap::new();
    for class in classes {
        by_weekday
            .entry(class.date.weekday().num_days_from_monday())
            .or_default()
            .push(class);
        by_type.entry(class.class_type.as_str()).or_default().push(class);
        by_student.entry(class.student_id).or_default().push(class);
    }

    let mut students: Vec<StudentAttendance> = by_student
        .into_iter()
        .map(|(student_id, group)| {
            let t = Totals::of(group.iter().copied());
            StudentAttendance {
                student_id,
                student_name: group[0].student_name.clone(),
                total: t.total,
                completed: t.completed,
                cancelled: t.cancelled,
                no_show: t.no_show,
                attendance_rate: rate(t.completed, t.total),
            }
        })
        .collect();
    students.sort_by(|a, b| a.student_name.cmp(&b.student_name));

    AttendanceReport {
        start_date: range.start,
        end_date: range.end,
        total_classes: totals.total,
        completed: totals.completed,
        cancelled: totals.cancelled,
        no_show: totals.no_show,
        attendance_rate: rate(totals.completed, totals.total),
        by_weekday: by_weekday
            .into_iter()
            .map(|(day, group)| bucket(weekday_label(weekday_from_index(day)).to_string(), &group))
            .collect(),
        by_class_type: by_type
            .into_iter()
            .map(|(label, group)| bucket(label.to_string(), &group))
            .collect(),
        by_student: students,
    }
}

fn weekday_from_index(days_from_monday: u32) -> Weekday {
    match days_from_monday {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}

/// First versus latest evaluation; needs at least two (input newest first)
fn progress_metrics(evaluations: &[EvaluationRecord]) -> Option<ProgressMetrics> {
    let (latest, first) = match evaluations {
        [latest, .., first] => (latest, first),
        _ => return None,
    };

    Some(ProgressMetrics {
        first_evaluation_date: first.date,
        latest_evaluation_date: latest.date,
        weight_kg: MeasurementDelta::between(Some(first.weight_kg), Some(latest.weight_kg)),
        bmi: MeasurementDelta::between(Some(first.bmi), Some(latest.bmi)),
        body_fat: MeasurementDelta::between(first.body_fat, latest.body_fat),
        waist: MeasurementDelta::between(first.waist_cm, latest.waist_cm),
    })
}
