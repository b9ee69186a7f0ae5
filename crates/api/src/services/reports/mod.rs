//! On-demand dashboard aggregations. Every call re-reads the full tables.

pub mod aggregate;

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use infra::models::{BookRow, BorrowedBookRow, CampusRow, TransactionRow, UserRow};
use infra::repos;
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::gql::error::IntoGqlError;

pub const UNKNOWN_CAMPUS: &str = "Bilinmeyen Kampüs";
pub const UNKNOWN_USER: &str = "Bilinmeyen Kullanıcı";
pub const UNCATEGORIZED: &str = "Diğer";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Bilinmeyen rapor türü: {0}")]
    UnknownReport(String),

    #[error("Başlangıç tarihi bitiş tarihinden sonra olamaz.")]
    InvalidRange,

    #[error("Rapor oluşturulurken bir hata oluştu.")]
    Db(sqlx::Error),

    #[error("Rapor oluşturulurken bir hata oluştu.")]
    Serialization(#[from] serde_json::Error),
}

impl From<sqlx::Error> for ReportError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!("Database error while building report: {e}");
        ReportError::Db(e)
    }
}

impl IntoGqlError for ReportError {
    fn code(&self) -> ErrorCode {
        match self {
            ReportError::UnknownReport(_) => ErrorCode::NotFound,
            ReportError::InvalidRange => ErrorCode::InvalidArgument,
            ReportError::Db(_) | ReportError::Serialization(_) => ErrorCode::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
    BookActivityByCampus,
    UserGrowth,
    CategoryPopularity,
    ActiveUsers,
    CampusBudgets,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::BookActivityByCampus => "bookActivityByCampus",
            ReportType::UserGrowth => "userGrowth",
            ReportType::CategoryPopularity => "categoryPopularity",
            ReportType::ActiveUsers => "activeUsers",
            ReportType::CampusBudgets => "campusBudgets",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportType::BookActivityByCampus => "Kampüslere Göre Kitap Aktivitesi",
            ReportType::UserGrowth => "Kullanıcı Büyümesi",
            ReportType::CategoryPopularity => "Kategori Popülerliği",
            ReportType::ActiveUsers => "En Aktif Kullanıcılar",
            ReportType::CampusBudgets => "Kampüs Bütçeleri",
        }
    }
}

impl FromStr for ReportType {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bookActivityByCampus" => Ok(ReportType::BookActivityByCampus),
            "userGrowth" => Ok(ReportType::UserGrowth),
            "categoryPopularity" => Ok(ReportType::CategoryPopularity),
            "activeUsers" => Ok(ReportType::ActiveUsers),
            "campusBudgets" => Ok(ReportType::CampusBudgets),
            other => Err(ReportError::UnknownReport(other.to_string())),
        }
    }
}

/// Optional narrowing applied by every report. Dates are inclusive local dates.
#[derive(Debug, Clone, Default)]
pub struct ReportFilters {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub campus: Option<Uuid>,
    pub categories: Vec<String>,
}

impl ReportFilters {
    pub fn validate(&self) -> Result<(), ReportError> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if start > end => Err(ReportError::InvalidRange),
            _ => Ok(()),
        }
    }

    pub fn in_range(&self, instant: DateTime<Utc>, offset: FixedOffset) -> bool {
        let date = instant.with_timezone(&offset).date_naive();
        self.start_date.is_none_or(|start| date >= start)
            && self.end_date.is_none_or(|end| date <= end)
    }

    pub fn in_campus(&self, campus_id: Option<Uuid>) -> bool {
        self.campus.is_none_or(|wanted| campus_id == Some(wanted))
    }
}

/// Full snapshot of the tables reports read.
#[derive(Debug, Clone, Default)]
pub struct ReportDataset {
    pub campuses: Vec<CampusRow>,
    pub users: Vec<UserRow>,
    pub books: Vec<BookRow>,
    pub borrows: Vec<BorrowedBookRow>,
    pub transactions: Vec<TransactionRow>,
}

impl ReportDataset {
    pub async fn load(db: &PgPool) -> Result<Self, ReportError> {
        let (campuses, users, books, borrows, transactions) = tokio::try_join!(
            repos::campuses::list_all(db),
            repos::users::list_all(db),
            repos::books::list_all(db),
            repos::books::list_all_borrows(db),
            repos::transactions::list_all(db),
        )?;
        Ok(Self {
            campuses,
            users,
            books,
            borrows,
            transactions,
        })
    }
}

#[derive(Clone)]
pub struct ReportService {
    db: PgPool,
    offset: FixedOffset,
}

impl ReportService {
    pub fn new(db: PgPool, offset: FixedOffset) -> Self {
        Self { db, offset }
    }

    pub async fn generate(
        &self,
        report_type: &str,
        filters: &ReportFilters,
    ) -> Result<serde_json::Value, ReportError> {
        let report_type: ReportType = report_type.parse()?;
        filters.validate()?;

        let dataset = ReportDataset::load(&self.db).await?;
        tracing::info!(
            report = report_type.as_str(),
            borrows = dataset.borrows.len(),
            "generating report"
        );
        build(report_type, &dataset, filters, self.offset)
    }
}

/// Run one aggregation and wrap it with `reportType` and `title`.
pub fn build(
    report_type: ReportType,
    dataset: &ReportDataset,
    filters: &ReportFilters,
    offset: FixedOffset,
) -> Result<serde_json::Value, ReportError> {
    let mut body = match report_type {
        ReportType::BookActivityByCampus => {
            envelope(aggregate::book_activity_by_campus(dataset, filters, offset))
        }
        ReportType::UserGrowth => envelope(aggregate::user_growth(dataset, filters, offset)),
        ReportType::CategoryPopularity => {
            envelope(aggregate::category_popularity(dataset, filters, offset))
        }
        ReportType::ActiveUsers => envelope(aggregate::active_users(dataset, filters, offset)),
        ReportType::CampusBudgets => envelope(aggregate::campus_budgets(dataset, filters, offset)),
    }?;

    if let serde_json::Value::Object(map) = &mut body {
        map.insert("reportType".into(), report_type.as_str().into());
        map.insert("title".into(), report_type.title().into());
    }
    Ok(body)
}

fn envelope<T: Serialize>(report: T) -> Result<serde_json::Value, ReportError> {
    Ok(serde_json::to_value(report)?)
}
