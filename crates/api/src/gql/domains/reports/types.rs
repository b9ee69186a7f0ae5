use async_graphql::InputObject;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::services::reports::ReportFilters;

#[derive(InputObject, Debug, Default)]
pub struct ReportFiltersInput {
    /// Inclusive, campus-local.
    pub start_date: Option<NaiveDate>,
    /// Inclusive, campus-local.
    pub end_date: Option<NaiveDate>,
    pub campus: Option<Uuid>,
    /// Restricts the comparison view of `categoryPopularity`.
    pub categories: Option<Vec<String>>,
}

impl From<ReportFiltersInput> for ReportFilters {
    fn from(input: ReportFiltersInput) -> Self {
        Self {
            start_date: input.start_date,
            end_date: input.end_date,
            campus: input.campus,
            categories: input.categories.unwrap_or_default(),
        }
    }
}
