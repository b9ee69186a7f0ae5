use async_graphql::{Context, Json, Object, Result};

use crate::auth::{require, Action};
use crate::gql::error::DomainResultExt;
use crate::services::reports::ReportFilters;
use crate::state::AppState;

use super::types::ReportFiltersInput;

#[derive(Default)]
pub struct ReportQuery;

#[Object]
impl ReportQuery {
    /// Chart-ready aggregation over the whole library. `reportType` is one of
    /// `bookActivityByCampus`, `userGrowth`, `categoryPopularity`,
    /// `activeUsers`, `campusBudgets`.
    async fn generate_global_report(
        &self,
        ctx: &Context<'_>,
        report_type: String,
        filters: Option<ReportFiltersInput>,
    ) -> Result<Json<serde_json::Value>> {
        let caller = require(ctx, Action::GenerateReports)?;
        let state = ctx.data::<AppState>()?;

        let filters = ReportFilters::from(filters.unwrap_or_default());
        tracing::info!(by = %caller.user_id, report = %report_type, "report requested");
        let report = state
            .reports()
            .generate(&report_type, &filters)
            .await
            .into_gql()?;
        Ok(Json(report))
    }
}
