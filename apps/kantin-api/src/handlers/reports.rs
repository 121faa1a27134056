//! # Period Reports
//!
//! Admin-only views over committed transactions and expenses. Query
//! parameters pick the period; anything omitted falls back to the current
//! UTC date.
//!
//! ```text
//! GET /api/reports/daily?date=2026-10-16
//! GET /api/reports/monthly?month=10&year=2026
//! GET /api/reports/yearly?year=2026
//! GET /api/reports/stock-recap?date=… | ?month=…&year=… | ?year=…
//! ```

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Response;
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;

use kantin_core::report::ReportPeriod;
use kantin_core::validation::validate_month;
use kantin_core::Capability;

use crate::actor::CurrentActor;
use crate::error::ApiResult;
use crate::response;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub date: Option<NaiveDate>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// Query parameters with every omitted field filled in from `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPeriod {
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    /// The period the parameters name, for routes that accept any period.
    pub period: ReportPeriod,
}

impl PeriodQuery {
    /// Fills in defaults. A month without a year means this year's month.
    pub fn resolve(&self, today: NaiveDate) -> ApiResult<ResolvedPeriod> {
        let year = self.year.unwrap_or_else(|| today.year());
        let month = self.month.unwrap_or_else(|| today.month());
        validate_month(month)?;

        let explicit_year = self.month.map(|_| year).or(self.year);
        let period = ReportPeriod::resolve(self.date, self.month, explicit_year, today)?;

        Ok(ResolvedPeriod {
            date: self.date.unwrap_or(today),
            year,
            month,
            period,
        })
    }
}

fn resolve_query(
    actor: &CurrentActor,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> ApiResult<ResolvedPeriod> {
    actor.require(Capability::ViewReports)?;
    let Query(query) = query?;
    query.resolve(Utc::now().date_naive())
}

/// `GET /api/reports/daily`
pub async fn daily(
    State(state): State<Arc<AppState>>,
    actor: CurrentActor,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let resolved = resolve_query(&actor, query)?;
    let report = state.db.reports().daily(resolved.date).await?;
    Ok(response::ok(report))
}

/// `GET /api/reports/monthly`
pub async fn monthly(
    State(state): State<Arc<AppState>>,
    actor: CurrentActor,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let resolved = resolve_query(&actor, query)?;
    let report = state
        .db
        .reports()
        .monthly(resolved.year, resolved.month)
        .await?;
    Ok(response::ok(report))
}

/// `GET /api/reports/yearly`
pub async fn yearly(
    State(state): State<Arc<AppState>>,
    actor: CurrentActor,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let resolved = resolve_query(&actor, query)?;
    let report = state.db.reports().yearly(resolved.year).await?;
    Ok(response::ok(report))
}

/// `GET /api/reports/stock-recap`
pub async fn stock_recap(
    State(state): State<Arc<AppState>>,
    actor: CurrentActor,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let resolved = resolve_query(&actor, query)?;
    let recap = state.db.reports().stock_recap(resolved.period).await?;
    Ok(response::ok(recap))
}
