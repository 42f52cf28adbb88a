//! Dashboard reads.
//!
//! Two backend reads feed the dashboard: the yearly revenue series and the
//! current rent status. If either fails the dashboard can still render from
//! bundled sample data, flagged so the caller shows a warning.

use crate::{config::DashboardConfig, session::Session};
use leasedesk_core::submit::TransportError;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Warning shown when sample data stands in for the backend.
pub const FALLBACK_WARNING: &str = "Failed to load dashboard data. Showing sample data.";

/// Months in one revenue series.
pub const SERIES_LEN: usize = 12;

///
/// DashboardError
///

#[derive(Debug, ThisError)]
pub enum DashboardError {
    #[error("failed to load dashboard data: {0}")]
    Transport(#[from] TransportError),

    #[error("revenue series must cover 12 months, got {revenue} values for {months} months")]
    Malformed { revenue: usize, months: usize },
}

///
/// DashboardTransport
///
/// Both reads carry the session's `Authorization` header value when there
/// is one.
///

pub trait DashboardTransport {
    fn revenue(&mut self, authorization: Option<&str>) -> Result<RevenueSummary, TransportError>;

    fn rent_status(&mut self, authorization: Option<&str>) -> Result<RentStatus, TransportError>;
}

///
/// RevenueSummary
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RevenueSummary {
    pub total_annual: u64,
    pub average_monthly: u64,
    pub revenue: Vec<u64>,
    pub months: Vec<String>,
}

impl RevenueSummary {
    pub fn decode(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    pub fn check(&self) -> Result<(), DashboardError> {
        if self.revenue.len() == SERIES_LEN && self.months.len() == SERIES_LEN {
            Ok(())
        } else {
            Err(DashboardError::Malformed {
                revenue: self.revenue.len(),
                months: self.months.len(),
            })
        }
    }

    /// Best month as `(label, amount)`.
    #[must_use]
    pub fn peak(&self) -> Option<(&str, u64)> {
        self.months
            .iter()
            .zip(&self.revenue)
            .max_by_key(|(_, amount)| **amount)
            .map(|(month, amount)| (month.as_str(), *amount))
    }

    /// Each month's share of the peak, in percent, for bar heights.
    #[must_use]
    pub fn relative_heights(&self) -> Vec<u8> {
        let peak = self.revenue.iter().copied().max().unwrap_or(0);
        if peak == 0 {
            return vec![0; self.revenue.len()];
        }

        self.revenue
            .iter()
            .map(|amount| u8::try_from(amount.saturating_mul(100) / peak).unwrap_or(100))
            .collect()
    }
}

///
/// TenantDue
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TenantDue {
    pub name: String,
    #[serde(default)]
    pub rent: u64,

    /// Day of the month rent falls due.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<u8>,
}

impl TenantDue {
    fn new(name: &str, rent: u64, due_date: Option<u8>) -> Self {
        Self {
            name: name.to_string(),
            rent,
            due_date,
        }
    }
}

///
/// RentStatus
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RentStatus {
    #[serde(default)]
    pub paid: Vec<TenantDue>,
    #[serde(default)]
    pub overdue: Vec<TenantDue>,
    #[serde(default)]
    pub upcoming: Vec<TenantDue>,
}

impl RentStatus {
    pub fn decode(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    #[must_use]
    pub const fn total_tenants(&self) -> usize {
        self.paid.len() + self.overdue.len() + self.upcoming.len()
    }

    #[must_use]
    pub fn collected(&self) -> u64 {
        rent_sum(&self.paid)
    }

    #[must_use]
    pub fn outstanding(&self) -> u64 {
        rent_sum(&self.overdue)
    }

    #[must_use]
    pub fn expected(&self) -> u64 {
        rent_sum(&self.upcoming)
    }

    /// Collected rent as a fraction of all rent on the books.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn collection_rate(&self) -> Option<f64> {
        let due = self
            .collected()
            .saturating_add(self.outstanding())
            .saturating_add(self.expected());

        (due > 0).then(|| self.collected() as f64 / due as f64)
    }
}

// saturates; backend amounts are untrusted
fn rent_sum(entries: &[TenantDue]) -> u64 {
    entries.iter().fold(0u64, |acc, t| acc.saturating_add(t.rent))
}

///
/// DataSource
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataSource {
    Live,
    Sample { warning: String },
}

///
/// Dashboard
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dashboard {
    pub revenue: RevenueSummary,
    pub rent_status: RentStatus,
    pub source: DataSource,
}

impl Dashboard {
    /// Fetch both reads. A failure of either falls back to sample data when
    /// the config allows it, and is returned as an error otherwise.
    pub fn load(
        transport: &mut dyn DashboardTransport,
        session: &Session,
        config: &DashboardConfig,
    ) -> Result<Self, DashboardError> {
        match Self::fetch(transport, session) {
            Ok(dashboard) => Ok(dashboard),
            Err(err) if config.sample_fallback => {
                tracing::warn!(error = %err, "dashboard read failed, using sample data");
                Ok(Self::sample())
            }
            Err(err) => Err(err),
        }
    }

    fn fetch(
        transport: &mut dyn DashboardTransport,
        session: &Session,
    ) -> Result<Self, DashboardError> {
        let authorization = session.authorization();
        let revenue = transport.revenue(authorization.as_deref())?;
        revenue.check()?;
        let rent_status = transport.rent_status(authorization.as_deref())?;

        Ok(Self {
            revenue,
            rent_status,
            source: DataSource::Live,
        })
    }

    /// Fixed illustrative figures.
    #[must_use]
    pub fn sample() -> Self {
        let months = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];

        Self {
            revenue: RevenueSummary {
                total_annual: 1_200_000,
                average_monthly: 100_000,
                revenue: vec![
                    95_000, 102_000, 98_000, 110_000, 107_000, 98_000, 120_000, 100_000, 95_000,
                    97_000, 103_000, 99_000,
                ],
                months: months.iter().map(ToString::to_string).collect(),
            },
            rent_status: RentStatus {
                paid: vec![
                    TenantDue::new("John Doe", 25_000, None),
                    TenantDue::new("Jane Smith", 30_000, None),
                    TenantDue::new("David Johnson", 18_000, None),
                ],
                overdue: vec![
                    TenantDue::new("Emily Brown", 22_000, None),
                    TenantDue::new("Chris Lee", 19_500, None),
                ],
                upcoming: vec![
                    TenantDue::new("Michael Scott", 27_000, Some(15)),
                    TenantDue::new("Pam Beesly", 26_000, Some(20)),
                ],
            },
            source: DataSource::Sample {
                warning: FALLBACK_WARNING.to_string(),
            },
        }
    }

    #[must_use]
    pub const fn is_sample(&self) -> bool {
        matches!(self.source, DataSource::Sample { .. })
    }

    #[must_use]
    pub fn warning(&self) -> Option<&str> {
        match &self.source {
            DataSource::Live => None,
            DataSource::Sample { warning } => Some(warning),
        }
    }
}

///
/// TESTS
///
