use leasedesk::{
    config::DashboardConfig,
    core::submit::TransportError,
    dashboard::{
        Dashboard, DashboardError, DashboardTransport, DataSource, FALLBACK_WARNING, RentStatus,
        RevenueSummary, TenantDue,
    },
    session::Session,
};

///
/// FakeDashboard
///

#[derive(Default)]
struct FakeDashboard {
    revenue: Option<RevenueSummary>,
    rent_status: Option<RentStatus>,
    seen_auth: Vec<Option<String>>,
}

impl DashboardTransport for FakeDashboard {
    fn revenue(&mut self, authorization: Option<&str>) -> Result<RevenueSummary, TransportError> {
        self.seen_auth.push(authorization.map(ToString::to_string));
        self.revenue
            .clone()
            .ok_or_else(|| TransportError::Unreachable("timeout".to_string()))
    }

    fn rent_status(&mut self, authorization: Option<&str>) -> Result<RentStatus, TransportError> {
        self.seen_auth.push(authorization.map(ToString::to_string));
        self.rent_status.clone().ok_or(TransportError::Rejected {
            status: 503,
            message: "unavailable".to_string(),
        })
    }
}

fn live_revenue() -> RevenueSummary {
    RevenueSummary::decode(
        r#"{
            "total_annual": 600000,
            "average_monthly": 50000,
            "revenue": [50000,50000,50000,50000,50000,50000,50000,50000,50000,50000,50000,50000],
            "months": ["Jan","Feb","Mar","Apr","May","Jun","Jul","Aug","Sep","Oct","Nov","Dec"]
        }"#,
    )
    .unwrap()
}

fn live_status() -> RentStatus {
    RentStatus {
        paid: vec![TenantDue {
            name: "Asha".to_string(),
            rent: 20_000,
            due_date: None,
        }],
        overdue: Vec::new(),
        upcoming: vec![TenantDue {
            name: "Ravi".to_string(),
            rent: 20_000,
            due_date: Some(5),
        }],
    }
}

fn signed_in() -> Session {
    let mut session = Session::anonymous();
    session.login("tok");
    session
}

#[test]
fn live_data_is_used_when_both_reads_succeed() {
    let mut backend = FakeDashboard {
        revenue: Some(live_revenue()),
        rent_status: Some(live_status()),
        ..FakeDashboard::default()
    };

    let dashboard =
        Dashboard::load(&mut backend, &signed_in(), &DashboardConfig::default()).unwrap();

    assert_eq!(dashboard.source, DataSource::Live);
    assert_eq!(dashboard.warning(), None);
    assert_eq!(dashboard.rent_status.total_tenants(), 2);
    assert_eq!(dashboard.rent_status.collection_rate(), Some(0.5));
    assert_eq!(
        backend.seen_auth,
        vec![Some("Bearer tok".to_string()), Some("Bearer tok".to_string())]
    );
}

#[test]
fn failed_read_falls_back_to_sample_data() {
    let mut backend = FakeDashboard {
        revenue: Some(live_revenue()),
        ..FakeDashboard::default()
    };

    let dashboard =
        Dashboard::load(&mut backend, &signed_in(), &DashboardConfig::default()).unwrap();

    assert!(dashboard.is_sample());
    assert_eq!(dashboard.warning(), Some(FALLBACK_WARNING));
    assert_eq!(dashboard, Dashboard::sample());
}

#[test]
fn malformed_series_falls_back_too() {
    let mut revenue = live_revenue();
    revenue.revenue.truncate(6);
    let mut backend = FakeDashboard {
        revenue: Some(revenue),
        rent_status: Some(live_status()),
        ..FakeDashboard::default()
    };

    let dashboard =
        Dashboard::load(&mut backend, &Session::anonymous(), &DashboardConfig::default())
            .unwrap();

    assert!(dashboard.is_sample());
    assert_eq!(backend.seen_auth, vec![None]);
}

#[test]
fn failure_surfaces_when_fallback_is_off() {
    let mut backend = FakeDashboard::default();
    let config = DashboardConfig {
        sample_fallback: false,
        ..DashboardConfig::default()
    };

    let err = Dashboard::load(&mut backend, &signed_in(), &config).unwrap_err();
    assert!(matches!(
        err,
        DashboardError::Transport(TransportError::Unreachable(_))
    ));

    let public: leasedesk::Error = err.into();
    assert!(public.is_retryable());
}
