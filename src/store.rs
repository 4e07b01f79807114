use crate::error::{DashboardError, FailureKind};
use crate::models::DashboardStats;
use crate::selection::{Month, Selection};

/// Outcome of the most recent load attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing has completed yet; the default zero-valued stats are shown.
    Pending,
    Loaded,
    /// Transport failure or non-success status. Previous stats stay on screen.
    Unavailable { reason: String },
    /// The body did not decode into a valid payload.
    Rejected { reason: String },
}

pub enum Action {
    StatsLoaded(DashboardStats),
    LoadFailed(DashboardError),
    SelectMonth(Month),
    SelectYear(i32),
}

/// Single owner of everything the dashboard renders. Cards, list and chart are
/// projections of `stats`; only `StatsLoaded` replaces it.
#[derive(Debug, Clone)]
pub struct DashboardState {
    stats: DashboardStats,
    selection: Selection,
    status: LoadStatus,
}

impl DashboardState {
    pub fn new(selection: Selection) -> Self {
        Self {
            stats: DashboardStats::default(),
            selection,
            status: LoadStatus::Pending,
        }
    }

    pub fn stats(&self) -> &DashboardStats {
        &self.stats
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// True when the last load failed, so what is shown is old or default data.
    pub fn is_stale(&self) -> bool {
        matches!(
            self.status,
            LoadStatus::Unavailable { .. } | LoadStatus::Rejected { .. }
        )
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::StatsLoaded(stats) => {
                tracing::info!(
                    transactions = stats.recent_transactions.len(),
                    periods = stats.chart_series.len(),
                    "dashboard stats loaded"
                );
                self.stats = stats;
                self.status = LoadStatus::Loaded;
            }
            Action::LoadFailed(err) => {
                tracing::warn!(error = %err, kind = ?err.kind(), "dashboard load failed");
                let reason = err.to_string();
                self.status = match err.kind() {
                    FailureKind::Malformed => LoadStatus::Rejected { reason },
                    FailureKind::Transport | FailureKind::Status | FailureKind::Other => {
                        LoadStatus::Unavailable { reason }
                    }
                };
            }
            Action::SelectMonth(month) => self.selection.set_month(month),
            Action::SelectYear(year) => {
                if !self.selection.set_year(year) {
                    tracing::debug!(year, "ignoring year outside the selectable window");
                }
            }
        }
    }
}
