//! Alert evaluation for the dashboard.
//!
//! Alerts are recomputed on every stats query from a [`DashboardSnapshot`]
//! and the current CPU gauge. Nothing is cached or persisted.

use serde::Serialize;

use crate::dashboard::state::DashboardSnapshot;

/// CPU usage (percent) above which a warning is raised.
pub const CPU_ALERT_PERCENT: f64 = 85.0;

/// Error ratio above which the error-rate alert fires.
pub const ERROR_RATE_ALERT: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub title: String,
    pub component: String,
}

impl Alert {
    fn new(level: AlertLevel, title: impl Into<String>, component: &str) -> Self {
        Self {
            level,
            title: title.into(),
            component: component.to_string(),
        }
    }
}

/// Derived health figures for one dashboard query.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthReport {
    /// Percentage of requests that did not end in a 5xx.
    pub availability: f64,
    /// Linear proxy: ten points per error, capped at 100.
    pub error_budget_used: u64,
    pub alerts: Vec<Alert>,
}

/// Turns a snapshot into availability, error budget and alerts.
#[derive(Debug, Clone)]
pub struct AlertEvaluator {
    latency_threshold_ms: f64,
}

impl AlertEvaluator {
    pub fn new(latency_threshold_ms: f64) -> Self {
        Self {
            latency_threshold_ms,
        }
    }

    pub fn evaluate(&self, snapshot: &DashboardSnapshot, cpu_percent: f64) -> HealthReport {
        let total = snapshot.total_requests;
        let errors = snapshot.total_errors;

        let availability = if total == 0 {
            100.0
        } else {
            (total - errors) as f64 / total as f64 * 100.0
        };
        let error_budget_used = errors.saturating_mul(10).min(100);

        let mut alerts = Vec::new();
        if cpu_percent > CPU_ALERT_PERCENT {
            alerts.push(Alert::new(
                AlertLevel::Warning,
                format!("CPU High ({:.1}%)", cpu_percent),
                "Hosting Node",
            ));
        }
        if snapshot.latest_latency_ms > self.latency_threshold_ms {
            alerts.push(Alert::new(AlertLevel::Critical, "High Latency", "API Gateway"));
        }
        if errors > 0 && errors as f64 / total as f64 > ERROR_RATE_ALERT {
            alerts.push(Alert::new(
                AlertLevel::Critical,
                "Error Rate > 5%",
                "Auth/Bid Service",
            ));
        }

        HealthReport {
            availability,
            error_budget_used,
            alerts,
        }
    }
}

impl Default for AlertEvaluator {
    fn default() -> Self {
        Self::new(500.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(total: u64, errors: u64, latency: f64) -> DashboardSnapshot {
        DashboardSnapshot {
            total_requests: total,
            total_errors: errors,
            latest_latency_ms: latency,
            logs: Vec::new(),
        }
    }

    #[test]
    fn test_availability() {
        let eval = AlertEvaluator::default();
        assert_eq!(eval.evaluate(&snapshot(0, 0, 0.0), 0.0).availability, 100.0);
        assert_eq!(eval.evaluate(&snapshot(100, 10, 0.0), 0.0).availability, 90.0);
    }

    #[test]
    fn test_error_budget_is_capped() {
        let eval = AlertEvaluator::default();
        assert_eq!(eval.evaluate(&snapshot(100, 3, 0.0), 0.0).error_budget_used, 30);
        assert_eq!(eval.evaluate(&snapshot(100, 42, 0.0), 0.0).error_budget_used, 100);
    }

    #[test]
    fn test_cpu_alert_only() {
        let report = AlertEvaluator::default().evaluate(&snapshot(10, 0, 20.0), 90.0);
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].level, AlertLevel::Warning);
        assert_eq!(report.alerts[0].title, "CPU High (90.0%)");
        assert_eq!(report.alerts[0].component, "Hosting Node");
    }

    #[test]
    fn test_latency_alert_only() {
        let report = AlertEvaluator::default().evaluate(&snapshot(10, 0, 600.0), 10.0);
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].level, AlertLevel::Critical);
        assert_eq!(report.alerts[0].title, "High Latency");
    }

    #[test]
    fn test_cpu_and_latency_together() {
        let report = AlertEvaluator::default().evaluate(&snapshot(10, 0, 600.0), 90.0);
        let levels: Vec<_> = report.alerts.iter().map(|a| a.level).collect();
        assert_eq!(levels, vec![AlertLevel::Warning, AlertLevel::Critical]);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let report = AlertEvaluator::default().evaluate(&snapshot(100, 5, 500.0), 85.0);
        assert!(report.alerts.is_empty());
    }

    #[test]
    fn test_error_rate_alert() {
        let report = AlertEvaluator::default().evaluate(&snapshot(100, 6, 10.0), 10.0);
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].title, "Error Rate > 5%");
        assert_eq!(report.alerts[0].component, "Auth/Bid Service");
    }

    #[test]
    fn test_custom_latency_threshold() {
        let eval = AlertEvaluator::new(1_000.0);
        assert!(eval.evaluate(&snapshot(1, 0, 600.0), 0.0).alerts.is_empty());
    }
}
