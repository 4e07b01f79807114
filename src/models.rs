use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::Deserialize;
use thiserror::Error;

/// Reasons a dashboard payload is rejected at the decode boundary.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("chart series lengths differ: {labels} labels, {sales} sales, {purchases} purchases")]
    SeriesLength {
        labels: usize,
        sales: usize,
        purchases: usize,
    },

    #[error("chart value {value} at {series}[{index}] is not a finite number")]
    NonFiniteValue {
        series: &'static str,
        index: usize,
        value: f64,
    },

    #[error("{field} must be a non-negative number, got {value}")]
    InvalidAggregate { field: &'static str, value: f64 },

    #[error("transaction {id} has an invalid total: {total}")]
    InvalidTotal { id: String, total: f64 },

    #[error("transaction {id} has an unparseable date: {value}")]
    InvalidDate { id: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Purchase,
    Sale,
}

impl TransactionKind {
    pub fn sign(self) -> char {
        match self {
            TransactionKind::Purchase => '-',
            TransactionKind::Sale => '+',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionKind,
    pub product_name: String,
    pub counterparty_name: Option<String>,
    pub total: f64,
    pub occurred_at: DateTime<FixedOffset>,
}

/// Sales and purchases per period. The three sequences always have the same
/// length; the only way to build one is [`ChartSeries::new`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    labels: Vec<String>,
    sales: Vec<f64>,
    purchases: Vec<f64>,
}

impl ChartSeries {
    pub fn new(
        labels: Vec<String>,
        sales: Vec<f64>,
        purchases: Vec<f64>,
    ) -> Result<Self, PayloadError> {
        if sales.len() != labels.len() || purchases.len() != labels.len() {
            return Err(PayloadError::SeriesLength {
                labels: labels.len(),
                sales: sales.len(),
                purchases: purchases.len(),
            });
        }
        check_finite("sales", &sales)?;
        check_finite("purchases", &purchases)?;
        Ok(Self {
            labels,
            sales,
            purchases,
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn sales(&self) -> &[f64] {
        &self.sales
    }

    pub fn purchases(&self) -> &[f64] {
        &self.purchases
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn check_finite(series: &'static str, values: &[f64]) -> Result<(), PayloadError> {
    match values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        Some((index, &value)) => Err(PayloadError::NonFiniteValue {
            series,
            index,
            value,
        }),
        None => Ok(()),
    }
}

/// The aggregate payload. `Default` is the zero-valued state shown before the
/// first successful load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub total_products: u64,
    pub total_categories: u64,
    pub total_suppliers: u64,
    /// Monetary totals; the payload may carry fractional amounts.
    pub total_purchases: f64,
    pub total_sales: f64,
    pub recent_transactions: Vec<Transaction>,
    pub chart_series: ChartSeries,
}

impl DashboardStats {
    /// Decode and validate a response body.
    pub fn from_json(body: &str) -> Result<Self, PayloadError> {
        let raw: RawStats = serde_json::from_str(body)?;
        raw.validate()
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStats {
    total_products: u64,
    total_categories: u64,
    total_suppliers: u64,
    total_purchases: f64,
    total_sales: f64,
    recent_transactions: Vec<RawTransaction>,
    chart_data: RawChartData,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransaction {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "type")]
    kind: TransactionKind,
    product_name: String,
    #[serde(default)]
    supplier_name: Option<String>,
    total: f64,
    date: String,
}

#[derive(Deserialize)]
struct RawChartData {
    labels: Vec<String>,
    datasets: RawDatasets,
}

#[derive(Deserialize)]
struct RawDatasets {
    sales: Vec<f64>,
    purchases: Vec<f64>,
}

impl RawStats {
    fn validate(self) -> Result<DashboardStats, PayloadError> {
        check_amount("totalPurchases", self.total_purchases)?;
        check_amount("totalSales", self.total_sales)?;
        let recent_transactions = self
            .recent_transactions
            .into_iter()
            .map(RawTransaction::validate)
            .collect::<Result<Vec<_>, _>>()?;
        let chart_series = ChartSeries::new(
            self.chart_data.labels,
            self.chart_data.datasets.sales,
            self.chart_data.datasets.purchases,
        )?;
        Ok(DashboardStats {
            total_products: self.total_products,
            total_categories: self.total_categories,
            total_suppliers: self.total_suppliers,
            total_purchases: self.total_purchases,
            total_sales: self.total_sales,
            recent_transactions,
            chart_series,
        })
    }
}

fn check_amount(field: &'static str, value: f64) -> Result<(), PayloadError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PayloadError::InvalidAggregate { field, value })
    }
}

/// ISO 8601 timestamps. Without an offset a date-time is local time and a
/// bare date is UTC midnight.
fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Some(at);
    }
    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok());
    if let Some(naive) = naive {
        return Some(match Local.from_local_datetime(&naive).earliest() {
            Some(local) => local.fixed_offset(),
            // Skipped by a DST change: no such local time exists.
            None => naive.and_utc().fixed_offset(),
        });
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().fixed_offset())
}

impl RawTransaction {
    fn validate(self) -> Result<Transaction, PayloadError> {
        if !self.total.is_finite() || self.total < 0.0 {
            return Err(PayloadError::InvalidTotal {
                id: self.id,
                total: self.total,
            });
        }
        let occurred_at = match parse_timestamp(&self.date) {
            Some(d) => d,
            None => {
                return Err(PayloadError::InvalidDate {
                    id: self.id,
                    value: self.date,
                })
            }
        };
        // An empty supplier name is treated the same as a missing one.
        let counterparty_name = self.supplier_name.filter(|s| !s.trim().is_empty());
        Ok(Transaction {
            id: self.id,
            kind: self.kind,
            product_name: self.product_name,
            counterparty_name,
            total: self.total,
            occurred_at,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE: &str = r#"{
        "totalProducts": 10,
        "totalCategories": 3,
        "totalSuppliers": 4,
        "totalPurchases": 7,
        "totalSales": 5,
        "recentTransactions": [
            {"_id": "t2", "type": "sale", "productName": "Widget", "total": 42.5,
             "date": "2024-02-14T12:00:00.000Z"},
            {"_id": "t1", "type": "purchase", "productName": "Gadget",
             "supplierName": "Acme Supply", "total": 1234.5,
             "date": "2024-01-03T12:00:00Z"}
        ],
        "chartData": {
            "labels": ["Jan", "Feb"],
            "datasets": {"sales": [100, 200], "purchases": [50, 75]}
        }
    }"#;

    #[test]
    fn test_decode_sample() {
        let stats = DashboardStats::from_json(SAMPLE).unwrap();
        assert_eq!(stats.total_products, 10);
        assert_eq!(stats.total_sales, 5.0);
        assert_eq!(stats.chart_series.labels(), &["Jan", "Feb"]);
        assert_eq!(stats.chart_series.sales(), &[100.0, 200.0]);
        assert_eq!(stats.chart_series.purchases(), &[50.0, 75.0]);

        // Backend order is preserved, not re-sorted by date
        let ids: Vec<&str> = stats.recent_transactions.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t2", "t1"]);

        let sale = &stats.recent_transactions[0];
        assert_eq!(sale.kind, TransactionKind::Sale);
        assert_eq!(sale.counterparty_name, None);
        let purchase = &stats.recent_transactions[1];
        assert_eq!(purchase.counterparty_name.as_deref(), Some("Acme Supply"));
    }

    #[test]
    fn test_rejects_unequal_series() {
        let body = SAMPLE.replace("\"purchases\": [50, 75]", "\"purchases\": [50]");
        let err = DashboardStats::from_json(&body).unwrap_err();
        assert!(matches!(
            err,
            PayloadError::SeriesLength { labels: 2, sales: 2, purchases: 1 }
        ));
    }

    #[test]
    fn test_rejects_missing_field() {
        let body = SAMPLE.replace("\"totalSuppliers\": 4,", "");
        let err = DashboardStats::from_json(&body).unwrap_err();
        assert!(matches!(err, PayloadError::Json(_)));
        assert!(err.to_string().contains("totalSuppliers"));
    }

    #[test]
    fn test_rejects_unknown_kind() {
        let body = SAMPLE.replace("\"type\": \"sale\"", "\"type\": \"refund\"");
        assert!(matches!(
            DashboardStats::from_json(&body),
            Err(PayloadError::Json(_))
        ));
    }

    #[test]
    fn test_rejects_negative_total() {
        let body = SAMPLE.replace("\"total\": 42.5", "\"total\": -1");
        let err = DashboardStats::from_json(&body).unwrap_err();
        assert!(matches!(err, PayloadError::InvalidTotal { ref id, .. } if id == "t2"));
    }

    #[test]
    fn test_rejects_bad_date() {
        let body = SAMPLE.replace("2024-02-14T12:00:00.000Z", "yesterday");
        let err = DashboardStats::from_json(&body).unwrap_err();
        assert!(matches!(err, PayloadError::InvalidDate { ref value, .. } if value == "yesterday"));
    }

    #[test]
    fn test_fractional_totals_accepted() {
        let body = SAMPLE.replace("\"totalSales\": 5", "\"totalSales\": 1520.75");
        let stats = DashboardStats::from_json(&body).unwrap();
        assert_eq!(stats.total_sales, 1520.75);
        assert_eq!(stats.total_products, 10);
        assert_eq!(stats.recent_transactions.len(), 2);
    }

    #[test]
    fn test_rejects_negative_aggregate() {
        let body = SAMPLE.replace("\"totalPurchases\": 7", "\"totalPurchases\": -3.5");
        let err = DashboardStats::from_json(&body).unwrap_err();
        assert!(matches!(
            err,
            PayloadError::InvalidAggregate { field: "totalPurchases", .. }
        ));
    }

    #[test]
    fn test_date_only_is_utc_midnight() {
        let body = SAMPLE.replace("2024-02-14T12:00:00.000Z", "2024-02-14");
        let stats = DashboardStats::from_json(&body).unwrap();
        let expected = DateTime::parse_from_rfc3339("2024-02-14T00:00:00Z").unwrap();
        assert_eq!(stats.recent_transactions[0].occurred_at, expected);
    }

    #[test]
    fn test_date_time_without_offset_is_local() {
        let body = SAMPLE.replace("2024-02-14T12:00:00.000Z", "2024-02-14T12:00:00");
        let stats = DashboardStats::from_json(&body).unwrap();
        let local = stats.recent_transactions[0].occurred_at.with_timezone(&Local);
        assert_eq!(
            local.naive_local(),
            NaiveDate::from_ymd_opt(2024, 2, 14)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap()
        );

        let body = SAMPLE.replace("2024-02-14T12:00:00.000Z", "2024-02-14T08:30:15.250");
        assert!(DashboardStats::from_json(&body).is_ok());
    }

    #[test]
    fn test_empty_supplier_name_is_absent() {
        let body = SAMPLE.replace("\"Acme Supply\"", "\"\"");
        let stats = DashboardStats::from_json(&body).unwrap();
        assert_eq!(stats.recent_transactions[1].counterparty_name, None);
    }

    #[test]
    fn test_chart_series_new_checks_lengths() {
        assert!(ChartSeries::new(vec!["Jan".into()], vec![], vec![1.0]).is_err());
        assert!(ChartSeries::new(vec!["Jan".into()], vec![f64::NAN], vec![1.0]).is_err());
        let series = ChartSeries::new(vec!["Jan".into()], vec![2.0], vec![1.0]).unwrap();
        assert_eq!(series.len(), 1);
        assert!(!series.is_empty());
    }

    #[test]
    fn test_default_is_empty() {
        let stats = DashboardStats::default();
        assert_eq!(stats.total_products, 0);
        assert!(stats.recent_transactions.is_empty());
        assert!(stats.chart_series.is_empty());
    }
}
