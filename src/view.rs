use chrono::TimeZone;
use ratatui::style::Color;

use crate::fmt::{locale_number, number, short_date, signed_amount};
use crate::models::{DashboardStats, Transaction, TransactionKind};

pub const CARD_CAPTION: &str = "Compared to last month";
pub const DEFAULT_COUNTERPARTY: &str = "Customer";

#[derive(Debug, Clone, PartialEq)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
    pub icon: &'static str,
    pub background: Color,
    pub accent: Color,
}

/// Icon, card background and accent for one card.
type CardTheme = (&'static str, Color, Color);

const PRODUCTS_THEME: CardTheme = ("▦", Color::Rgb(30, 58, 138), Color::Rgb(59, 130, 246));
const CATEGORIES_THEME: CardTheme = ("▥", Color::Rgb(76, 29, 149), Color::Rgb(168, 85, 247));
const SUPPLIERS_THEME: CardTheme = ("☺", Color::Rgb(20, 83, 45), Color::Rgb(34, 197, 94));
const PURCHASES_THEME: CardTheme = ("⇣", Color::Rgb(113, 63, 18), Color::Rgb(234, 179, 8));
const SALES_THEME: CardTheme = ("$", Color::Rgb(127, 29, 29), Color::Rgb(239, 68, 68));

impl StatCard {
    fn new(title: &'static str, value: String, (icon, background, accent): CardTheme) -> Self {
        Self {
            title,
            value,
            icon,
            background,
            accent,
        }
    }
}

/// The five summary cards, in display order.
pub fn stat_cards(stats: &DashboardStats) -> [StatCard; 5] {
    [
        StatCard::new("Products", number(stats.total_products), PRODUCTS_THEME),
        StatCard::new("Categories", number(stats.total_categories), CATEGORIES_THEME),
        StatCard::new("Suppliers", number(stats.total_suppliers), SUPPLIERS_THEME),
        StatCard::new("Purchases", locale_number(stats.total_purchases), PURCHASES_THEME),
        StatCard::new("Sales", locale_number(stats.total_sales), SALES_THEME),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    pub kind: TransactionKind,
    pub product: String,
    /// "Purchased from: X" / "Sold to: X"
    pub counterparty: String,
    pub amount: String,
    pub date: String,
}

impl TransactionRow {
    pub fn from_transaction<Tz: TimeZone>(txn: &Transaction, tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let verb = match txn.kind {
            TransactionKind::Purchase => "Purchased from",
            TransactionKind::Sale => "Sold to",
        };
        Self {
            kind: txn.kind,
            product: txn.product_name.clone(),
            counterparty: format!("{verb}: {}", counterparty_label(txn)),
            amount: signed_amount(txn.kind, txn.total),
            date: short_date(&txn.occurred_at, tz),
        }
    }
}

pub fn counterparty_label(txn: &Transaction) -> &str {
    txn.counterparty_name.as_deref().unwrap_or(DEFAULT_COUNTERPARTY)
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmptyState {
    pub icon: &'static str,
    pub headline: &'static str,
    pub hint: &'static str,
}

pub const NO_TRANSACTIONS: EmptyState = EmptyState {
    icon: "▦",
    headline: "No recent transactions found",
    hint: "Start by adding products and making transactions",
};

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionList {
    Empty(EmptyState),
    Rows(Vec<TransactionRow>),
}

/// Rows in backend order, or the placeholder when there are none.
pub fn transaction_list<Tz: TimeZone>(stats: &DashboardStats, tz: &Tz) -> TransactionList
where
    Tz::Offset: std::fmt::Display,
{
    if stats.recent_transactions.is_empty() {
        return TransactionList::Empty(NO_TRANSACTIONS);
    }
    TransactionList::Rows(
        stats
            .recent_transactions
            .iter()
            .map(|t| TransactionRow::from_transaction(t, tz))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::SAMPLE;
    use chrono::Utc;

    fn sample() -> DashboardStats {
        DashboardStats::from_json(SAMPLE).unwrap()
    }

    #[test]
    fn test_stat_cards() {
        let cards = stat_cards(&sample());
        let titles: Vec<&str> = cards.iter().map(|c| c.title).collect();
        assert_eq!(titles, vec!["Products", "Categories", "Suppliers", "Purchases", "Sales"]);
        assert_eq!(cards[0].value, "10");
        assert_eq!(cards[4].value, "5");
    }

    #[test]
    fn test_stat_card_grouping() {
        let stats = DashboardStats {
            total_products: 1234567,
            ..Default::default()
        };
        assert_eq!(stat_cards(&stats)[0].value, "1,234,567");
    }

    #[test]
    fn test_fractional_money_cards() {
        let stats = DashboardStats {
            total_purchases: 2000.0,
            total_sales: 1520.75,
            ..Default::default()
        };
        let cards = stat_cards(&stats);
        assert_eq!(cards[3].value, "2,000");
        assert_eq!(cards[4].value, "1,520.75");
    }

    #[test]
    fn test_transaction_rows() {
        let list = transaction_list(&sample(), &Utc);
        let rows = match list {
            TransactionList::Rows(rows) => rows,
            TransactionList::Empty(_) => panic!("expected rows"),
        };
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].product, "Widget");
        assert_eq!(rows[0].counterparty, "Sold to: Customer");
        assert_eq!(rows[0].amount, "+ $42.50");
        assert_eq!(rows[0].date, "2/14/2024");

        assert_eq!(rows[1].counterparty, "Purchased from: Acme Supply");
        assert_eq!(rows[1].amount, "- $1234.50");
        assert_eq!(rows[1].date, "1/3/2024");
    }

    #[test]
    fn test_missing_counterparty_is_customer() {
        let stats = sample();
        assert_eq!(counterparty_label(&stats.recent_transactions[0]), "Customer");
    }

    #[test]
    fn test_empty_list_renders_placeholder() {
        let list = transaction_list(&DashboardStats::default(), &Utc);
        assert_eq!(list, TransactionList::Empty(NO_TRANSACTIONS));
    }
}
