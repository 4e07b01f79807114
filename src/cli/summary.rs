use chrono::{Local, TimeZone};
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fetch::{self, HttpSource};
use crate::models::{DashboardStats, TransactionKind};
use crate::series::{axis_tick, ChartInput, CHART_TITLE, X_AXIS_TITLE};
use crate::settings::Settings;
use crate::view::{stat_cards, transaction_list, TransactionList};

pub fn run(settings: &Settings) -> Result<()> {
    let source = HttpSource::new(&settings.endpoint, settings.timeout())?;
    let stats = fetch::load(source).wait()?;
    println!("{}", format_summary(&stats, &Local));
    Ok(())
}

// ---------------------------------------------------------------------------
// Pure formatting functions (stats → String)
// ---------------------------------------------------------------------------

pub fn format_summary<Tz: TimeZone>(stats: &DashboardStats, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    [
        format_cards(stats),
        format_series(stats),
        format_transactions(stats, tz),
    ]
    .join("\n\n")
}

pub fn format_cards(stats: &DashboardStats) -> String {
    let cards = stat_cards(stats);
    let mut table = Table::new();
    table.set_header(cards.iter().map(|c| Cell::new(c.title)).collect::<Vec<_>>());
    table.add_row(cards.iter().map(|c| Cell::new(&c.value)).collect::<Vec<_>>());
    table.to_string()
}

pub fn format_series(stats: &DashboardStats) -> String {
    if stats.chart_series.is_empty() {
        return format!("{}\nNo chart data", CHART_TITLE.bold());
    }
    let input = ChartInput::from_series(&stats.chart_series);
    let mut table = Table::new();
    table.set_header(vec![X_AXIS_TITLE, input.sales.label, input.purchases.label]);
    for (i, label) in input.labels.iter().enumerate() {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(axis_tick(input.sales.values[i])),
            Cell::new(axis_tick(input.purchases.values[i])),
        ]);
    }
    format!("{}\n{table}", CHART_TITLE.bold())
}

pub fn format_transactions<Tz: TimeZone>(stats: &DashboardStats, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let heading = "Recent Transactions".bold();
    match transaction_list(stats, tz) {
        TransactionList::Empty(empty) => {
            format!("{heading}\n{}\n{}", empty.headline, empty.hint.dimmed())
        }
        TransactionList::Rows(rows) => {
            let mut table = Table::new();
            table.set_header(vec!["Product", "Counterparty", "Amount", "Date"]);
            for row in rows {
                let amount = match row.kind {
                    TransactionKind::Purchase => row.amount.red(),
                    TransactionKind::Sale => row.amount.green(),
                };
                table.add_row(vec![
                    Cell::new(row.product),
                    Cell::new(row.counterparty),
                    Cell::new(amount),
                    Cell::new(row.date),
                ]);
            }
            format!("{heading}\n{table}")
        }
    }
}
