//! Chart- and table-ready projections of an [`AnalysisResult`].
//!
//! Everything here is a pure function of the result: building twice from the
//! same input yields identical output. Percentages come from the backend and
//! are shown as received.

use crate::model::{AnalysisResult, CategoryBreakdown, NetStyle, Transaction};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How many transactions the "recent" list shows.
pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthPoint {
    /// `"{Mon} {YYYY}"`, e.g. `"Jan 2024"`
    pub month: String,
    pub net: f64,
}

/// Net amount per calendar month, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MonthlySeries(pub Vec<MonthPoint>);

impl MonthlySeries {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn points(&self) -> &[MonthPoint] {
        &self.0
    }

    pub fn labels(&self) -> Vec<&str> {
        self.0.iter().map(|p| p.month.as_str()).collect()
    }
}

/// Group transactions by month and sum signed amounts.
///
/// Credits and debits in the same month cancel; the figure is net movement,
/// not volume. Months are keyed by their first day so ordering is calendar
/// order across years, independent of input order.
pub fn monthly_series(transactions: &[Transaction]) -> MonthlySeries {
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for t in transactions {
        let Some(date) = t.parsed_date() else {
            tracing::warn!(date = %t.date, "skipping transaction with unrecognised date");
            continue;
        };
        let month_start = date.with_day(1).unwrap_or(date);
        *totals.entry(month_start).or_insert(0.0) += t.amount;
    }

    MonthlySeries(
        totals
            .into_iter()
            .map(|(month_start, net)| MonthPoint {
                month: month_start.format("%b %Y").to_string(),
                net,
            })
            .collect(),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartSource {
    /// `chartData` from the backend, used as-is
    Backend,
    /// Built from `categoryBreakdown` percentages
    Breakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSlice {
    pub label: String,
    pub value: f64,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryChart {
    pub source: ChartSource,
    pub slices: Vec<ChartSlice>,
}

#[derive(Deserialize)]
struct RawChart {
    data: RawChartData,
}

#[derive(Deserialize)]
struct RawChartData {
    labels: Vec<String>,
    datasets: Vec<RawDataset>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDataset {
    data: Vec<f64>,
    #[serde(default)]
    background_color: Option<serde_json::Value>,
}

fn chart_from_backend(raw: &serde_json::Value) -> Option<CategoryChart> {
    let chart: RawChart = serde_json::from_value(raw.clone()).ok()?;
    let dataset = chart.data.datasets.into_iter().next()?;

    let colors: Vec<Option<String>> = match dataset.background_color {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(serde_json::Value::String(c)) => vec![Some(c); chart.data.labels.len()],
        _ => Vec::new(),
    };

    let slices: Vec<ChartSlice> = chart
        .data
        .labels
        .into_iter()
        .zip(dataset.data)
        .enumerate()
        .map(|(i, (label, value))| ChartSlice {
            label,
            value,
            color: colors.get(i).cloned().flatten(),
        })
        .collect();

    if slices.is_empty() {
        return None;
    }
    Some(CategoryChart {
        source: ChartSource::Backend,
        slices,
    })
}

fn chart_from_breakdown(breakdown: &CategoryBreakdown) -> Option<CategoryChart> {
    if breakdown.is_empty() {
        return None;
    }
    Some(CategoryChart {
        source: ChartSource::Breakdown,
        slices: breakdown
            .iter()
            .map(|(label, stat)| ChartSlice {
                label: label.clone(),
                value: stat.percentage,
                color: None,
            })
            .collect(),
    })
}

/// Spending-by-category chart, or `None` when there is nothing to draw.
pub fn category_chart(result: &AnalysisResult) -> Option<CategoryChart> {
    if let Some(raw) = &result.chart_data {
        match chart_from_backend(raw) {
            Some(chart) => return Some(chart),
            None => tracing::debug!("chartData present but unusable; falling back to breakdown"),
        }
    }
    chart_from_breakdown(&result.category_breakdown)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub category: String,
    /// Absolute amount
    pub amount: f64,
    pub percentage: f64,
    pub count: u32,
}

pub fn category_rows(breakdown: &CategoryBreakdown) -> Vec<CategoryRow> {
    breakdown
        .iter()
        .map(|(category, stat)| CategoryRow {
            category: category.clone(),
            amount: stat.amount.abs(),
            percentage: stat.percentage,
            count: stat.count,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRow {
    pub date: String,
    pub description: String,
    pub category: String,
    /// Absolute amount; direction is carried by `style`
    pub amount: f64,
    pub style: NetStyle,
}

impl From<&Transaction> for TransactionRow {
    fn from(t: &Transaction) -> Self {
        Self {
            date: t
                .parsed_date()
                .map(|d| d.format("%d %b %Y").to_string())
                .unwrap_or_else(|| t.date.clone()),
            description: t.description.clone(),
            category: t.category.clone(),
            amount: t.amount.abs(),
            style: NetStyle::of(t.amount),
        }
    }
}

/// The first [`RECENT_LIMIT`] transactions in the order the backend sent them.
pub fn recent_transactions(transactions: &[Transaction]) -> Vec<TransactionRow> {
    transactions
        .iter()
        .take(RECENT_LIMIT)
        .map(TransactionRow::from)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCard {
    pub total_received: f64,
    /// Absolute amount spent
    pub total_spent: f64,
    pub credit_count: u32,
    pub debit_count: u32,
    pub total_transactions: u32,
    pub page_count: u32,
    /// Absolute net; sign is carried by `net_style`
    pub net: f64,
    pub net_style: NetStyle,
}

pub fn summary_card(result: &AnalysisResult) -> SummaryCard {
    let s = &result.summary;
    let net = s.net();
    SummaryCard {
        total_received: s.total_received,
        total_spent: s.total_spent.abs(),
        credit_count: s.credit_count,
        debit_count: s.debit_count,
        total_transactions: s.total_transactions,
        page_count: result.page_count,
        net: net.abs(),
        net_style: NetStyle::of(net),
    }
}

/// Every section the results screen shows. Sections with no data are empty
/// or `None` and are skipped by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsView {
    pub summary: SummaryCard,
    pub chart: Option<CategoryChart>,
    pub categories: Vec<CategoryRow>,
    pub monthly: MonthlySeries,
    pub recent: Vec<TransactionRow>,
}

impl ResultsView {
    pub fn build(result: &AnalysisResult) -> Self {
        let breakdown = &result.category_breakdown;
        if !breakdown.is_empty() && (breakdown.percentage_total() - 100.0).abs() > 1.0 {
            tracing::debug!(
                total = breakdown.percentage_total(),
                "category percentages do not sum to 100"
            );
        }

        Self {
            summary: summary_card(result),
            chart: category_chart(result),
            categories: category_rows(breakdown),
            monthly: monthly_series(&result.transactions),
            recent: recent_transactions(&result.transactions),
        }
    }
}

/// Rupee amount with Indian digit grouping (`₹12,34,567.5`). Trailing zero
/// decimals are dropped.
pub fn format_inr(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    // Sign follows the rounded value so tiny negatives print as zero.
    let negative = amount < 0.0 && cents > 0;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let grouped = if whole.len() <= 3 {
        whole
    } else {
        let (head, last3) = whole.split_at(whole.len() - 3);
        let mut parts: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 2 {
            parts.push(&head[end - 2..end]);
            end -= 2;
        }
        parts.push(&head[..end]);
        parts.reverse();
        format!("{},{}", parts.join(","), last3)
    };

    let mut s = String::new();
    if negative {
        s.push('-');
    }
    s.push('₹');
    s.push_str(&grouped);
    match frac {
        0 => {}
        f if f % 10 == 0 => s.push_str(&format!(".{}", f / 10)),
        f => s.push_str(&format!(".{:02}", f)),
    }
    s
}
