use paylens_core::viewmodel::{format_inr, CategoryChart, ChartSource, ResultsView};
use paylens_core::NetStyle;
use std::fmt::Write;

const BAR_WIDTH: usize = 24;

/// `+₹500` / `-₹250`.
pub fn signed_inr(amount: f64, style: NetStyle) -> String {
    match style {
        NetStyle::Positive => format!("+{}", format_inr(amount)),
        NetStyle::Negative => format!("-{}", format_inr(amount)),
    }
}

/// Horizontal bar proportional to `value / max`.
pub fn share_bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let filled = ((value / max) * width as f64).round() as usize;
    "█".repeat(filled.clamp(1, width))
}

/// Slice values as percentages of the chart total.
pub fn chart_shares(chart: &CategoryChart) -> Vec<(String, f64)> {
    let total: f64 = chart.slices.iter().map(|s| s.value.max(0.0)).sum();
    chart
        .slices
        .iter()
        .map(|s| {
            let pct = if total > 0.0 { s.value.max(0.0) / total * 100.0 } else { 0.0 };
            (s.label.clone(), pct)
        })
        .collect()
}

/// Plain-text report printed by `paylens analyze`.
pub fn report(file_name: &str, view: &ResultsView) -> String {
    let mut out = String::new();
    let s = &view.summary;

    let _ = writeln!(out, "# Statement analysis: {file_name}\n");
    let _ = writeln!(out, "Pages analyzed:     {}", s.page_count);
    let _ = writeln!(
        out,
        "Transactions:       {} ({} credits, {} debits)",
        s.total_transactions, s.credit_count, s.debit_count
    );
    let _ = writeln!(out, "Total received:     {}", format_inr(s.total_received));
    let _ = writeln!(out, "Total spent:        {}", format_inr(s.total_spent));
    let _ = writeln!(out, "Net:                {}", signed_inr(s.net, s.net_style));

    if let Some(chart) = &view.chart {
        let note = match chart.source {
            ChartSource::Backend => "",
            ChartSource::Breakdown => " (from category breakdown)",
        };
        let _ = writeln!(out, "\n## Spending by category{note}\n");
        let shares = chart_shares(chart);
        let max = shares.iter().map(|(_, p)| *p).fold(0.0, f64::max);
        for (label, pct) in &shares {
            let _ = writeln!(out, "{:<20} {:>5.1}% {}", label, pct, share_bar(*pct, max, BAR_WIDTH));
        }
    }

    if !view.categories.is_empty() {
        let _ = writeln!(out, "\n## Categories\n");
        for c in &view.categories {
            let _ = writeln!(
                out,
                "{:<20} {:>14} {:>6.1}% {:>4} txns",
                c.category,
                format_inr(c.amount),
                c.percentage,
                c.count
            );
        }
    }

    if !view.monthly.is_empty() {
        let _ = writeln!(out, "\n## Monthly net\n");
        for p in view.monthly.points() {
            let _ = writeln!(out, "{:<10} {:>14}", p.month, signed_inr(p.net.abs(), NetStyle::of(p.net)));
        }
    }

    if !view.recent.is_empty() {
        let _ = writeln!(out, "\n## Recent transactions\n");
        for t in &view.recent {
            let _ = writeln!(
                out,
                "{:<12} {:<32} {:<16} {:>14}",
                t.date,
                t.description,
                t.category,
                signed_inr(t.amount, t.style)
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use paylens_core::{AnalysisResult, CategoryStat, Summary, Transaction};

    fn result() -> AnalysisResult {
        AnalysisResult {
            transactions: vec![
                Transaction::new("2024-01-15", -200.0, "Paid to AMAZON", "Shopping"),
                Transaction::new("2024-02-10", 500.0, "Received from RAHUL", "Transfer"),
            ],
            summary: Summary {
                total_received: 500.0,
                total_spent: -200.0,
                balance: 300.0,
                credit_count: 1,
                debit_count: 1,
                total_transactions: 2,
            },
            category_breakdown: [(
                "Shopping".to_string(),
                CategoryStat {
                    amount: 200.0,
                    percentage: 100.0,
                    count: 1,
                },
            )]
            .into_iter()
            .collect(),
            page_count: 1,
            chart_data: None,
        }
    }

    #[test]
    fn test_signed_inr() {
        assert_eq!(signed_inr(600.0, NetStyle::Positive), "+₹600");
        assert_eq!(signed_inr(300.0, NetStyle::Negative), "-₹300");
    }

    #[test]
    fn test_share_bar_bounds() {
        assert_eq!(share_bar(0.0, 10.0, 8), "");
        assert_eq!(share_bar(10.0, 10.0, 8).chars().count(), 8);
        assert_eq!(share_bar(0.01, 10.0, 8).chars().count(), 1);
    }

    #[test]
    fn test_report_sections() {
        let view = ResultsView::build(&result());
        let text = report("jan.pdf", &view);

        assert!(text.contains("Net:                +₹300"));
        assert!(text.contains("(from category breakdown)"));
        assert!(text.contains("Jan 2024"));
        assert!(text.contains("Feb 2024"));
        assert!(text.contains("Received from RAHUL"));
    }

    #[test]
    fn test_report_skips_empty_sections() {
        let mut r = result();
        r.category_breakdown = Default::default();
        let text = report("jan.pdf", &ResultsView::build(&r));
        assert!(!text.contains("## Spending by category"));
        assert!(!text.contains("## Categories"));
        assert!(text.contains("## Recent transactions"));
    }
}
