//! Analysis payload returned by the statement backend.
//!
//! Field names follow the backend's camelCase JSON. Sections the backend may
//! omit default to empty so rendering can degrade one section at a time.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// One statement line. Positive = credit, negative = debit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// As sent by the backend, usually `YYYY-MM-DD`
    pub date: String,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "Others".to_string()
}

impl Transaction {
    pub fn new(
        date: impl Into<String>,
        amount: f64,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            amount,
            description: description.into(),
            category: category.into(),
        }
    }

    /// Calendar date of the transaction, if the backend string is recognisable.
    ///
    /// Accepts plain dates, dates with a time part (`2024-01-15 00:00:00`,
    /// `2024-01-15T00:00:00`) and the `Jan 15, 2024` form PhonePe prints.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let s = self.date.trim();
        let head = s.get(..10).unwrap_or(s);
        if let Ok(d) = NaiveDate::parse_from_str(head, "%Y-%m-%d") {
            return Some(d);
        }
        ["%b %d, %Y", "%d/%m/%Y", "%d-%m-%Y"]
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    }

    pub fn is_credit(&self) -> bool {
        self.amount > 0.0
    }

    pub fn is_debit(&self) -> bool {
        self.amount < 0.0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Summary {
    pub total_received: f64,
    /// Signed as the backend sends it; usually negative (debits)
    pub total_spent: f64,
    pub balance: f64,
    pub credit_count: u32,
    pub debit_count: u32,
    pub total_transactions: u32,
}

/// Sign class used to pick the colour of a net figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NetStyle {
    Positive,
    Negative,
}

impl NetStyle {
    pub fn of(value: f64) -> Self {
        if value >= 0.0 {
            NetStyle::Positive
        } else {
            NetStyle::Negative
        }
    }
}

impl Summary {
    /// Net cash movement: received plus (signed) spent.
    pub fn net(&self) -> f64 {
        self.total_received + self.total_spent
    }

    pub fn net_style(&self) -> NetStyle {
        NetStyle::of(self.net())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CategoryStat {
    pub amount: f64,
    pub percentage: f64,
    pub count: u32,
}

/// Category name -> aggregate, as computed by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct CategoryBreakdown(pub BTreeMap<String, CategoryStat>);

impl CategoryBreakdown {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CategoryStat)> {
        self.0.iter()
    }

    pub fn get(&self, category: &str) -> Option<&CategoryStat> {
        self.0.get(category)
    }

    /// Sum of the reported percentages. Not enforced; used for diagnostics.
    pub fn percentage_total(&self) -> f64 {
        self.0.values().map(|s| s.percentage).sum()
    }
}

impl FromIterator<(String, CategoryStat)> for CategoryBreakdown {
    fn from_iter<I: IntoIterator<Item = (String, CategoryStat)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub summary: Summary,
    #[serde(default)]
    pub category_breakdown: CategoryBreakdown,
    /// Missing or null means 0
    #[serde(default, deserialize_with = "null_as_zero")]
    pub page_count: u32,
    /// Precomputed chart dataset, kept verbatim for pass-through rendering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_data: Option<serde_json::Value>,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

impl AnalysisResult {
    pub fn from_json(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }
}
