//! Static directory of statement sources (UPI apps and banks).
//!
//! Only sources marked `analysis_supported` can be sent to the backend today;
//! the rest are listed so users can favorite them.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceKind {
    UpiApp,
    Bank,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementSource {
    pub name: &'static str,
    pub kind: SourceKind,
    pub description: &'static str,
    pub analysis_supported: bool,
}

const fn app(name: &'static str, description: &'static str, analysis_supported: bool) -> StatementSource {
    StatementSource {
        name,
        kind: SourceKind::UpiApp,
        description,
        analysis_supported,
    }
}

const fn bank(name: &'static str, description: &'static str) -> StatementSource {
    StatementSource {
        name,
        kind: SourceKind::Bank,
        description,
        analysis_supported: false,
    }
}

pub const SOURCES: &[StatementSource] = &[
    app("PhonePe", "Digital payments & financial services", true),
    app("Google Pay", "Google's UPI payment service", false),
    app("Paytm", "Digital payments & commerce", false),
    app("Amazon Pay", "Amazon's payment service", false),
    app("WhatsApp Pay", "WhatsApp's UPI payments", false),
    app("BHIM", "Government's UPI app", false),
    app("Mobikwik", "Digital wallet & payments", false),
    app("Samsung Pay", "Samsung's payment service", false),
    app("Cred", "Credit card payments & rewards", false),
    app("Mi Pay", "Xiaomi's UPI service", false),
    bank("State Bank of India", "India's largest public sector bank"),
    bank("HDFC Bank", "Leading private sector bank"),
    bank("ICICI Bank", "Major private sector bank"),
    bank("Axis Bank", "Private sector banking services"),
    bank("Kotak Mahindra Bank", "Private sector banking"),
    bank("Bank of Baroda", "Major public sector bank"),
    bank("Punjab National Bank", "Public sector banking"),
    bank("Canara Bank", "Public sector banking services"),
    bank("Union Bank of India", "Public sector bank"),
    bank("Yes Bank", "Private sector banking"),
];

pub fn find(name: &str) -> Option<&'static StatementSource> {
    SOURCES.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

/// Case-insensitive substring match on name or description. A blank query
/// matches nothing.
pub fn search(query: &str) -> Vec<&'static StatementSource> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return Vec::new();
    }
    SOURCES
        .iter()
        .filter(|s| s.name.to_lowercase().contains(&q) || s.description.to_lowercase().contains(&q))
        .collect()
}
