//! paylens-core: analysis payload types, the statement session state machine,
//! and the view-models the presentation layer renders.

pub mod charts;
pub mod directory;
pub mod error;
pub mod favorites;
pub mod model;
pub mod session;
pub mod view;
pub mod viewmodel;

pub use charts::{register_chart_kinds, ChartKind, ChartRegistry};
pub use directory::{SourceKind, StatementSource};
pub use error::{AnalysisError, SessionError};
pub use favorites::FavoritesStore;
pub use model::{AnalysisResult, CategoryBreakdown, CategoryStat, NetStyle, Summary, Transaction};
pub use session::{Analyzer, Completion, Session, SessionState, Ticket};
pub use view::{Navigator, View, NAV_ITEMS};
pub use viewmodel::{
    category_chart, monthly_series, recent_transactions, CategoryChart, MonthPoint, MonthlySeries,
    ResultsView,
};
