pub mod analyze;
pub mod get;
pub mod share;

pub use analyze::SummaryOptions;
pub use get::GetOptions;
