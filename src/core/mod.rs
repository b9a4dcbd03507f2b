//! Core business logic abstractions

pub mod analyzer;
pub mod cache;
pub mod config;
pub mod log;
pub mod price;
pub mod report;

// Re-export main types for cleaner imports
pub use analyzer::{AnalysisResult, ChangeError, ChangeRecord};
pub use price::{Baseline, BaselineProvider, PriceObservation, PriceSnapshot, QuoteProvider};
