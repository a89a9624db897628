//! Scene Analysis
//!
//! Pure text metrics, file signatures, and the bounded LRU cache that ties
//! them together across runs.

pub mod cache;
pub mod metrics;
pub mod signature;

pub use cache::{AnalysisCache, CacheStats, DEFAULT_CACHE_SIZE};
pub use metrics::{Analyzer, DEFAULT_MAX_FILE_SIZE, DEFAULT_MIN_TERM_LEN};
pub use signature::FileSignature;
