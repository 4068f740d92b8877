pub mod deduplicator;
pub mod reducer;
pub mod standardizer;

pub use deduplicator::*;
pub use reducer::*;
pub use standardizer::*;
