pub mod report;
pub mod schema;

pub use report::*;
pub use schema::*;
