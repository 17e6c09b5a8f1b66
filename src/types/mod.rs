pub mod errors;
pub mod ids;
pub mod report;
pub mod spec;

pub use errors::*;
pub use ids::*;
pub use report::*;
pub use spec::*;
