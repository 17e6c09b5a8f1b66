pub mod cache;
pub mod privs;

pub use cache::*;
pub use privs::*;
