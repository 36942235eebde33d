pub mod merge;
pub mod product;
pub mod snapshot;
