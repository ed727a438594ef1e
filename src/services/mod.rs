// Service exports
pub mod catalogue;

pub use catalogue::{CatalogueError, PathologyCatalogue, PathologySummary};
