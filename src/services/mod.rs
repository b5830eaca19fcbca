pub mod catalog;
pub mod enricher;
pub mod providers;
pub mod recommendations;

pub use catalog::{CatalogIndex, SimilarityMatrix};
pub use enricher::{EnricherSettings, MetadataEnricher};
pub use recommendations::{CatalogSource, Recommender};
