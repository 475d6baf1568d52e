//! Business logic services

pub mod brands;
pub mod catalog;
pub mod facts;
pub mod proposal;
pub mod reconciler;
pub mod roles;
pub mod rules;
pub mod sizing;
pub mod store;

pub use catalog::{CatalogProvider, FileCatalog, StaticCatalog};
pub use facts::FactExtractor;
pub use proposal::ProposalService;
pub use reconciler::TopologyReconciler;
pub use rules::RuleEvaluator;
pub use sizing::calculate_scale;
pub use store::StoreClient;
