//! Domain layer: catalog records, pricing rules and pure catalog algorithms.
//!
//! Nothing in here performs I/O. Handlers fetch snapshots and pass them in.

pub mod aggregates;
pub mod calculators;
pub mod category_tree;
pub mod events;
pub mod pricing;
pub mod seo;
pub mod value_objects;
