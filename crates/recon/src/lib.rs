//! `catalog-recon`: Submission log reconciliation engine.
//!
//! Pure engine crate: receives the full log of form submissions, returns
//! the current resource catalog. Replays create/edit/delete requests under
//! the ownership rule (only the first submitter's email may change or
//! remove a resource). No CLI dependencies; the only IO is parsing CSV text
//! handed in by the caller.

pub mod config;
pub mod deletion;
pub mod engine;
pub mod error;
pub mod header;
pub mod mapper;
pub mod model;
pub mod normalize;
pub mod ownership;
pub mod select;
pub mod stats;

#[cfg(test)]
mod test_support;

pub use config::ReconConfig;
pub use engine::{load_csv_headers, load_csv_rows, run, Reconciler};
pub use error::ReconError;
pub use model::{Catalog, CanonicalField, CanonicalRecord, RawRow, ReconResult, ReconciledResource};
pub use stats::{compute_stats, CatalogStats};
