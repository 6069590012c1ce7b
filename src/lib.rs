//! Multi-run rank fusion over TREC-format result lists.
//!
//! Runs are loaded with [`TrecRun::load`], combined with a [`FusionMethod`],
//! optionally pruned against [`Qrels`] with [`filter`], and written back with
//! [`TrecRun::save`].

pub mod error;
pub mod filter;
pub mod fusion;
pub mod merge;
pub mod model;
pub mod persist;
pub mod qrels;
pub mod rescore;
pub mod run;

pub use error::{FusionError, Result};
pub use fusion::{FusionMethod, FusionOptions};
pub use merge::merge_runs;
pub use model::TrecRecord;
pub use qrels::Qrels;
pub use rescore::Rescore;
pub use run::TrecRun;
