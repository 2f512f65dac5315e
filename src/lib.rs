//! git-impact — historical code-ownership attribution across branches.
//!
//! For every line range a feature branch rewrote relative to a base
//! reference, the engine traces backward through history to the
//! contributors who last authored those lines, then folds the hits into a
//! ranked per-contributor impact score. All repository access goes through
//! a single "run query, get text or fail" seam; any failed query aborts
//! the run, because a partial score would be misleading.

pub mod analyzer;
pub mod cli;
pub mod error;
pub mod git;
pub mod model;
pub mod renderer;

pub use analyzer::{analyze, AnalysisResult};
pub use error::AttributionError;
pub use git::{GitCli, QueryRunner};
pub use model::{LineRange, Scoreboard, Summary};
