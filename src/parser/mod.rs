//! Markup decomposition module.

mod decomposer;
pub mod markup;
mod options;

pub use decomposer::{decompose, Decomposer};
pub(crate) use decomposer::split_blocks;
pub use options::{DecomposeOptions, DEFAULT_DATE_FORMAT};
