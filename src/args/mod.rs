//! CLI argument types and parsing helpers.
mod cli;
pub(crate) mod parsers;

#[cfg(test)]
mod tests;

pub use cli::{
    AnalyzeArgs, ApiwatchArgs, Command, IngestArgs, JobsArgs, ListArgs, LogJobArgs, LookupArgs,
    RequestsArgs,
};
