//! Subcommands of the `xprobe` binary.
//!
//! Each submodule exposes a clap argument struct and a `run` function that
//! writes its report to the given writer.

pub mod dump;
pub mod fields;
pub mod find;
pub mod generate;
pub mod vod_info;

use anyhow::{Context, Result};
use clap::Args;
use regex::RegexBuilder;

use crate::finder::{KeyPredicate, KeyRegex, Substrings};

/// How object keys are selected.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PatternArgs {
    /// Substring to look for in key names (repeatable)
    #[arg(
        short,
        long = "pattern",
        value_name = "TEXT",
        default_values = Substrings::LANGUAGE_NEEDLES
    )]
    pub patterns: Vec<String>,
    /// Regular expression to search key names with, instead of --pattern
    #[arg(long, value_name = "REGEX")]
    pub regex: Option<String>,
    /// Match key names case-sensitively
    #[arg(long)]
    pub case_sensitive: bool,
}

impl Default for PatternArgs {
    fn default() -> Self {
        Self {
            patterns: Substrings::LANGUAGE_NEEDLES.map(String::from).to_vec(),
            regex: None,
            case_sensitive: false,
        }
    }
}

impl PatternArgs {
    /// Builds the key predicate these arguments describe.
    ///
    /// # Errors
    ///
    /// Returns an error if `--regex` does not compile.
    pub fn predicate(&self) -> Result<Box<dyn KeyPredicate>> {
        if let Some(pattern) = &self.regex {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(!self.case_sensitive)
                .build()
                .with_context(|| format!("invalid key regex {pattern:?}"))?;
            return Ok(Box::new(KeyRegex(regex)));
        }
        Ok(Box::new(Substrings::with_case(
            self.patterns.iter().cloned(),
            self.case_sensitive,
        )))
    }
}
