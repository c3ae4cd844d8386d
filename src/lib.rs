/*!
# `xtream_probe` Library

Tools for finding out which fields an Xtream-Codes style IPTV panel API
exposes: a key-name search over JSON-like documents ([`finder`]), a blocking
panel client ([`client`]), and the credential file it is configured from
([`config`]).
*/

pub mod client;
pub mod commands;
pub mod config;
pub mod finder;
pub mod utils;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;

pub use finder::{KeyPredicate, Match, PathSegment, find_fields};
pub use value::Value;
