//! `fields` subcommand: list the fields of the first item a stream listing
//! returns, and point out the ones whose names look language-related.
use anyhow::Result;
use clap::Args;
use std::io::Write;

use super::PatternArgs;
use crate::client::{StreamKind, XtreamClient, first_item};
use crate::utils::{summarize, write_field_listing};

/// Arguments of `xprobe fields`.
#[derive(Args, Debug, Clone)]
pub struct FieldsArgs {
    /// Which section's stream listing to inspect
    #[arg(short, long, value_enum, default_value_t = StreamKind::Vod)]
    pub kind: StreamKind,
    /// Category to list; defaults to the first category of the section
    #[arg(short, long, value_name = "ID")]
    pub category: Option<String>,
    #[command(flatten)]
    pub patterns: PatternArgs,
}

/// Fetches the listing and writes the report.
///
/// # Errors
///
/// Fails on any request error, or when no category id can be determined.
pub fn run<W: Write>(client: &XtreamClient, args: &FieldsArgs, out: &mut W) -> Result<()> {
    let predicate = args.patterns.predicate()?;
    let category = match &args.category {
        Some(id) => id.clone(),
        None => client.first_category(args.kind)?,
    };
    let action = args.kind.streams(Some(category));
    writeln!(out, "Testing: {action}")?;

    let streams = client.fetch(&action)?;
    let Some(first) = first_item(&streams) else {
        writeln!(out, "No items returned")?;
        return Ok(());
    };
    let total = streams.as_array().map_or(0, <[_]>::len);
    writeln!(out, "Found {total} items")?;

    let Some(object) = first.as_object() else {
        writeln!(out, "First item is not an object: {}", summarize(first))?;
        return Ok(());
    };
    writeln!(out, "\nAll fields in first item:")?;
    write_field_listing(out, object)?;

    let relevant: Vec<(&str, _)> = object
        .iter()
        .filter(|(key, _)| predicate.matches(key))
        .collect();
    if relevant.is_empty() {
        writeln!(out, "\nNo language-related fields found")?;
    } else {
        writeln!(out, "\nLanguage-related fields:")?;
        for (key, value) in relevant {
            writeln!(out, "  {key} = {}", summarize(value))?;
        }
    }
    Ok(())
}
