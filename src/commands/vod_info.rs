//! `vod-info` subcommand: fetch the detail document of one VOD entry and
//! search it, at any depth, for language-related keys.
use anyhow::Result;
use clap::Args;
use std::io::Write;

use super::PatternArgs;
use crate::client::{
    Action, ClientError, StreamKind, XtreamClient, first_item, first_stream_id,
};
use crate::finder::find_fields;
use crate::utils::{format_path, summarize, truncate_chars};
use crate::value::Value;

/// Default number of characters of the detail document to print.
pub const DEFAULT_DUMP_LIMIT: usize = 2000;

/// Arguments of `xprobe vod-info`.
#[derive(Args, Debug, Clone)]
pub struct VodInfoArgs {
    /// VOD stream id; defaults to the first stream of the category
    #[arg(long, value_name = "ID")]
    pub vod_id: Option<String>,
    /// Category to pick a stream from when --vod-id is omitted
    #[arg(short, long, value_name = "ID")]
    pub category: Option<String>,
    /// Maximum number of characters of the detail document to print
    #[arg(long, default_value_t = DEFAULT_DUMP_LIMIT)]
    pub limit: usize,
    #[command(flatten)]
    pub patterns: PatternArgs,
}

/// Resolves the VOD id, fetches its details and writes the report.
///
/// # Errors
///
/// Fails on any request error, or when no VOD id can be determined.
pub fn run<W: Write>(client: &XtreamClient, args: &VodInfoArgs, out: &mut W) -> Result<()> {
    let predicate = args.patterns.predicate()?;
    let vod_id = match &args.vod_id {
        Some(id) => id.clone(),
        None => pick_vod(client, args.category.clone(), out)?,
    };
    writeln!(out, "Checking detailed info for VOD ID: {vod_id}")?;

    let detail = client.fetch(&Action::VodInfo { vod_id })?;
    let pretty = detail.to_json_pretty()?;
    writeln!(out, "\nVOD detail info structure:")?;
    writeln!(out, "{}", truncate_chars(&pretty, args.limit))?;
    let total = pretty.chars().count();
    if total > args.limit {
        writeln!(out, "... ({total} chars in total)")?;
    }

    let matches = find_fields(&detail, predicate.as_ref());
    if matches.is_empty() {
        writeln!(out, "\nNo language-related fields in detailed info")?;
    } else {
        writeln!(out, "\nLanguage-related fields found:")?;
        for m in &matches {
            writeln!(out, "  {} = {}", format_path(&m.path), summarize(m.value))?;
        }
    }
    Ok(())
}

/// Walks categories to streams and returns the first stream's id.
fn pick_vod<W: Write>(
    client: &XtreamClient,
    category: Option<String>,
    out: &mut W,
) -> Result<String> {
    let category = match category {
        Some(id) => id,
        None => client.first_category(StreamKind::Vod)?,
    };
    let action = Action::VodStreams {
        category_id: Some(category),
    };
    let streams = client.fetch(&action)?;
    let vod_id = first_stream_id(&streams).ok_or(ClientError::MissingId {
        action: action.name(),
        field: "stream_id",
    })?;
    if let Some(name) = first_item(&streams)
        .and_then(|item| item.get("name"))
        .and_then(Value::as_str)
    {
        writeln!(out, "VOD name: {name}")?;
    }
    Ok(vod_id)
}
