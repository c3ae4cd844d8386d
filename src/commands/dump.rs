//! `dump` subcommand: issue one API action and print the first record of the
//! response verbatim.
use anyhow::{Result, anyhow};
use clap::{Args, ValueEnum};
use std::io::Write;

use crate::client::{Action, XtreamClient, first_item};
use crate::value::{Map, Value};

/// Actions selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionName {
    VodCategories,
    VodStreams,
    VodInfo,
    LiveCategories,
    LiveStreams,
    SeriesCategories,
    Series,
    SeriesInfo,
}

/// Arguments of `xprobe dump`.
#[derive(Args, Debug, Clone)]
pub struct DumpArgs {
    /// API action to call
    #[arg(short, long, value_enum)]
    pub action: ActionName,
    /// Category filter for stream listings
    #[arg(short, long, value_name = "ID")]
    pub category: Option<String>,
    /// VOD or series id for the `*-info` actions
    #[arg(long, value_name = "ID")]
    pub id: Option<String>,
}

impl DumpArgs {
    /// The fully parameterized action.
    ///
    /// # Errors
    ///
    /// Returns an error if an `*-info` action is missing its `--id`.
    pub fn action(&self) -> Result<Action> {
        let category_id = self.category.clone();
        let id = || match &self.id {
            Some(id) => Ok(id.clone()),
            None => Err(anyhow!("--id is required for {:?}", self.action)),
        };
        Ok(match self.action {
            ActionName::VodCategories => Action::VodCategories,
            ActionName::VodStreams => Action::VodStreams { category_id },
            ActionName::VodInfo => Action::VodInfo { vod_id: id()? },
            ActionName::LiveCategories => Action::LiveCategories,
            ActionName::LiveStreams => Action::LiveStreams { category_id },
            ActionName::SeriesCategories => Action::SeriesCategories,
            ActionName::Series => Action::Series { category_id },
            ActionName::SeriesInfo => Action::SeriesInfo { series_id: id()? },
        })
    }
}

/// Calls the action and writes its redacted URL and first record.
///
/// # Errors
///
/// Fails on an invalid argument combination or any request error.
pub fn run<W: Write>(client: &XtreamClient, args: &DumpArgs, out: &mut W) -> Result<()> {
    let action = args.action()?;
    writeln!(out, "Making API call to: {}", client.redacted_url(&action)?)?;

    let response = client.fetch(&action)?;
    let empty = Value::Object(Map::new());
    let record = match &response {
        Value::Array(_) => first_item(&response).unwrap_or(&empty),
        // detail actions answer with a single object
        other => other,
    };
    writeln!(out, "\nFirst item from API response:")?;
    writeln!(out, "{}", record.to_json_pretty()?)?;
    Ok(())
}
