//! `find` subcommand: search a local document for keys by name.
use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use log::debug;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use super::PatternArgs;
use crate::finder::find_fields;
use crate::utils::{ignore_broken_pipe, write_colored_result};
use crate::value::Value;

/// Serialization formats accepted as input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    Json,
    Yaml,
    Toml,
}

impl InputFormat {
    /// Guesses the format from a file extension, defaulting to JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("yaml" | "yml") => Self::Yaml,
            Some("toml") => Self::Toml,
            _ => Self::Json,
        }
    }

    /// Parses `text` in this format.
    ///
    /// # Errors
    ///
    /// Returns an error if `text` is not a valid document, or if support for
    /// the format was not compiled in.
    pub fn parse(self, text: &str) -> Result<Value> {
        let parsed = match self {
            Self::Json => serde_json::from_str(text).context("failed to parse JSON")?,
            Self::Yaml => parse_yaml(text)?,
            Self::Toml => parse_toml(text)?,
        };
        Ok(Value::from(parsed))
    }
}

#[cfg(feature = "yaml")]
fn parse_yaml(text: &str) -> Result<serde_json::Value> {
    serde_yaml::from_str(text).context("failed to parse YAML")
}

#[cfg(not(feature = "yaml"))]
fn parse_yaml(_text: &str) -> Result<serde_json::Value> {
    bail!("YAML input requires the `yaml` feature")
}

#[cfg(feature = "toml")]
fn parse_toml(text: &str) -> Result<serde_json::Value> {
    toml::from_str(text).context("failed to parse TOML")
}

#[cfg(not(feature = "toml"))]
fn parse_toml(_text: &str) -> Result<serde_json::Value> {
    bail!("TOML input requires the `toml` feature")
}

/// Arguments of `xprobe find`.
#[derive(Args, Debug, Clone)]
pub struct FindArgs {
    #[arg(value_name = "FILE")]
    /// Document to search. If omitted, reads from STDIN
    pub input: Option<PathBuf>,
    /// Input format; guessed from the file extension when omitted
    #[arg(short, long, value_enum)]
    pub format: Option<InputFormat>,
    #[command(flatten)]
    pub patterns: PatternArgs,
    /// Do not pretty-print matched values
    #[arg(long)]
    pub compact: bool,
    /// Display the number of matches
    #[arg(long)]
    pub count: bool,
    /// Do not display matched values
    #[arg(short, long)]
    pub no_display: bool,
    /// Do not print the path header above each value
    #[arg(long)]
    pub no_path: bool,
}

/// Reads the input named by `args`, searches it and writes the matches.
///
/// # Errors
///
/// Fails if the input cannot be read or parsed, or the pattern is invalid.
pub fn run<W: Write>(args: &FindArgs, out: &mut W) -> Result<()> {
    let predicate = args.patterns.predicate()?;
    let (text, format) = match &args.input {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read file {}", path.display()))?;
            (text, args.format.unwrap_or_else(|| InputFormat::from_path(path)))
        }
        None => {
            if io::stdin().is_terminal() {
                bail!("no input: pass a FILE or pipe a document into STDIN");
            }
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read STDIN")?;
            (buffer, args.format.unwrap_or(InputFormat::Json))
        }
    };
    debug!("parsing input as {format:?}");
    let document = format.parse(&text)?;
    debug!("document depth: {}", document.depth());

    let matches = find_fields(&document, predicate.as_ref());

    if args.count {
        ignore_broken_pipe(writeln!(out, "Found matches: {}", matches.len()))?;
    }
    if !args.no_display {
        for m in &matches {
            write_colored_result(out, m.value, &m.path, !args.compact, !args.no_path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(InputFormat::from_path(Path::new("a.json")), InputFormat::Json);
        assert_eq!(InputFormat::from_path(Path::new("noext")), InputFormat::Json);
        assert_eq!(InputFormat::from_path(Path::new("a.YML")), InputFormat::Yaml);
        assert_eq!(InputFormat::from_path(Path::new("Cargo.toml")), InputFormat::Toml);
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn yaml_keeps_key_order() {
        let doc = InputFormat::Yaml.parse("b: 1\na:\n  lang: en\n").unwrap();
        let keys: Vec<&str> = doc.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn toml_documents_are_searchable() {
        let doc = InputFormat::Toml
            .parse("[stream]\naudio_lang = \"de\"\n")
            .unwrap();
        let found = find_fields(&doc, &|k: &str| k.contains("lang"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value.as_str(), Some("de"));
    }

    #[test]
    fn run_writes_count_and_matches() {
        colored::control::set_override(false);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"info": {{"audio": "ac3", "name": "x"}}}}"#).unwrap();
        let args = FindArgs {
            input: Some(file.path().to_path_buf()),
            format: Some(InputFormat::Json),
            patterns: PatternArgs::default(),
            compact: true,
            count: true,
            no_display: false,
            no_path: false,
        };
        let mut out = Vec::new();
        run(&args, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Found matches: 1\ninfo.audio:\n\"ac3\"\n"
        );
    }

    #[test]
    fn run_rejects_malformed_input() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let args = FindArgs {
            input: Some(file.path().to_path_buf()),
            format: None,
            patterns: PatternArgs::default(),
            compact: false,
            count: false,
            no_display: false,
            no_path: false,
        };
        let err = run(&args, &mut Vec::new()).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse JSON"));
    }
}
