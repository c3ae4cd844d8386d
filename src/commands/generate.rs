//! `generate` subcommand: shell completions and man pages.
use anyhow::{Context, Result};
use clap::Command;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Renders a man page for `cmd` and, recursively, one per subcommand (named
/// `<parent>-<sub>.1`) into `output_dir`, or the current directory if `None`.
/// Returns the written paths.
///
/// # Errors
///
/// Returns an error if the directory or a page cannot be written.
pub fn generate_man_pages(cmd: &Command, output_dir: Option<PathBuf>) -> Result<Vec<PathBuf>> {
    let output_dir = match output_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("locate current directory")?,
    };
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("create {}", output_dir.display()))?;

    let mut written = Vec::new();
    render(cmd.clone(), &output_dir, &mut written)?;
    Ok(written)
}

fn render(cmd: Command, dir: &Path, written: &mut Vec<PathBuf>) -> Result<()> {
    let name = cmd.get_name().to_string();
    let path = dir.join(format!("{name}.1"));
    let mut file =
        File::create(&path).with_context(|| format!("create {}", path.display()))?;
    clap_mangen::Man::new(cmd.clone())
        .render(&mut file)
        .with_context(|| format!("render {}", path.display()))?;
    written.push(path);

    for sub in cmd.get_subcommands() {
        // clap_mangen takes the page title from the command name
        let renamed = sub
            .clone()
            .name(format!("{name}-{}", sub.get_name()))
            .disable_help_subcommand(true);
        render(renamed, dir, written)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_page_per_command() {
        let cmd = Command::new("tool")
            .subcommand(Command::new("a").subcommand(Command::new("deep")))
            .subcommand(Command::new("b"));
        let dir = tempfile::tempdir().unwrap();
        let written = generate_man_pages(&cmd, Some(dir.path().to_path_buf())).unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["tool.1", "tool-a.1", "tool-a-deep.1", "tool-b.1"]);
        assert!(written.iter().all(|p| p.metadata().unwrap().len() > 0));
    }
}
