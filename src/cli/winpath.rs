//! `--winpath`: persistent `PATH` edits in the Windows registry.
//!
//! On Windows the native `reg` tool is used. Elsewhere the registry of the
//! wine prefix is edited through `wine reg`.

use crate::release::{Error, Result, process::run_tool, tool_detection};
use std::path::{Path, PathBuf};

const ENV_KEY: &str = r"HKCU\Environment";

/// Appends `entry` to the user `PATH` unless it is already listed.
///
/// Returns the value that is now stored.
pub async fn append_to_path(entry: &str) -> Result<String> {
    let (program, prefix) = reg_command()?;

    let mut query: Vec<String> = prefix.clone();
    query.extend(["query", ENV_KEY, "/v", "PATH"].map(String::from));
    let current = match run_tool(&program, &query, None).await {
        Ok(output) => parse_query(&output.stdout),
        // `reg query` fails when the value does not exist yet.
        Err(Error::ToolInvocation { .. }) => None,
        Err(e) => return Err(e),
    };

    let Some(updated) = appended(current.as_deref(), entry) else {
        log::info!("{} is already in PATH", entry);
        return Ok(current.unwrap_or_default());
    };

    let mut add = prefix;
    add.extend(
        ["add", ENV_KEY, "/v", "PATH", "/t", "REG_EXPAND_SZ", "/d", updated.as_str(), "/f"]
            .map(String::from),
    );
    run_tool(&program, &add, None).await?;
    log::info!("PATH is now {}", updated);
    Ok(updated)
}

fn reg_command() -> Result<(PathBuf, Vec<String>)> {
    if cfg!(windows) {
        let reg = tool_detection::locate(Path::new("reg"))
            .ok_or_else(|| Error::ToolNotFound("reg".into()))?;
        return Ok((reg, Vec::new()));
    }
    let wine = tool_detection::WINE
        .clone()
        .ok_or_else(|| Error::ToolNotFound("wine".into()))?;
    Ok((wine, vec!["reg".to_string()]))
}

/// Extracts the value from `reg query` output:
///
/// ```text
/// HKEY_CURRENT_USER\Environment
///     PATH    REG_EXPAND_SZ    C:\D\dmd\bin
/// ```
fn parse_query(stdout: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        if !parts.next()?.eq_ignore_ascii_case("PATH") {
            return None;
        }
        if !parts.next()?.starts_with("REG_") {
            return None;
        }
        let value = parts.collect::<Vec<_>>().join(" ");
        Some(value)
    })
}

/// The new `PATH` value, or `None` if `entry` is already present.
fn appended(current: Option<&str>, entry: &str) -> Option<String> {
    let entry = entry.trim_end_matches('\\');
    match current.map(str::trim).filter(|c| !c.is_empty()) {
        None => Some(entry.to_string()),
        Some(current) => {
            let present = current
                .split(';')
                .any(|p| p.trim_end_matches('\\').eq_ignore_ascii_case(entry));
            (!present).then(|| format!("{};{entry}", current.trim_end_matches(';')))
        }
    }
}
