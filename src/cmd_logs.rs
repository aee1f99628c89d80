use anyhow::{bail, Result};
use lampctl::config::StackConfig;
use std::fs;
use std::path::PathBuf;

pub(crate) fn cmd_logs(config: &StackConfig, service: &str, lines: usize) -> Result<()> {
    let (label, path) = resolve_log(config, service)?;

    match fs::read_to_string(&path) {
        Ok(content) => {
            let all: Vec<&str> = content.lines().collect();
            let start = all.len().saturating_sub(lines);
            for line in &all[start..] {
                println!("{line}");
            }
        }
        // Mirror the in-pane behavior of a log viewer: a missing or
        // unreadable log is reported, not fatal.
        Err(e) => println!("Could not read {label} error log at {}: {e}", path.display()),
    }

    Ok(())
}

fn resolve_log(config: &StackConfig, service: &str) -> Result<(&'static str, PathBuf)> {
    match service {
        "apache" => Ok(("Apache", config.apache_error_log())),
        "mysql" => match config.mysql_error_log() {
            Some(path) => Ok(("MySQL", path)),
            None => bail!(
                "no MySQL error log found under {}",
                config.base_path.join("var").join("mysql").display()
            ),
        },
        "ftp" => bail!("no error log is tracked for 'ftp'"),
        other => bail!("unknown service '{other}' (expected apache or mysql)"),
    }
}
