use crate::args::OpenTarget;
use anyhow::{bail, Result};
use lampctl::config::StackConfig;
use tokio::process::Command;

pub(crate) async fn cmd_open(config: &StackConfig, target: OpenTarget) -> Result<()> {
    let (label, location) = match target {
        OpenTarget::Localhost => ("localhost".to_string(), "http://localhost".to_string()),
        OpenTarget::Phpmyadmin => (
            "phpMyAdmin".to_string(),
            "http://localhost/phpmyadmin".to_string(),
        ),
        OpenTarget::Htdocs => (
            "web directory".to_string(),
            config.htdocs_dir().display().to_string(),
        ),
    };

    let status = Command::new("xdg-open").arg(&location).status().await;
    match status {
        Ok(status) if status.success() => {
            println!("Opening {label}");
            Ok(())
        }
        Ok(_) => bail!("failed to open {label}"),
        Err(e) => bail!("failed to run xdg-open: {e}"),
    }
}
