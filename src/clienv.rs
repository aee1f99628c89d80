use std::path::PathBuf;

const ENV_CONFIG_DIR: &str = "LAMPCTL_CONFIG_DIR";
const ENV_BASE_PATH: &str = "LAMPCTL_BASE";

const LAMPCTL_SUBDIR: &str = "lampctl";
const FALLBACK_CONFIG_DIR: &str = "~/.config";

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// lampctl config directory ($LAMPCTL_CONFIG_DIR or ~/.config/lampctl)
pub fn config_dir() -> PathBuf {
    let dir = env_opt(ENV_CONFIG_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from(FALLBACK_CONFIG_DIR))
                .join(LAMPCTL_SUBDIR)
        });
    tracing::trace!(dir = %dir.display(), "Resolved config directory");
    dir
}

/// Stack installation path override ($LAMPCTL_BASE)
pub fn base_path_override() -> Option<PathBuf> {
    let val = env_opt(ENV_BASE_PATH).map(PathBuf::from);
    tracing::trace!(value = ?val, "LAMPCTL_BASE env var");
    val
}
