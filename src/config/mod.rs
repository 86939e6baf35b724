mod company;
pub mod session;

pub use company::{ApiSettings, Company, Config, OutputSettings};
pub use session::{Role, Session};

use crate::error::{Result, SalaryGenError};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (XDG config dir, falling back to ~/.salarygen/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "salarygen") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        SalaryGenError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".salarygen"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve a configured path; relative paths are anchored at the config directory
pub fn resolve_path(path: &str, cfg_dir: &Path) -> PathBuf {
    let expanded = expand_path(path);
    if expanded.is_absolute() {
        expanded
    } else {
        cfg_dir.join(expanded)
    }
}

/// Load the main config.toml
pub fn load_config(cfg_dir: &Path) -> Result<Config> {
    if !cfg_dir.exists() {
        return Err(SalaryGenError::ConfigNotFound(cfg_dir.to_path_buf()));
    }
    let path = cfg_dir.join("config.toml");
    if !path.exists() {
        return Err(SalaryGenError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| SalaryGenError::ConfigParse { path, source: e })
}

/// Load session.toml; a missing file means nobody is logged in
pub fn load_session(cfg_dir: &Path) -> Result<Option<Session>> {
    let path = cfg_dir.join("session.toml");
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content)
        .map(Some)
        .map_err(|e| SalaryGenError::ConfigParse { path, source: e })
}

/// Load the session and check its role against `allowed`
pub fn require_session(cfg_dir: &Path, allowed: &[Role], action: &str) -> Result<Session> {
    let session = load_session(cfg_dir)?.ok_or(SalaryGenError::NotLoggedIn)?;
    session.require(allowed, action)?;
    Ok(session)
}

/// Save session.toml
pub fn save_session(cfg_dir: &Path, session: &Session) -> Result<()> {
    let path = cfg_dir.join("session.toml");
    let content = toml::to_string_pretty(session).map_err(|e| {
        SalaryGenError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })?;
    write_private(&path, &content)
}

/// The session holds a bearer token, so only the owner may read it
#[cfg(unix)]
fn write_private(path: &Path, content: &str) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on create
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)?;
    Ok(())
}

/// Remove session.toml if present
pub fn clear_session(cfg_dir: &Path) -> Result<()> {
    let path = cfg_dir.join("session.toml");
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[company]
name = "SalaryGen"
# logo = "logo.png"          # optional, relative to this directory

[api]
base_url = "http://localhost:8081"   # staff, salary transactions, audit logs
auth_url = "http://localhost:8080"   # serves POST /login
timeout_secs = 30

[output]
output_dir = "output"        # relative to this directory, or absolute / ~/...
"#;
