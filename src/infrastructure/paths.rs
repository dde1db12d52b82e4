//! Path manipulation utilities for Zellij sandbox environment.
//!
//! Zellij mounts the host filesystem under `/host` inside the plugin sandbox.
//! These helpers locate the plugin's data directory (favorites store and trace
//! files) and resolve user-supplied paths such as `theme_file`.

use std::path::PathBuf;

/// Returns the data directory for Reelgrid storage and traces.
///
/// The directory is `/host/.local/share/zellij/reelgrid` inside the sandbox.
/// `/host` points to the cwd of the last focused terminal, so this usually
/// resolves to `~/.local/share/zellij/reelgrid` on the host. The favorites store
/// `favorites.json` lives here.
///
/// # Examples
///
/// ```
/// use reelgrid::infrastructure::get_data_dir;
///
/// let data_dir = get_data_dir();
/// assert_eq!(data_dir.to_str().unwrap(), "/host/.local/share/zellij/reelgrid");
/// ```
#[must_use]
pub fn get_data_dir() -> PathBuf {
    PathBuf::from("/host/.local/share/zellij").join("reelgrid")
}

/// Expands tilde paths to use the `/host` prefix for Zellij sandbox.
///
/// In the sandbox the host's home directory (`~`) maps to `/host`, so a
/// configured `theme_file = "~/themes/dark.toml"` is read from
/// `/host/themes/dark.toml`. Other paths are returned unchanged.
///
/// # Parameters
///
/// * `path` - Path as written in the plugin configuration
///
/// # Returns
///
/// The sandbox path to open.
///
/// # Examples
///
/// ```
/// use reelgrid::infrastructure::expand_tilde;
///
/// assert_eq!(expand_tilde("~/themes/dark.toml"), "/host/themes/dark.toml");
/// assert_eq!(expand_tilde("~"), "/host");
/// assert_eq!(expand_tilde("/absolute/path"), "/absolute/path");
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> String {
    if path.starts_with("~/") {
        path.replacen('~', "/host", 1)
    } else if path == "~" {
        "/host".to_string()
    } else {
        path.to_string()
    }
}
