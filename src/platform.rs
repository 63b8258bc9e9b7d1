// LinkSaver platform paths
// Linux:   $XDG_CONFIG_HOME/linksaver, $XDG_DATA_HOME/linksaver
// macOS:   ~/Library/Application Support/LinkSaver
// Windows: %APPDATA%/LinkSaver

use std::env;
use std::path::PathBuf;

/// Overrides the data directory when set.
pub const DATA_DIR_ENV: &str = "LINKSAVER_DATA_DIR";

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

#[cfg(target_os = "linux")]
fn xdg_dir(var: &str, fallback: &[&str]) -> PathBuf {
    match env::var(var) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir).join("linksaver"),
        _ => fallback
            .iter()
            .fold(home_dir(), |path, part| path.join(part))
            .join("linksaver"),
    }
}

#[cfg(target_os = "windows")]
fn appdata_dir() -> PathBuf {
    let appdata =
        env::var("APPDATA").unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
    PathBuf::from(appdata).join("LinkSaver")
}

/// Directory holding `settings.json`.
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        xdg_dir("XDG_CONFIG_HOME", &[".config"])
    }
    #[cfg(target_os = "macos")]
    {
        home_dir().join("Library").join("Application Support").join("LinkSaver")
    }
    #[cfg(target_os = "windows")]
    {
        appdata_dir()
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        home_dir().join(".linksaver")
    }
}

/// Directory holding the storage database. `LINKSAVER_DATA_DIR` wins when set.
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    #[cfg(target_os = "linux")]
    {
        xdg_dir("XDG_DATA_HOME", &[".local", "share"])
    }
    #[cfg(target_os = "macos")]
    {
        home_dir().join("Library").join("Application Support").join("LinkSaver")
    }
    #[cfg(target_os = "windows")]
    {
        appdata_dir()
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        home_dir().join(".linksaver")
    }
}
