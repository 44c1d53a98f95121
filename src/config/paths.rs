use std::env;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

const CONFIG_PATH_ENV: &str = "PANEL_CONFIG_PATH";
const CONFIG_FILE: &str = "config.json";

/// Location of config.json.
///
/// `PANEL_CONFIG_PATH` wins when set. Otherwise the file sits in the app root,
/// the parent of the folder holding the binary (`app_root/bin/transfer-panel`).
pub(super) fn get_config_path() -> PathBuf {
    let exe_path = env::current_exe().ok();
    if let Some(exe_path) = &exe_path {
        debug!(path = %exe_path.display(), "Executable path detected");
    }
    let override_path = env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    let config_path = resolve(override_path, exe_path.as_deref());
    debug!(path = %config_path.display(), "Looking for config");
    config_path
}

fn resolve(override_path: Option<PathBuf>, exe_path: Option<&Path>) -> PathBuf {
    if let Some(path) = override_path.filter(|p| !p.as_os_str().is_empty()) {
        return path;
    }

    match exe_path.and_then(Path::parent).and_then(Path::parent) {
        Some(app_root) => app_root.join(CONFIG_FILE),
        None => {
            warn!("Using fallback: looking for config.json in current directory");
            PathBuf::from(CONFIG_FILE)
        }
    }
}
