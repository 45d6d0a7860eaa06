use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

pub const STATE_DIR_ENV: &str = "CHRONOS_PLANNER_STATE_DIR";
const APP_DIR: &str = "chronos_planner";

/// Resolves the state directory: CLI flag, then the environment, then platform defaults.
pub fn resolve_state_dir(cli_path: Option<PathBuf>) -> PathBuf {
	resolve_with(cli_path, |key| env::var_os(key))
}

fn resolve_with(cli_path: Option<PathBuf>, var: impl Fn(&str) -> Option<OsString>) -> PathBuf {
	if let Some(path) = cli_path {
		return absolutize(path);
	}

	if let Some(path) = var(STATE_DIR_ENV) {
		let path = PathBuf::from(path);
		if !path.as_os_str().is_empty() {
			return absolutize(path);
		}
	}

	#[cfg(target_os = "windows")]
	{
		if let Some(path) = var("LOCALAPPDATA") {
			return PathBuf::from(path).join(APP_DIR);
		}
	}

	if let Some(path) = var("XDG_STATE_HOME") {
		if !path.is_empty() {
			return PathBuf::from(path).join(APP_DIR);
		}
	}

	if let Some(path) = var("HOME") {
		return PathBuf::from(path).join(".local").join("state").join(APP_DIR);
	}

	absolutize(PathBuf::from(format!(".{APP_DIR}")))
}

fn absolutize(path: PathBuf) -> PathBuf {
	let path = if path.is_absolute() {
		path
	} else if let Ok(cwd) = env::current_dir() {
		cwd.join(path)
	} else {
		path
	};

	if path.exists() {
		fs::canonicalize(&path).unwrap_or(path)
	} else {
		path
	}
}
