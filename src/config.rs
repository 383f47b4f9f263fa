//! User configuration (`config.toml`).
//!
//! Every problem with the file is reported as a warning and the affected
//! setting keeps its default, so a broken config never stops the program.

use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB
const MIN_COLUMN_WIDTH: usize = 4;
const MAX_COLUMN_WIDTH: usize = 40;
const DEFAULT_COLUMN_WIDTH: usize = 11;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Width of one cell when printing the sheet.
    pub column_width: usize,
    /// Print an error's message instead of the `<error>` marker.
    pub show_error_messages: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            column_width: DEFAULT_COLUMN_WIDTH,
            show_error_messages: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    display: Option<DisplaySection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DisplaySection {
    column_width: Option<i64>,
    show_error_messages: Option<bool>,
}

/// Load the config from `config_file`, or from the user config dir when no
/// path is given. Returns the config plus any warnings.
pub fn load_config(config_file: Option<&PathBuf>) -> (Config, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let Some(path) = config_file.cloned().or_else(user_config_path) else {
        return (Config::default(), warnings);
    };

    if !path.exists() {
        if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Config::default(), warnings);
    }

    match read_config_file(&path) {
        Ok(content) => {
            let (config, parse_warnings) = parse_config(&content);
            warnings.extend(
                parse_warnings
                    .into_iter()
                    .map(|w| format!("{}: {}", path.display(), w)),
            );
            (config, warnings)
        }
        Err(warning) => {
            warnings.push(warning);
            (Config::default(), warnings)
        }
    }
}

fn read_config_file(path: &Path) -> Result<String, String> {
    let meta = std::fs::metadata(path)
        .map_err(|err| format!("Failed to read metadata for {}: {}", path.display(), err))?;
    if meta.len() > MAX_CONFIG_FILE_BYTES {
        return Err(format!(
            "Refusing to read {}: file too large ({} bytes, max {})",
            path.display(),
            meta.len(),
            MAX_CONFIG_FILE_BYTES
        ));
    }
    std::fs::read_to_string(path).map_err(|err| format!("Failed to read {}: {}", path.display(), err))
}

/// Parse config text, falling back to defaults for anything invalid.
pub fn parse_config(content: &str) -> (Config, Vec<String>) {
    let mut warnings = Vec::new();
    let mut config = Config::default();

    let file = match toml::from_str::<ConfigFile>(content) {
        Ok(file) => file,
        Err(err) => {
            warnings.push(format!("Failed to parse config: {}", err));
            return (config, warnings);
        }
    };

    if let Some(display) = file.display {
        if let Some(width) = display.column_width {
            let clamped = width.clamp(MIN_COLUMN_WIDTH as i64, MAX_COLUMN_WIDTH as i64) as usize;
            if clamped as i64 != width {
                warnings.push(format!(
                    "column_width {} out of range {}..={}; using {}",
                    width, MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH, clamped
                ));
            }
            config.column_width = clamped;
        }
        if let Some(show) = display.show_error_messages {
            config.show_error_messages = show;
        }
    }

    (config, warnings)
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "tinycalc")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
