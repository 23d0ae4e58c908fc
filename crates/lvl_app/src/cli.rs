use std::path::PathBuf;

use lvl_scene::ImportConfig;

use crate::error::AppError;

pub const USAGE: &str =
    "usage: lvl_app [--config <file.json>] [--dry-run] <level.json> <output_dir>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub level: String,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
    /// Import without writing anything to disk
    pub dry_run: bool,
}

impl Args {
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, AppError> {
        let mut positional = Vec::new();
        let mut config = None;
        let mut dry_run = false;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let path = args
                        .next()
                        .ok_or_else(|| AppError::Usage("--config needs a file".to_string()))?;
                    config = Some(PathBuf::from(path));
                }
                "--dry-run" => dry_run = true,
                flag if flag.starts_with("--") => {
                    return Err(AppError::Usage(format!("unknown option {flag}")));
                }
                _ => positional.push(arg),
            }
        }

        let [level, output]: [String; 2] = positional.try_into().map_err(|_| {
            AppError::Usage("expected a level file and an output directory".to_string())
        })?;
        Ok(Args {
            level,
            output: PathBuf::from(output),
            config,
            dry_run,
        })
    }
}

/// Reads the optional config file and points it at the requested output.
pub fn load_config(args: &Args) -> Result<ImportConfig, AppError> {
    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| AppError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&text).map_err(|source| AppError::Config {
                path: path.clone(),
                source,
            })?
        }
        None => ImportConfig::default(),
    };
    Ok(config.with_output_dir(&args.output))
}
