use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::WorkspaceResult;
use crate::logging::LogFormat;

/// Optional defaults for `condmask mask`, read from a TOML file. Flags given
/// on the command line take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaskSettings {
    pub locale: Option<String>,
    pub seed: Option<u64>,
    pub report: Option<PathBuf>,
    pub log_format: Option<LogFormat>,
}

pub fn load_settings(path: &Path) -> WorkspaceResult<MaskSettings> {
    let content = std::fs::read_to_string(path)?;
    let settings: MaskSettings = toml::from_str(&content)?;
    Ok(settings)
}
