use std::path::Path;

use super::{WorkspaceError, WorkspaceResult};

/// What a path given on the command line is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    Rules,
    Input,
    Output,
}

impl FileRole {
    fn label(self) -> &'static str {
        match self {
            Self::Rules => "rules",
            Self::Input => "input",
            Self::Output => "output",
        }
    }

    fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Rules => &["json", "toml"],
            Self::Input | Self::Output => &["json"],
        }
    }
}

/// Reject paths whose extension does not fit `role` (case-insensitive).
pub fn require_extension(path: &Path, role: FileRole) -> WorkspaceResult<()> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let allowed = role.extensions();

    match extension {
        Some(ext) if allowed.contains(&ext.as_str()) => Ok(()),
        _ => Err(WorkspaceError::InvalidPath(format!(
            "{} file {} must have extension .{}",
            role.label(),
            path.display(),
            allowed.join(" or .")
        ))),
    }
}
