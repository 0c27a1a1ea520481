use crate::error::{CrafterError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default file name for exported scripts
pub const DEFAULT_EXPORT_FILE_NAME: &str = "fivem_script.lua";

/// Content type of exported scripts
pub const EXPORT_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

/// A downloadable text file holding a generated script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptArtifact {
    pub file_name: String,
    pub content_type: String,
    pub content: String,
}

impl ScriptArtifact {
    /// Wrap `content` untouched under `file_name`
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: EXPORT_CONTENT_TYPE.to_string(),
            content: content.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// Write the artifact into `dir`, creating it if needed, and return the file path
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let dir = dir.as_ref();

        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| {
                CrafterError::Export(format!("Failed to create export directory: {}", e))
            })?;
            info!("Created export directory: {}", dir.display());
        }

        let file_path = dir.join(Self::sanitize_name(&self.file_name));
        fs::write(&file_path, &self.content).map_err(|e| {
            CrafterError::Export(format!("Failed to write '{}': {}", self.file_name, e))
        })?;

        info!("Exported {} bytes to {}", self.size(), file_path.display());
        Ok(file_path)
    }

    /// Sanitize a file name so it cannot escape the export directory
    fn sanitize_name(name: &str) -> String {
        let sanitized: String = name
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => c,
                _ => '_',
            })
            .collect();

        if sanitized.trim_matches('.').is_empty() {
            DEFAULT_EXPORT_FILE_NAME.to_string()
        } else {
            sanitized
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_preserves_content_exactly() {
        let temp_dir = TempDir::new().unwrap();
        let artifact = ScriptArtifact::new(DEFAULT_EXPORT_FILE_NAME, "-- test --");

        let path = artifact.write_to(temp_dir.path()).unwrap();

        assert_eq!(path, temp_dir.path().join("fivem_script.lua"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "-- test --");
        assert_eq!(artifact.content_type, "text/plain;charset=utf-8");
    }

    #[test]
    fn test_write_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("exports").join("today");
        let artifact = ScriptArtifact::new("client.lua", "print('x')\n");

        let path = artifact.write_to(&nested).unwrap();
        assert!(path.exists());
        assert_eq!(artifact.size(), 11);
    }

    #[test]
    fn test_name_sanitization() {
        assert_eq!(ScriptArtifact::sanitize_name("fivem_script.lua"), "fivem_script.lua");
        assert_eq!(ScriptArtifact::sanitize_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(ScriptArtifact::sanitize_name(".."), DEFAULT_EXPORT_FILE_NAME);
        assert_eq!(ScriptArtifact::sanitize_name("my script:v2.lua"), "my_script_v2.lua");
    }
}
