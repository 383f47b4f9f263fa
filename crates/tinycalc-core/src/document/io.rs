use super::Sheet;
use crate::error::{CoreError, Result};
use crate::storage::{parse_sheet, write_sheet};
use std::path::{Path, PathBuf};

impl Sheet {
    /// Save to current file path.
    /// Returns the path saved to.
    pub fn save_file(&mut self) -> Result<PathBuf> {
        let Some(path) = self.file_path.clone() else {
            return Err(CoreError::NoFilePath);
        };
        write_sheet(&path, self)?;
        self.modified = false;
        tracing::debug!(path = %path.display(), "saved sheet");
        Ok(path)
    }

    /// Save to `path` and make it the current file path.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        write_sheet(path, self)?;
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        tracing::debug!(path = %path.display(), "saved sheet");
        Ok(())
    }

    /// Load from file, replacing the whole sheet.
    ///
    /// The file is read and applied to a fresh sheet first, so a missing or
    /// unreadable file leaves this sheet unchanged.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let entries = parse_sheet(path)?;

        let mut loaded = Sheet::new();
        for (at, content) in &entries {
            loaded.set_cell(*at, content)?;
        }
        // Values must not depend on the order cells appear in the file.
        loaded.recalculate();

        loaded.file_path = Some(path.to_path_buf());
        loaded.modified = false;
        *self = loaded;
        tracing::debug!(path = %path.display(), cells = entries.len(), "loaded sheet");
        Ok(())
    }
}
