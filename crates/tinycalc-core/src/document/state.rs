use super::store::CellStore;
use crate::error::Result;
use std::path::PathBuf;

/// A spreadsheet: the cell store plus the file it belongs to.
///
/// All edits go through [`Sheet::set_cell`], which keeps the dependency graph
/// and every cached value consistent before it returns.
pub struct Sheet {
    pub(crate) store: CellStore,
    /// Current file path
    pub file_path: Option<PathBuf>,
    /// Whether the sheet has been modified since the last load or save
    pub modified: bool,
}

impl Sheet {
    /// Create an empty sheet.
    ///
    /// This constructor is side-effect free: it does not touch the filesystem.
    pub fn new() -> Self {
        Sheet {
            store: CellStore::new(),
            file_path: None,
            modified: false,
        }
    }

    /// Create a sheet and load a file if provided.
    ///
    /// A path that does not exist yet becomes the save target of an empty sheet.
    pub fn with_file(path: Option<PathBuf>) -> Result<Self> {
        let mut sheet = Self::new();
        if let Some(p) = path {
            if p.exists() {
                sheet.load_file(&p)?;
            } else {
                sheet.file_path = Some(p);
            }
        }
        Ok(sheet)
    }

    pub fn store(&self) -> &CellStore {
        &self.store
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}
