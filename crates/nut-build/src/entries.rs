//! Entry point discovery.
//!
//! Entries live in `<cwd>/<src>/<entries>/`. Each script file is one entry
//! named after its stem; each directory holding an `index` script is one
//! entry named after the directory.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{BuildError, Result};

const SCRIPT_EXTENSIONS: [&str; 4] = ["js", "jsx", "ts", "tsx"];

/// One entry point handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryDescriptor {
    pub name: String,
    pub path: PathBuf,
}

/// Where to look for entries, and which to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLocation {
    pub cwd: PathBuf,
    pub src_directory: PathBuf,
    pub entry_directory: PathBuf,
    /// Keep only these entry names.
    pub only: Option<Vec<String>>,
}

impl EntryLocation {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            src_directory: PathBuf::from("src"),
            entry_directory: PathBuf::from("entries"),
            only: None,
        }
    }

    pub fn directory(&self) -> PathBuf {
        self.cwd.join(&self.src_directory).join(&self.entry_directory)
    }
}

/// Collect the entries under a location, sorted by name.
pub async fn collect_entries(location: &EntryLocation) -> Result<Vec<EntryDescriptor>> {
    let dir = location.directory();
    let mut read_dir = match tokio::fs::read_dir(&dir).await {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(BuildError::EntriesNotFound(dir));
        }
        Err(e) => return Err(e.into()),
    };

    let mut entries = Vec::new();
    while let Some(item) = read_dir.next_entry().await? {
        let path = item.path();
        let file_type = item.file_type().await?;

        let entry = if file_type.is_dir() {
            directory_entry(&path).await
        } else if is_script(&path) {
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .map(|name| EntryDescriptor {
                    name: name.to_string(),
                    path: path.clone(),
                })
        } else {
            None
        };

        if let Some(entry) = entry {
            entries.push(entry);
        }
    }

    if let Some(only) = &location.only {
        entries.retain(|entry| only.contains(&entry.name));
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    debug!(dir = %dir.display(), count = entries.len(), "entries collected");
    Ok(entries)
}

async fn directory_entry(dir: &Path) -> Option<EntryDescriptor> {
    let name = dir.file_name()?.to_str()?.to_string();
    for ext in SCRIPT_EXTENSIONS {
        let index = dir.join(format!("index.{ext}"));
        if tokio::fs::metadata(&index).await.is_ok_and(|meta| meta.is_file()) {
            return Some(EntryDescriptor { name, path: index });
        }
    }
    None
}

fn is_script(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext))
}
