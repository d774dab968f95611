//! Lazily expanded directory model behind the file tree panel.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::app::controllers::coordinator::Coordinator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

pub struct DirectoryTree {
    root: PathBuf,
    /// Listings of every directory opened so far, keyed by absolute path.
    expanded: BTreeMap<PathBuf, Vec<TreeEntry>>,
}

impl DirectoryTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let mut tree = Self {
            root: PathBuf::new(),
            expanded: BTreeMap::new(),
        };
        tree.change_root(root.into());
        tree
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Point the tree at a new directory, forgetting every expanded node.
    pub fn change_root(&mut self, root: PathBuf) {
        self.root = std::path::absolute(&root).unwrap_or(root);
        self.expanded.clear();
        let root = self.root.clone();
        if let Err(err) = self.expand(&root) {
            tracing::warn!(%err, root = %self.root.display(), "cannot list tree root");
        }
        tracing::info!(root = %self.root.display(), "tree root changed");
    }

    /// List `dir` once; later calls return the cached listing.
    pub fn expand(&mut self, dir: &Path) -> io::Result<&[TreeEntry]> {
        if !self.expanded.contains_key(dir) {
            let listing = read_listing(dir)?;
            self.expanded.insert(dir.to_path_buf(), listing);
        }
        Ok(self.expanded.get(dir).map(Vec::as_slice).unwrap_or_default())
    }

    pub fn collapse(&mut self, dir: &Path) {
        let prefix = dir.to_path_buf();
        self.expanded.retain(|path, _| !path.starts_with(&prefix) || *path == self.root);
    }

    pub fn is_expanded(&self, dir: &Path) -> bool {
        self.expanded.contains_key(dir)
    }

    pub fn entries(&self, dir: &Path) -> Option<&[TreeEntry]> {
        self.expanded.get(dir).map(Vec::as_slice)
    }

    /// Re-read every expanded directory, dropping those that disappeared.
    pub fn refresh(&mut self) {
        let dirs: Vec<PathBuf> = self.expanded.keys().cloned().collect();
        for dir in dirs {
            match read_listing(&dir) {
                Ok(listing) => {
                    self.expanded.insert(dir, listing);
                }
                Err(err) => {
                    tracing::debug!(%err, dir = %dir.display(), "dropping vanished directory");
                    self.expanded.remove(&dir);
                }
            }
        }
    }

    /// Double-click on an entry: files are opened, directories ignored.
    pub fn activate(path: &Path, coordinator: &Coordinator) -> bool {
        if path.is_file() {
            coordinator.open_path(path.to_path_buf());
            true
        } else {
            false
        }
    }

    /// Expanded entries in display order with their depth below the root.
    pub fn visible_entries(&self) -> Vec<(usize, &TreeEntry)> {
        let mut out = Vec::new();
        self.collect_visible(&self.root, 0, &mut out);
        out
    }

    fn collect_visible<'a>(&'a self, dir: &Path, depth: usize, out: &mut Vec<(usize, &'a TreeEntry)>) {
        let Some(entries) = self.expanded.get(dir) else {
            return;
        };
        for entry in entries {
            out.push((depth, entry));
            if entry.is_dir {
                self.collect_visible(&entry.path, depth + 1, out);
            }
        }
    }
}

/// Directories first, then files, each group by name.
fn read_listing(dir: &Path) -> io::Result<Vec<TreeEntry>> {
    let mut entries: Vec<TreeEntry> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| {
            let path = entry.path();
            TreeEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: path.is_dir(),
                path,
            }
        })
        .collect();
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
    Ok(entries)
}
