//! # gesture_store
//!
//! Durable storage for a [`GestureLibrary`].
//!
//! The on-disk format is a single JSON document:
//!
//! ```json
//! {
//!   "version": 1,
//!   "gestures": [
//!     {
//!       "name": "fist",
//!       "samples": [[[0.51, 0.62, -0.01], [0.49, 0.55, -0.02]]],
//!       "action": { "type": "keyboard", "value": "space" }
//!     }
//!   ]
//! }
//! ```
//!
//! Every mutating call persists immediately and leaves a fresh snapshot in
//! [`LibraryStore::library`] for the caller to hand to the matcher.
//!
//! ```rust,no_run
//! use gesture_store::{LibraryStore, MergePolicy};
//!
//! let mut store = LibraryStore::open("gestures/gestures.json").unwrap();
//! store.import("shared.json", MergePolicy::KeepExisting).unwrap();
//! println!("{} gestures", store.library().len());
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use gesture_core::{Gesture, GestureLibrary};

/// Current file format version.
pub const FORMAT_VERSION: u32 = 1;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed gesture file {}: {source}", path.display())]
    Json {
        path:   PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid gesture: {0}")]
    Library(#[from] gesture_core::Error),

    #[error("no gesture named '{0}'")]
    UnknownGesture(String),

    #[error("no gestures to export")]
    NothingToExport,

    #[error("unsupported gesture file version {found} (expected {expected})", expected = FORMAT_VERSION)]
    UnsupportedVersion { found: u32 },
}

// ════════════════════════════════════════════════════════════════════════════
// File format
// ════════════════════════════════════════════════════════════════════════════

#[derive(Serialize)]
struct LibraryFileRef<'a> {
    version:  u32,
    gestures: Vec<&'a Gesture>,
}

#[derive(Deserialize)]
struct LibraryFile {
    version:  u32,
    gestures: Vec<Gesture>,
}

/// Read a library file.  Gesture invariants are checked while parsing.
pub fn read_library(path: impl AsRef<Path>) -> Result<GestureLibrary> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| Error::Io { path: path.into(), source })?;
    parse_library(&text).map_err(|e| match e {
        Error::Json { source, .. } => Error::Json { path: path.into(), source },
        other => other,
    })
}

/// Parse a library document held in memory.
pub fn parse_library(text: &str) -> Result<GestureLibrary> {
    let file: LibraryFile = serde_json::from_str(text)
        .map_err(|source| Error::Json { path: PathBuf::new(), source })?;
    if file.version != FORMAT_VERSION {
        return Err(Error::UnsupportedVersion { found: file.version });
    }
    Ok(file.gestures.into_iter().collect())
}

/// Write `library` to `path`, creating parent directories.
///
/// The document goes to a temporary sibling first and is renamed over the
/// target, so a crash never leaves a half-written library behind.
pub fn write_library(path: impl AsRef<Path>, library: &GestureLibrary) -> Result<()> {
    let path = path.as_ref();
    let io_err = |source| Error::Io { path: path.into(), source };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let doc = LibraryFileRef { version: FORMAT_VERSION, gestures: library.iter().collect() };
    let json = serde_json::to_vec_pretty(&doc)
        .map_err(|source| Error::Json { path: path.into(), source })?;

    let tmp = path.with_extension("json.tmp");
    let written = fs::File::create(&tmp)
        .and_then(|mut f| {
            f.write_all(&json)?;
            f.sync_all()
        })
        .and_then(|()| fs::rename(&tmp, path));
    if let Err(source) = written {
        let _ = fs::remove_file(&tmp);
        return Err(io_err(source));
    }
    debug!(path = %path.display(), gestures = library.len(), "library written");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// LibraryStore
// ════════════════════════════════════════════════════════════════════════════

/// How [`LibraryStore::import`] treats names that already exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergePolicy {
    /// Imported gestures replace same-name gestures.
    Overwrite,
    /// Only names not already present are added.
    KeepExisting,
}

/// A gesture library bound to a file.
#[derive(Debug)]
pub struct LibraryStore {
    path:    PathBuf,
    library: GestureLibrary,
}

impl LibraryStore {
    /// Load `path`, or start empty if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let library = if path.exists() {
            read_library(&path)?
        } else {
            debug!(path = %path.display(), "no library file yet, starting empty");
            GestureLibrary::new()
        };
        info!(path = %path.display(), gestures = library.len(), "library loaded");
        Ok(LibraryStore { path, library })
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn library(&self) -> &GestureLibrary { &self.library }

    /// Add or overwrite a gesture, then persist.
    pub fn add(&mut self, gesture: Gesture) -> Result<()> {
        let name = gesture.name().to_string();
        let mut next = self.library.clone();
        let replaced = next.insert(gesture).is_some();
        self.commit(next)?;
        info!(gesture = %name, replaced, "gesture saved");
        Ok(())
    }

    /// Remove a gesture, then persist.
    pub fn delete(&mut self, name: &str) -> Result<Gesture> {
        let mut next = self.library.clone();
        let removed = next.remove(name).ok_or_else(|| Error::UnknownGesture(name.to_string()))?;
        self.commit(next)?;
        info!(gesture = %name, "gesture deleted");
        Ok(removed)
    }

    /// Merge gestures from another file, then persist.
    ///
    /// Returns how many gestures were taken from the import.
    pub fn import(&mut self, path: impl AsRef<Path>, policy: MergePolicy) -> Result<usize> {
        let path = path.as_ref();
        let incoming = read_library(path)?;
        let mut next = self.library.clone();
        let mut taken = 0;
        for gesture in incoming {
            if policy == MergePolicy::KeepExisting && next.contains(gesture.name()) {
                continue;
            }
            next.insert(gesture);
            taken += 1;
        }
        self.commit(next)?;
        info!(from = %path.display(), taken, ?policy, "gestures imported");
        Ok(taken)
    }

    /// Write the current library to another file.
    pub fn export(&self, path: impl AsRef<Path>) -> Result<()> {
        if self.library.is_empty() {
            return Err(Error::NothingToExport);
        }
        write_library(path.as_ref(), &self.library)?;
        info!(to = %path.as_ref().display(), gestures = self.library.len(), "gestures exported");
        Ok(())
    }

    /// Re-read the backing file, discarding the in-memory copy.
    pub fn reload(&mut self) -> Result<()> {
        *self = LibraryStore::open(self.path.clone())?;
        Ok(())
    }

    // Persist first so memory never runs ahead of disk.
    fn commit(&mut self, next: GestureLibrary) -> Result<()> {
        write_library(&self.path, &next)?;
        self.library = next;
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
