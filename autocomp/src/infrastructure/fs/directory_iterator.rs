// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Directory Iterator (§4.C)
//!
//! Turns a root path (file or directory) into a lazy, in-order sequence of
//! file paths. Directories are traversed breadth-first: every file in the
//! current directory is yielded before any subdirectory of it is descended
//! into, and subdirectories are visited in the order they were first seen
//! (a `VecDeque` used as a FIFO, not a stack). `.` and `..` are skipped by
//! construction since `read_dir` never yields them; symlinks are followed
//! (`metadata()` resolves them) and treated as files.

use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;

use autocomp_domain::AutoCompError;

/// A breadth-first, file-only walk rooted at a single path.
pub struct DirectoryIterator {
    pending_files: VecDeque<PathBuf>,
    pending_dirs: VecDeque<PathBuf>,
}

impl DirectoryIterator {
    /// Fails with `IOError` if `root` does not exist or its metadata can't
    /// be read (§4.C: "Fails with IOError if the root does not exist or is
    /// not accessible").
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, AutoCompError> {
        let root = root.into();
        let metadata = fs::metadata(&root)?;

        let mut pending_files = VecDeque::new();
        let mut pending_dirs = VecDeque::new();
        if metadata.is_dir() {
            pending_dirs.push_back(root);
        } else {
            pending_files.push_back(root);
        }

        Ok(Self { pending_files, pending_dirs })
    }

    /// Pulls the next directory in FIFO order and enqueues its entries:
    /// files go to `pending_files`, subdirectories to the back of
    /// `pending_dirs`. An unreadable subdirectory is skipped rather than
    /// failing the whole traversal (§4.C: "unreadable subdirectories
    /// encountered mid-traversal are skipped").
    fn fill_from_next_dir(&mut self) {
        while self.pending_files.is_empty() {
            let Some(dir) = self.pending_dirs.pop_front() else {
                return;
            };
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(_) => continue,
            };
            for entry in entries.flatten() {
                let path = entry.path();
                let is_dir = match fs::metadata(&path) {
                    Ok(meta) => meta.is_dir(),
                    Err(_) => continue,
                };
                if is_dir {
                    self.pending_dirs.push_back(path);
                } else {
                    self.pending_files.push_back(path);
                }
            }
        }
    }
}

impl Iterator for DirectoryIterator {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        if self.pending_files.is_empty() {
            self.fill_from_next_dir();
        }
        self.pending_files.pop_front()
    }
}
