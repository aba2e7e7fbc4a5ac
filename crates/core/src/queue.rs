//! Pending input files, partitioned by media category.
//!
//! The queue is owned by the caller. A run never reads it directly: the
//! orchestrator works from [`JobQueue::snapshot`], so edits made while a run
//! is in progress only affect the next run.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::media::MediaCategory;

/// Insertion-ordered, duplicate-free list of paths for one category.
#[derive(Debug, Default, Clone)]
struct PathList {
    order: Vec<PathBuf>,
    members: HashSet<PathBuf>,
}

impl PathList {
    fn insert(&mut self, path: PathBuf) -> bool {
        if self.members.contains(&path) {
            return false;
        }
        self.members.insert(path.clone());
        self.order.push(path);
        true
    }

    fn remove(&mut self, path: &Path) -> bool {
        if !self.members.remove(path) {
            return false;
        }
        self.order.retain(|p| p != path);
        true
    }

    fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }
}

/// Two disjoint queues of source paths, one per [`MediaCategory`].
#[derive(Debug, Default, Clone)]
pub struct JobQueue {
    images: PathList,
    audio_video: PathList,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&self, category: MediaCategory) -> &PathList {
        match category {
            MediaCategory::Image => &self.images,
            MediaCategory::AudioVideo => &self.audio_video,
        }
    }

    fn list_mut(&mut self, category: MediaCategory) -> &mut PathList {
        match category {
            MediaCategory::Image => &mut self.images,
            MediaCategory::AudioVideo => &mut self.audio_video,
        }
    }

    /// Adds `path` to the category's queue.
    ///
    /// Returns `false` (and changes nothing) when the path is already queued
    /// or is not an existing file.
    pub fn add(&mut self, category: MediaCategory, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "Ignoring path that is not a file");
            return false;
        }
        self.list_mut(category).insert(path)
    }

    /// Adds every path, returning how many were actually added.
    pub fn add_many<I, P>(&mut self, category: MediaCategory, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        paths
            .into_iter()
            .map(|p| self.add(category, p))
            .filter(|added| *added)
            .count()
    }

    /// Removes a single path. Returns whether it was queued.
    pub fn remove(&mut self, category: MediaCategory, path: &Path) -> bool {
        self.list_mut(category).remove(path)
    }

    /// Empties the category's queue.
    pub fn clear(&mut self, category: MediaCategory) {
        self.list_mut(category).clear();
    }

    /// Copy of the queued paths in insertion order.
    pub fn snapshot(&self, category: MediaCategory) -> Vec<PathBuf> {
        self.list(category).order.clone()
    }

    pub fn count(&self, category: MediaCategory) -> usize {
        self.list(category).order.len()
    }

    pub fn is_empty(&self, category: MediaCategory) -> bool {
        self.count(category) == 0
    }

    pub fn contains(&self, category: MediaCategory, path: &Path) -> bool {
        self.list(category).members.contains(path)
    }

    /// Display label such as `"3 images"`; empty when nothing is queued.
    pub fn count_label(&self, category: MediaCategory) -> String {
        match self.count(category) {
            0 => String::new(),
            n => format!("{} {}", n, category.label()),
        }
    }
}
