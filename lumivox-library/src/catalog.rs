//! Voice-note catalog with weighted random selection
//!
//! Scans the storage root for audio files, sorts them into three categories
//! by filename prefix, and draws a random note for the lottery.

use crate::random::RandomSource;
use crate::storage::{Storage, StorageError};
use thiserror::Error;

/// Suffix every catalogued file carries
pub const AUDIO_EXTENSION: &str = ".wav";

/// Maximum number of files per category
pub const CATEGORY_CAPACITY: usize = 10;

/// Voice-note category, identified by filename prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    A,
    B,
    C,
}

impl Category {
    /// All categories, in fallback priority order
    pub const ALL: [Category; 3] = [Category::A, Category::B, Category::C];

    /// Case-sensitive filename prefix
    pub fn prefix(self) -> &'static str {
        match self {
            Category::A => "voice_a_",
            Category::B => "voice_b_",
            Category::C => "voice_c_",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Category::A => 0,
            Category::B => 1,
            Category::C => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::A => "A",
            Category::B => "B",
            Category::C => "C",
        }
    }

    /// Classify a filename. The name may carry a leading `/`.
    pub fn classify(name: &str) -> Option<Self> {
        if !name.ends_with(AUDIO_EXTENSION) {
            return None;
        }
        let bare = name.strip_prefix('/').unwrap_or(name);
        Self::ALL.into_iter().find(|c| bare.starts_with(c.prefix()))
    }
}

/// Errors raised when building a catalog
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Category {category:?} is full ({capacity} entries), dropping {name}")]
    CapacityExceeded {
        category: Category,
        capacity: usize,
        name: String,
    },
}

/// Summary of a storage scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Files added to a category
    pub catalogued: usize,
    /// Files matching no category
    pub ignored: usize,
    /// Files matching a full category
    pub dropped: usize,
}

/// Categorized voice notes in discovery order
#[derive(Debug, Clone, Default)]
pub struct AudioCatalog {
    categories: [Vec<String>; 3],
}

impl AudioCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from every file the storage lists
    pub fn scan(storage: &dyn Storage) -> Result<(Self, ScanReport), StorageError> {
        let entries = storage.list()?;
        let mut catalog = Self::new();
        let mut report = ScanReport::default();

        for entry in entries {
            let Some(category) = Category::classify(&entry.name) else {
                tracing::debug!(name = %entry.name, "ignoring uncategorized file");
                report.ignored += 1;
                continue;
            };

            match catalog.insert(category, entry.name) {
                Ok(()) => report.catalogued += 1,
                Err(e) => {
                    tracing::warn!("{}", e);
                    report.dropped += 1;
                }
            }
        }

        tracing::info!(
            a = catalog.category(Category::A).len(),
            b = catalog.category(Category::B).len(),
            c = catalog.category(Category::C).len(),
            ignored = report.ignored,
            dropped = report.dropped,
            "catalog scan complete"
        );

        Ok((catalog, report))
    }

    /// Append a file to a category, refusing once the category is full
    pub fn insert(&mut self, category: Category, name: String) -> Result<(), CatalogError> {
        let list = &mut self.categories[category.index()];
        if list.len() >= CATEGORY_CAPACITY {
            return Err(CatalogError::CapacityExceeded {
                category,
                capacity: CATEGORY_CAPACITY,
                name,
            });
        }
        list.push(name);
        Ok(())
    }

    /// Files of one category in discovery order
    pub fn category(&self, category: Category) -> &[String] {
        &self.categories[category.index()]
    }

    /// Total number of catalogued files
    pub fn len(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Draw a voice note.
    ///
    /// A category is drawn uniformly, then a file within it. When the drawn
    /// category is empty the first non-empty category in priority order is
    /// used instead. Returns `None` only when every category is empty.
    pub fn select<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        let drawn = Category::from_index(rng.next_below(Category::ALL.len()))?;

        let category = if self.category(drawn).is_empty() {
            let fallback = Category::ALL
                .into_iter()
                .find(|c| !self.category(*c).is_empty())?;
            tracing::debug!(
                drawn = drawn.label(),
                fallback = fallback.label(),
                "drawn category empty"
            );
            fallback
        } else {
            drawn
        };

        let list = self.category(category);
        list.get(rng.next_below(list.len())).map(String::as_str)
    }
}
