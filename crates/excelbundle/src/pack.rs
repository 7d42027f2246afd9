//! Resource blocks and language packs.
//!
//! Both types are immutable once built: a [`ResourceBlockBuilder`] is
//! consumed into a [`ResourceBlock`], and packs come out of
//! [`LanguagePackBuilder`](crate::LanguagePackBuilder).

use indexmap::IndexMap;

/// Key/value pairs found under one bundle path for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResourceBlock {
    bundle_path: String,
    language: String,
    /// Key → value, in first-seen key order. `None` is a key row whose
    /// value cell was missing or not a string.
    pairs: IndexMap<String, Option<String>>,
}

impl ResourceBlock {
    /// Bundle path exactly as written in the marker cell (trimmed)
    pub fn bundle_path(&self) -> &str {
        &self.bundle_path
    }

    /// Language the values were taken from
    pub fn language(&self) -> &str {
        &self.language
    }

    /// All pairs in key order
    pub fn pairs(&self) -> &IndexMap<String, Option<String>> {
        &self.pairs
    }

    /// Iterate pairs as borrowed strings
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.pairs
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }

    /// Value for `key`.
    ///
    /// Returns `None` both for unknown keys and for keys without a value;
    /// use [`ResourceBlock::contains_key`] to tell them apart.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.get(key).and_then(|value| value.as_deref())
    }

    /// Whether a key row was recorded for `key`
    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.contains_key(key)
    }

    /// Number of pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Always false for blocks produced by the scanner
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Accumulates pairs for a [`ResourceBlock`].
#[derive(Debug, Clone)]
pub struct ResourceBlockBuilder {
    bundle_path: String,
    language: String,
    pairs: IndexMap<String, Option<String>>,
}

impl ResourceBlockBuilder {
    /// Start a block for `bundle_path` in `language`
    pub fn new(bundle_path: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            bundle_path: bundle_path.into(),
            language: language.into(),
            pairs: IndexMap::new(),
        }
    }

    /// Record a pair. A repeated key replaces the earlier value and keeps
    /// its first position.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) -> &mut Self {
        self.pairs.insert(key.into(), value);
        self
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with_pair(mut self, key: impl Into<String>, value: Option<&str>) -> Self {
        self.insert(key, value.map(str::to_string));
        self
    }

    /// Number of distinct keys so far
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no pair has been recorded
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Finish the block. A block without pairs is discarded.
    pub fn finish(self) -> Option<ResourceBlock> {
        if self.pairs.is_empty() {
            return None;
        }
        Some(ResourceBlock {
            bundle_path: self.bundle_path,
            language: self.language,
            pairs: self.pairs,
        })
    }
}

/// Every block found for one language across a workbook, in sheet order.
///
/// A pack always holds at least one block.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LanguagePack {
    language: String,
    blocks: Vec<ResourceBlock>,
}

impl LanguagePack {
    /// Wrap blocks into a pack, or `None` when there are none.
    pub(crate) fn from_blocks(language: String, blocks: Vec<ResourceBlock>) -> Option<Self> {
        if blocks.is_empty() {
            None
        } else {
            Some(Self { language, blocks })
        }
    }

    /// Pack language
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Blocks in sheet order, then row order within a sheet
    pub fn blocks(&self) -> &[ResourceBlock] {
        &self.blocks
    }

    /// First block with the given bundle path
    pub fn block(&self, bundle_path: &str) -> Option<&ResourceBlock> {
        self.blocks.iter().find(|b| b.bundle_path == bundle_path)
    }

    /// Number of blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false for a pack returned by the builder
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Total number of pairs over all blocks
    pub fn pair_count(&self) -> usize {
        self.blocks.iter().map(ResourceBlock::len).sum()
    }
}

impl<'a> IntoIterator for &'a LanguagePack {
    type Item = &'a ResourceBlock;
    type IntoIter = std::slice::Iter<'a, ResourceBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}
