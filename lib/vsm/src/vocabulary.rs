// Insertion-ordered feature intern set; positions are matrix columns
use indexmap::IndexSet;
use samos_core::Feature;

#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    entries: IndexSet<Feature, ahash::RandomState>,
}

impl Vocabulary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Column of `feature`, appending it when new
    pub fn intern(&mut self, feature: Feature) -> u32 {
        let (index, _) = self.entries.insert_full(feature);
        index as u32
    }

    #[inline]
    pub fn index_of(&self, feature: &Feature) -> Option<u32> {
        self.entries.get_index_of(feature).map(|i| i as u32)
    }

    #[inline]
    pub fn get(&self, column: u32) -> Option<&Feature> {
        self.entries.get_index(column as usize)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.entries.iter()
    }
}
