use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The fixed garment assets shipped alongside the app, in display order.
const BUILTIN_GARMENTS: &[&str] = &[
    "10-5259-684-15-1_l.webp",
    "12-5201-146-05-1_l.webp",
    "12-5224-149-87-1_l.webp",
    "13-5204-142-09-1_l.webp",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarmentCatalogEntry {
    pub filename: String,
    pub display_index: usize,
}

/// Immutable, process-wide listing of pickable garments. Keyed by
/// filename; iteration follows display order.
#[derive(Debug, Clone)]
pub struct GarmentCatalog {
    entries: IndexMap<String, GarmentCatalogEntry>,
}

impl GarmentCatalog {
    pub fn builtin() -> Self {
        Self::from_filenames(BUILTIN_GARMENTS.iter().map(|name| name.to_string()))
    }

    pub fn from_filenames(filenames: impl IntoIterator<Item = String>) -> Self {
        let mut entries = IndexMap::new();
        for (display_index, filename) in filenames.into_iter().enumerate() {
            entries.insert(
                filename.clone(),
                GarmentCatalogEntry {
                    filename,
                    display_index,
                },
            );
        }
        Self { entries }
    }

    pub fn get(&self, filename: &str) -> Option<&GarmentCatalogEntry> {
        self.entries.get(filename)
    }

    pub fn by_index(&self, display_index: usize) -> Option<&GarmentCatalogEntry> {
        self.entries.get_index(display_index).map(|(_, entry)| entry)
    }

    pub fn entries(&self) -> impl Iterator<Item = &GarmentCatalogEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for GarmentCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
