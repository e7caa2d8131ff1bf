//! Palette of insertable node kinds

use serde::Serialize;
use weft_ast::{Category, Node, NodeError, NodeKind, Tier};

/// One insertable entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaletteEntry {
    pub kind: NodeKind,
    /// Shorthand used by palette buttons (`"db-query"`)
    pub key: &'static str,
    pub label: &'static str,
    pub category: Category,
    pub tier: Tier,
}

impl PaletteEntry {
    fn of(kind: NodeKind) -> Self {
        Self {
            kind,
            key: kind.short_name(),
            label: kind.label(),
            category: kind.category(),
            tier: kind.tier(),
        }
    }
}

/// Insertable kinds grouped by category
#[derive(Debug, Clone)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::standard()
    }
}

impl Palette {
    /// Every node kind
    #[must_use]
    pub fn standard() -> Self {
        Self {
            entries: NodeKind::ALL.iter().copied().map(PaletteEntry::of).collect(),
        }
    }

    /// Palette limited to kinds at or below `tier`
    #[must_use]
    pub fn up_to_tier(tier: Tier) -> Self {
        let mut palette = Self::standard();
        palette.entries.retain(|entry| entry.tier <= tier);
        palette
    }

    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    /// Entries in `category`, in palette order
    pub fn category(&self, category: Category) -> impl Iterator<Item = &PaletteEntry> + '_ {
        self.entries.iter().filter(move |entry| entry.category == category)
    }

    /// Categories that have at least one entry, in first-appearance order
    #[must_use]
    pub fn groups(&self) -> Vec<Category> {
        let mut groups = Vec::new();
        for entry in &self.entries {
            if !groups.contains(&entry.category) {
                groups.push(entry.category);
            }
        }
        groups
    }

    /// Look up an entry by shorthand or discriminator
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&PaletteEntry> {
        self.entries
            .iter()
            .find(|entry| entry.key == name || entry.kind.type_name() == name)
    }

    /// Build a fresh templated node for `name`
    ///
    /// # Errors
    /// Returns [`NodeError::UnknownType`] for names not on this palette.
    /// Palette buttons are generated from [`Self::entries`], so this is a
    /// programming error in the caller.
    pub fn create(&self, name: &str) -> Result<Node, NodeError> {
        match self.entry(name) {
            Some(entry) => Ok(Node::new(entry.kind)),
            None => {
                tracing::error!(name, "palette has no such entry");
                Err(NodeError::UnknownType(name.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_covers_every_kind() {
        let palette = Palette::standard();
        assert_eq!(palette.entries().len(), NodeKind::ALL.len());
        assert_eq!(
            palette.groups(),
            vec![Category::Statement, Category::Expression, Category::Domain, Category::Bridge]
        );
    }

    #[test]
    fn create_by_key_or_type() {
        let palette = Palette::standard();
        let node = palette.create("db-query").unwrap();
        assert_eq!(node.kind(), NodeKind::DbQuery);
        assert_eq!(node.tier(), Tier::DomainPrimitive);
        assert_eq!(palette.create("LetStatement").unwrap().tier(), Tier::Universal);
    }

    #[test]
    fn unknown_entry_is_an_error() {
        assert!(matches!(
            Palette::standard().create("hologram"),
            Err(NodeError::UnknownType(_))
        ));
    }

    #[test]
    fn tier_filter_drops_native_bridge() {
        let palette = Palette::up_to_tier(Tier::DomainPrimitive);
        assert!(palette.entry("native-bridge").is_none());
        assert_eq!(palette.category(Category::Bridge).count(), 0);
        assert!(palette.category(Category::Domain).count() > 0);
    }
}
