//! Item name → page identifier resolution.
//!
//! Lookup goes through a small bundled table first. ASCII input that misses
//! the table falls back to a title-case guess which is never checked against
//! the site; callers can tell the two apart through [`Provenance`].

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

const BUNDLED_TABLE: &str = include_str!("../data/identifiers.yaml");

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("identifier table is not valid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("keys {first:?} and {second:?} collide after normalisation")]
    DuplicateKey { first: String, second: String },
    #[error("entry {name:?} has an empty identifier")]
    EmptyIdentifier { name: String },
    #[error("entry with an empty name (identifier {id:?})")]
    EmptyName { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdentifierEntry {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct TableFile {
    #[serde(default)]
    version: Option<String>,
    entries: Vec<IdentifierEntry>,
}

/// Ordered, validated name table. Immutable once built.
#[derive(Debug, Clone)]
pub struct IdentifierTable {
    version: Option<String>,
    entries: Vec<IdentifierEntry>,
    normalized: Vec<String>,
}

impl IdentifierTable {
    /// The table shipped inside the crate.
    pub fn bundled() -> Result<Self, TableError> {
        Self::from_yaml_str(BUNDLED_TABLE)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, TableError> {
        let file: TableFile = serde_yaml::from_str(yaml)?;
        let mut table = Self::from_entries(file.entries)?;
        table.version = file.version;
        Ok(table)
    }

    /// Build a table, rejecting entries whose keys are indistinguishable
    /// after normalisation.
    pub fn from_entries(entries: Vec<IdentifierEntry>) -> Result<Self, TableError> {
        let mut seen: HashMap<String, usize> = HashMap::with_capacity(entries.len());
        let mut normalized = Vec::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            if entry.id.trim().is_empty() {
                return Err(TableError::EmptyIdentifier {
                    name: entry.name.clone(),
                });
            }
            let key = normalize(&entry.name);
            if key.is_empty() {
                return Err(TableError::EmptyName {
                    id: entry.id.clone(),
                });
            }
            if let Some(&prev) = seen.get(&key) {
                return Err(TableError::DuplicateKey {
                    first: entries[prev].name.clone(),
                    second: entry.name.clone(),
                });
            }
            seen.insert(key.clone(), idx);
            normalized.push(key);
        }
        Ok(Self {
            version: None,
            entries,
            normalized,
        })
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IdentifierEntry] {
        &self.entries
    }

    /// First entry (in table order) whose normalised key equals `key`.
    fn lookup_normalized(&self, key: &str) -> Option<&str> {
        self.normalized
            .iter()
            .position(|k| k == key)
            .map(|idx| self.entries[idx].id.as_str())
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.lookup_normalized(&normalize(name))
    }
}

/// Lowercase, drop apostrophes and every whitespace character.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !is_apostrophe(*c) && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn is_apostrophe(c: char) -> bool {
    matches!(c, '\'' | '\u{2019}')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Found in the identifier table.
    TableHit,
    /// Built by title-casing ASCII input. May not exist on the site.
    HeuristicGuess,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub identifier: String,
    pub provenance: Provenance,
}

impl Resolution {
    pub fn is_verified(&self) -> bool {
        self.provenance == Provenance::TableHit
    }
}

/// Stateless resolver over a shared table. Cheap to clone.
#[derive(Debug, Clone)]
pub struct IdentifierResolver {
    table: Arc<IdentifierTable>,
}

impl IdentifierResolver {
    pub fn new(table: Arc<IdentifierTable>) -> Self {
        Self { table }
    }

    /// Resolver over the bundled table.
    pub fn bundled() -> Result<Self, TableError> {
        Ok(Self::new(Arc::new(IdentifierTable::bundled()?)))
    }

    pub fn table(&self) -> &IdentifierTable {
        &self.table
    }

    /// Map free text to a page identifier.
    ///
    /// Blank input and unmatched non-ASCII input yield `None`.
    pub fn resolve(&self, name: &str) -> Option<Resolution> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return None;
        }

        let key = normalize(trimmed);
        if key.is_empty() {
            return None;
        }
        if let Some(id) = self.table.lookup_normalized(&key) {
            tracing::debug!(input = %trimmed, identifier = %id, "resolver.table_hit");
            return Some(Resolution {
                identifier: id.to_string(),
                provenance: Provenance::TableHit,
            });
        }

        let ascii_only = trimmed
            .chars()
            .filter(|c| !is_apostrophe(*c) && !c.is_whitespace())
            .all(|c| c.is_ascii());
        if !ascii_only {
            tracing::warn!(input = %trimmed, "resolver.no_match");
            return None;
        }

        let guess = title_case_guess(trimmed)?;
        tracing::info!(input = %trimmed, identifier = %guess, "resolver.heuristic_guess");
        Some(Resolution {
            identifier: guess,
            provenance: Provenance::HeuristicGuess,
        })
    }

    pub fn resolve_identifier(&self, name: &str) -> Option<String> {
        self.resolve(name).map(|r| r.identifier)
    }
}

fn title_case_guess(text: &str) -> Option<String> {
    let stripped: String = text.chars().filter(|c| !is_apostrophe(*c)).collect();
    let words: Vec<String> = stripped.split_whitespace().map(capitalize).collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join("_"))
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> IdentifierResolver {
        IdentifierResolver::bundled().expect("bundled table loads")
    }

    #[test]
    fn bundled_table_loads_with_version() {
        let table = IdentifierTable::bundled().unwrap();
        assert_eq!(table.version(), Some("2025.1"));
        assert!(table.len() >= 20);
    }

    #[test]
    fn case_apostrophes_and_spacing_are_ignored() {
        let r = resolver();
        for input in ["KAOM'S HEART", "kaom's heart", "  kaom's  heart  ", "Kaom’s Heart"] {
            let res = r.resolve(input).unwrap();
            assert_eq!(res.identifier, "Kaoms_Heart", "input {input:?}");
            assert!(res.is_verified());
        }
    }

    #[test]
    fn korean_names_and_abbreviations_hit_the_table() {
        let r = resolver();
        assert_eq!(r.resolve_identifier("카옴의 심장").as_deref(), Some("Kaoms_Heart"));
        assert_eq!(r.resolve_identifier("카옴의심장").as_deref(), Some("Kaoms_Heart"));
        assert_eq!(r.resolve_identifier("마피").as_deref(), Some("Mageblood"));
        assert_eq!(r.resolve_identifier("헤헌").as_deref(), Some("Headhunter"));
    }

    #[test]
    fn ascii_miss_falls_back_to_title_case_guess() {
        let r = resolver();
        let res = r.resolve("The Pariah").unwrap();
        assert_eq!(res.identifier, "The_Pariah");
        assert_eq!(res.provenance, Provenance::HeuristicGuess);
        assert!(!res.is_verified());

        assert_eq!(
            r.resolve_identifier("  rATHPITH   gLOBE ").as_deref(),
            Some("Rathpith_Globe")
        );
        assert_eq!(
            r.resolve_identifier("Atziri's Disfavour").as_deref(),
            Some("Atziris_Disfavour")
        );
    }

    #[test]
    fn non_ascii_miss_fails() {
        let r = resolver();
        assert_eq!(r.resolve("없는 아이템 이름"), None);
        assert_eq!(r.resolve("Mjölner"), None);
    }

    #[test]
    fn blank_input_fails() {
        let r = resolver();
        assert_eq!(r.resolve(""), None);
        assert_eq!(r.resolve("   "), None);
        assert_eq!(r.resolve(" ' ' "), None);
    }

    #[test]
    fn resolution_is_idempotent() {
        let r = resolver();
        for input in ["Tabula Rasa", "The Pariah", "없는 아이템 이름", "병믿"] {
            assert_eq!(r.resolve(input), r.resolve(input));
        }
    }

    #[test]
    fn colliding_keys_are_rejected() {
        let err = IdentifierTable::from_entries(vec![
            IdentifierEntry {
                name: "Kaom's Heart".into(),
                id: "Kaoms_Heart".into(),
            },
            IdentifierEntry {
                name: "kaoms   heart".into(),
                id: "Other".into(),
            },
        ])
        .unwrap_err();
        assert!(matches!(err, TableError::DuplicateKey { .. }));
    }

    #[test]
    fn blank_identifiers_are_rejected() {
        let yaml = "entries:\n  - { name: \"x\", id: \"  \" }\n";
        assert!(matches!(
            IdentifierTable::from_yaml_str(yaml),
            Err(TableError::EmptyIdentifier { .. })
        ));
    }

    #[test]
    fn custom_table_replaces_bundled_entries() {
        let yaml = "version: test\nentries:\n  - { name: \"mb\", id: \"Mageblood\" }\n";
        let table = IdentifierTable::from_yaml_str(yaml).unwrap();
        let r = IdentifierResolver::new(Arc::new(table));
        assert_eq!(r.resolve_identifier("MB").as_deref(), Some("Mageblood"));
        assert_eq!(r.table().version(), Some("test"));
        // Not in this table, so it becomes a guess.
        assert!(!r.resolve("Tabula Rasa").unwrap().is_verified());
    }
}
