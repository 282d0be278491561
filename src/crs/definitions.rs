//! CRS definition tables
//!
//! A definition table maps registry names to proj4 strings. The crate ships
//! one (`crs_definitions.toml`); users can supply more with `--crs-defs`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use log::warn;
use serde_json::Value as JsonValue;

use crate::coordinate::normalize_name;
use crate::document::errors::{ReprojError, ReprojResult};

lazy_static! {
    // Parse the embedded TOML file on first use
    static ref BUILTIN_DEFINITIONS: CrsDefinitions = {
        let content = include_str!("../../crs_definitions.toml");
        CrsDefinitions::from_toml_str(content).unwrap_or_else(|e| {
            warn!("Failed to parse built-in CRS definitions: {}", e);
            CrsDefinitions::default()
        })
    };
}

/// The definitions embedded in the crate
pub fn builtin_definitions() -> &'static CrsDefinitions {
    &BUILTIN_DEFINITIONS
}

/// Named proj4 definitions plus alternative spellings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrsDefinitions {
    definitions: BTreeMap<String, String>,
    aliases: BTreeMap<String, String>,
}

impl CrsDefinitions {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse definitions from TOML
    ///
    /// Accepts either `[definitions]` / `[aliases]` tables or a flat file of
    /// `name = "proj4 string"` entries.
    pub fn from_toml_str(content: &str) -> ReprojResult<Self> {
        let toml_value: toml::Value = content
            .parse()
            .map_err(|e| ReprojError::Config(format!("Failed to parse TOML: {}", e)))?;

        let root = toml_value
            .as_table()
            .ok_or_else(|| ReprojError::Config("CRS definitions must be a TOML table".to_string()))?;

        let mut defs = CrsDefinitions::default();
        match root.get("definitions").and_then(|v| v.as_table()) {
            Some(table) => {
                Self::parse_string_table(table, "definitions", &mut defs.definitions)?;
                if let Some(aliases) = root.get("aliases").and_then(|v| v.as_table()) {
                    Self::parse_string_table(aliases, "aliases", &mut defs.aliases)?;
                }
            },
            None => Self::parse_string_table(root, "definitions", &mut defs.definitions)?,
        }
        Ok(defs)
    }

    /// Parse a JSON object of `name: "proj4 string"` entries
    pub fn from_json_str(content: &str) -> ReprojResult<Self> {
        let value: JsonValue = serde_json::from_str(content)?;
        let object = value
            .as_object()
            .ok_or_else(|| ReprojError::Config("CRS definitions must be a JSON object".to_string()))?;

        let mut defs = CrsDefinitions::default();
        for (name, definition) in object {
            let definition = definition.as_str().ok_or_else(|| {
                ReprojError::Config(format!("Definition for '{}' must be a string", name))
            })?;
            defs.insert(name, definition);
        }
        Ok(defs)
    }

    /// Load definitions from a `.json` or `.toml` file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ReprojResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "json" | "geojson" => Self::from_json_str(&contents),
            "toml" => Self::from_toml_str(&contents),
            _ => Self::from_json_str(&contents).or_else(|_| Self::from_toml_str(&contents)),
        }
    }

    fn parse_string_table(
        table: &toml::value::Table,
        table_name: &str,
        target: &mut BTreeMap<String, String>,
    ) -> ReprojResult<()> {
        for (k, v) in table {
            let value = v.as_str().ok_or_else(|| {
                ReprojError::Config(format!("Entry '{}' in [{}] must be a string", k, table_name))
            })?;
            target.insert(k.clone(), value.trim().to_string());
        }
        Ok(())
    }

    /// Add or replace a definition
    pub fn insert(&mut self, name: &str, definition: &str) {
        self.definitions.insert(name.to_string(), definition.trim().to_string());
    }

    /// Add every entry of `other`, replacing clashing names
    pub fn merge(&mut self, other: &CrsDefinitions) {
        for (name, definition) in &other.definitions {
            self.definitions.insert(name.clone(), definition.clone());
        }
        for (alias, target) in &other.aliases {
            self.aliases.insert(alias.clone(), target.clone());
        }
    }

    /// Look up a definition by name, alias, or normalized EPSG spelling
    pub fn get(&self, name: &str) -> Option<&str> {
        self.lookup_exact(name).or_else(|| {
            let normalized = normalize_name(name);
            if normalized == name {
                None
            } else {
                self.lookup_exact(&normalized)
            }
        })
    }

    fn lookup_exact(&self, name: &str) -> Option<&str> {
        if let Some(definition) = self.definitions.get(name) {
            return Some(definition.as_str());
        }
        self.aliases
            .get(name)
            .and_then(|target| self.definitions.get(target))
            .map(String::as_str)
    }

    /// Definition entries in name order
    pub fn definitions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.definitions.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Alias entries that point at a known definition
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases
            .iter()
            .filter(|(_, target)| self.definitions.contains_key(*target))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of definitions (aliases excluded)
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the table has no definitions
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
