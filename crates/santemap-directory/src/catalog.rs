//! Read-only facility catalog.
//!
//! The catalog is loaded once (from the embedded dataset or caller-supplied
//! JSON) and never mutated for the life of the process.

use anyhow::{Context, Result};
use santemap_schema::Facility;

const BUILTIN_DATASET: &str = include_str!("../data/facilities.json");

#[derive(Debug, Clone)]
pub struct FacilityCatalog {
    facilities: Vec<Facility>,
}

impl FacilityCatalog {
    pub fn new(facilities: Vec<Facility>) -> Self {
        Self { facilities }
    }

    /// Parse a catalog from a JSON array of facility records.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let facilities: Vec<Facility> =
            serde_json::from_str(raw).context("parsing facility catalog JSON")?;
        Ok(Self { facilities })
    }

    /// The embedded Guinea dataset shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_DATASET)
    }

    pub fn get(&self, id: u32) -> Option<&Facility> {
        self.facilities.iter().find(|f| f.id == id)
    }

    /// Facilities in load order.
    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_dataset_parses() {
        let catalog = FacilityCatalog::builtin().unwrap();
        assert!(catalog.len() >= 10);
        // Donka is the anchor record used throughout the filter tests.
        let donka = catalog
            .facilities()
            .iter()
            .find(|f| f.name.contains("Donka"))
            .unwrap();
        assert!(donka.has_emergency);
        assert!(donka.services.iter().any(|s| s == "Urgences"));
    }

    #[test]
    fn builtin_coordinates_are_plausible_for_guinea() {
        let catalog = FacilityCatalog::builtin().unwrap();
        for f in catalog.facilities() {
            assert!(
                (-16.0..=-7.0).contains(&f.position.longitude),
                "{} longitude out of range",
                f.name
            );
            assert!(
                (7.0..=13.0).contains(&f.position.latitude),
                "{} latitude out of range",
                f.name
            );
        }
    }

    #[test]
    fn get_by_id() {
        let catalog = FacilityCatalog::builtin().unwrap();
        assert!(catalog.get(1).is_some());
        assert!(catalog.get(9999).is_none());
    }

    #[test]
    fn from_json_str_rejects_malformed_input() {
        let err = FacilityCatalog::from_json_str("{not json").unwrap_err();
        assert!(err.to_string().contains("facility catalog"));
    }

    #[test]
    fn from_json_str_accepts_empty_array() {
        let catalog = FacilityCatalog::from_json_str("[]").unwrap();
        assert!(catalog.is_empty());
    }
}
