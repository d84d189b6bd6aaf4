//! Concept schemes (taxonomic ranks).

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Returned when a source rank string has no matching concept scheme.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown taxonomic rank: {0}")]
pub struct UnknownRank(pub String);

/// The taxonomic rank a node is classified under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptScheme {
    Kingdom,
    Family,
    SubFamily,
    Genus,
    SubGenus,
    Species,
    SubSpecies,
}

impl ConceptScheme {
    /// All schemes, from the top of the hierarchy down.
    pub const ALL: [ConceptScheme; 7] = [
        Self::Kingdom,
        Self::Family,
        Self::SubFamily,
        Self::Genus,
        Self::SubGenus,
        Self::Species,
        Self::SubSpecies,
    ];

    /// The literal stored in the `skos:inScheme` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kingdom => "kingdom",
            Self::Family => "family",
            Self::SubFamily => "sub_family",
            Self::Genus => "genus",
            Self::SubGenus => "sub_genus",
            Self::Species => "species",
            Self::SubSpecies => "sub_species",
        }
    }

    /// Parses a rank string as found in source rows.
    ///
    /// Matching is case-insensitive. Infraspecific ranks (variety, form)
    /// collapse onto `SubSpecies`.
    pub fn from_rank(rank: &str) -> Option<Self> {
        let scheme = match rank.trim().to_lowercase().as_str() {
            "kingdom" => Self::Kingdom,
            "family" => Self::Family,
            "subfamily" | "sub_family" => Self::SubFamily,
            "genus" => Self::Genus,
            "subgenus" | "sub_genus" => Self::SubGenus,
            "species" => Self::Species,
            "subspecies" | "sub_species" | "variety" | "var" | "var." | "form" | "f." => {
                Self::SubSpecies
            }
            _ => return None,
        };
        Some(scheme)
    }
}

impl FromStr for ConceptScheme {
    type Err = UnknownRank;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_rank(s).ok_or_else(|| UnknownRank(s.to_string()))
    }
}

impl std::fmt::Display for ConceptScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rank_case_insensitive() {
        assert_eq!(ConceptScheme::from_rank("Genus"), Some(ConceptScheme::Genus));
        assert_eq!(
            ConceptScheme::from_rank(" SUBFAMILY "),
            Some(ConceptScheme::SubFamily)
        );
        assert_eq!(
            ConceptScheme::from_rank("variety"),
            Some(ConceptScheme::SubSpecies)
        );
        assert_eq!(ConceptScheme::from_rank("order"), None);
    }

    #[test]
    fn test_literal_round_trips_through_from_str() {
        for scheme in ConceptScheme::ALL {
            assert_eq!(scheme.as_str().parse::<ConceptScheme>(), Ok(scheme));
        }
        assert_eq!(
            "tribe".parse::<ConceptScheme>(),
            Err(UnknownRank("tribe".to_string()))
        );
    }
}
