//! Tabular source rows.
//!
//! Reading archive files is someone else's job. Whatever does it hands us
//! rows with these named fields, and the graph builder only ever looks at
//! the `(descriptor, label, attributes)` triple derived from each one.

use crate::attribute::Attribute;
use crate::scheme::ConceptScheme;
use serde::{Deserialize, Serialize};

/// One taxon usage as delivered by a tabular reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonRow {
    /// Source-unique identifier; becomes the node descriptor.
    pub id: String,

    #[serde(rename = "scientificName")]
    pub scientific_name: String,

    #[serde(rename = "taxonRank")]
    pub rank: String,

    #[serde(rename = "parentNameUsageID", default)]
    pub parent_id: Option<String>,

    #[serde(rename = "acceptedNameUsageID", default)]
    pub accepted_id: Option<String>,

    #[serde(rename = "scientificNameAuthorship", default)]
    pub authorship: Option<String>,

    #[serde(rename = "taxonomicStatus", default)]
    pub status: Option<String>,
}

impl TaxonRow {
    /// Creates a row with only the mandatory fields set.
    pub fn new(
        id: impl Into<String>,
        scientific_name: impl Into<String>,
        rank: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            scientific_name: scientific_name.into(),
            rank: rank.into(),
            parent_id: None,
            accepted_id: None,
            authorship: None,
            status: None,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_accepted(mut self, accepted_id: impl Into<String>) -> Self {
        self.accepted_id = Some(accepted_id.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_authorship(mut self, authorship: impl Into<String>) -> Self {
        self.authorship = Some(authorship.into());
        self
    }

    /// The row's concept scheme, if its rank is one we model.
    pub fn scheme(&self) -> Option<ConceptScheme> {
        ConceptScheme::from_rank(&self.rank)
    }

    /// Status and authorship as node attributes. Blank fields are skipped.
    pub fn attributes(&self) -> Vec<Attribute> {
        let mut attributes = Vec::new();
        if let Some(status) = non_blank(&self.status) {
            attributes.push(Attribute::status(status));
        }
        if let Some(author) = non_blank(&self.authorship) {
            attributes.push(Attribute::author(author));
        }
        attributes
    }

    /// Parent identifier, ignoring blanks.
    pub fn parent(&self) -> Option<&str> {
        non_blank(&self.parent_id)
    }

    /// Accepted-usage identifier when it points at a different row.
    ///
    /// Rows that name themselves as accepted are not synonyms.
    pub fn accepted(&self) -> Option<&str> {
        non_blank(&self.accepted_id).filter(|accepted| *accepted != self.id)
    }
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case("nan"))
}
