//! Search query and result types

use crate::error::{CoreError, Result};
use crate::types::{Album, Artist, Track};
use serde::{Deserialize, Serialize};

/// Track fields a search query can match against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    /// Match any field
    Any,
    /// Track URI
    Uri,
    /// Track name
    TrackName,
    /// Album name
    Album,
    /// Artist name
    Artist,
    /// Album artist name
    Albumartist,
    /// Composer name
    Composer,
    /// Performer name
    Performer,
    /// Track number
    TrackNo,
    /// Genre
    Genre,
    /// Release date
    Date,
    /// Comment
    Comment,
}

/// One search term: a field and the values it may match (logical OR)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTerm {
    /// Field to match against
    pub field: SearchField,

    /// Accepted values; a track matches the term if any value matches
    pub values: Vec<String>,
}

impl SearchTerm {
    /// Create a search term
    pub fn new<I, S>(field: SearchField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// A library search query
///
/// Terms combine with logical AND; the values inside one term with logical
/// OR. `exact` requests full-value matching instead of substring matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Search terms (AND across terms)
    pub terms: Vec<SearchTerm>,

    /// Whether values must match exactly
    pub exact: bool,
}

impl SearchQuery {
    /// Create a query from terms
    pub fn new(terms: Vec<SearchTerm>, exact: bool) -> Self {
        Self { terms, exact }
    }

    /// Validate the query shape
    ///
    /// A query must carry at least one term, every term at least one value,
    /// and no value may be empty.
    pub fn validate(&self) -> Result<()> {
        if self.terms.is_empty() {
            return Err(CoreError::validation("Query must contain at least one term"));
        }
        for term in &self.terms {
            if term.values.is_empty() {
                return Err(CoreError::validation(format!(
                    "Query term {:?} has no values",
                    term.field
                )));
            }
            if term.values.iter().any(String::is_empty) {
                return Err(CoreError::validation(format!(
                    "Query term {:?} contains an empty value",
                    term.field
                )));
            }
        }
        Ok(())
    }
}

/// Track fields `get_distinct` can enumerate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistinctField {
    /// Track URI
    Uri,
    /// Track name
    TrackName,
    /// Album name
    Album,
    /// Artist name
    Artist,
    /// Album artist name
    Albumartist,
    /// Composer name
    Composer,
    /// Performer name
    Performer,
    /// Genre
    Genre,
    /// Release date
    Date,
    /// Comment
    Comment,
    /// MusicBrainz identifier
    MusicbrainzId,
}

/// The result of one backend answering a search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// URI identifying this result set, if the backend assigns one
    pub uri: Option<String>,

    /// Matching tracks
    pub tracks: Vec<Track>,

    /// Matching artists
    pub artists: Vec<Artist>,

    /// Matching albums
    pub albums: Vec<Album>,
}

/// An image associated with a URI (cover art, artist portrait)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Image {
    /// Image URI
    pub uri: String,

    /// Image width in pixels, if known
    pub width: Option<u32>,

    /// Image height in pixels, if known
    pub height: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_fails_validation() {
        let query = SearchQuery::default();
        assert!(query.validate().is_err());
    }

    #[test]
    fn term_without_values_fails_validation() {
        let query = SearchQuery::new(vec![SearchTerm::new(SearchField::Artist, Vec::<String>::new())], false);
        assert!(query.validate().is_err());
    }

    #[test]
    fn empty_value_fails_validation() {
        let query = SearchQuery::new(vec![SearchTerm::new(SearchField::Any, ["", "abba"])], false);
        assert!(query.validate().is_err());
    }

    #[test]
    fn well_formed_query_passes() {
        let query = SearchQuery::new(
            vec![
                SearchTerm::new(SearchField::Artist, ["ABBA"]),
                SearchTerm::new(SearchField::Any, ["gold", "greatest"]),
            ],
            true,
        );
        assert!(query.validate().is_ok());
    }
}
