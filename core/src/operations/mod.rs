//! Operation groups.
//!
//! Each group borrows the `Client` and maps its calls onto one endpoint
//! template apiece. Groups hold no state of their own.

mod autocomplete;
mod browse;
mod catalog;
mod quizzes;
mod recommendations;
mod search;
mod tasks;

pub use autocomplete::{Autocomplete, AutocompleteParameters};
pub use browse::{Browse, BrowseParameters};
pub use catalog::{
    Catalog, CatalogFiles, CatalogWriteOptions, ItemGroupsQuery, RetrieveItemsQuery,
    RetrieveVariationsQuery,
};
pub use quizzes::{QuizParameters, Quizzes};
pub use recommendations::{Recommendations, RecommendationsParameters};
pub use search::{Search, SearchParameters};
pub use tasks::{TaskParameters, Tasks};

use crate::error::{Error, Result};

/// Reject a blank required argument before anything is built.
pub(crate) fn require(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{name} is a required parameter")));
    }
    Ok(())
}

/// Collect non-blank ids, failing when none are left.
pub(crate) fn require_ids<S: AsRef<str>>(name: &str, ids: &[S]) -> Result<Vec<String>> {
    let ids: Vec<String> = ids
        .iter()
        .map(|id| id.as_ref().trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();
    if ids.is_empty() {
        return Err(Error::Validation(format!(
            "{name} is a required parameter and must not be empty"
        )));
    }
    Ok(ids)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_arguments_are_rejected() {
        assert!(require("quiz_id", "quiz-1").is_ok());
        let err = require("quiz_id", " ").unwrap_err();
        assert_eq!(err.to_string(), "validation error: quiz_id is a required parameter");
    }

    #[test]
    fn ids_are_trimmed_and_required() {
        assert_eq!(
            require_ids("item_ids", &[" a ", "", "b"]).unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(require_ids::<&str>("item_ids", &[]).is_err());
        assert!(require_ids("item_ids", &[""]).is_err());
    }
}
