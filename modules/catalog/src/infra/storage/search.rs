//! Composable predicate search over the book catalog.
//!
//! Each search field is served by a predicate provider: a pure function from
//! the raw tokens to a single-column `IN` predicate. The registry resolves a
//! field key to its provider; the specification builder folds the predicates
//! of every present field into one conjunctive [`Condition`].

use sea_orm::sea_query::{Condition, SimpleExpr};
use sea_orm::ColumnTrait;

use crate::contract::model::BookSearchParams;
use crate::domain::error::CatalogError;
use crate::infra::storage::entity::books;

/// Produces a single-field inclusion predicate from raw tokens.
pub type PredicateProvider = fn(&[String]) -> SimpleExpr;

fn title_in(values: &[String]) -> SimpleExpr {
    books::Column::Title.is_in(values.iter().cloned())
}

fn author_in(values: &[String]) -> SimpleExpr {
    books::Column::Author.is_in(values.iter().cloned())
}

fn isbn_in(values: &[String]) -> SimpleExpr {
    books::Column::Isbn.is_in(values.iter().cloned())
}

/// Registry of predicate providers keyed by field name, populated at startup.
pub struct PredicateProviderRegistry {
    providers: Vec<(&'static str, PredicateProvider)>,
}

impl Default for PredicateProviderRegistry {
    fn default() -> Self {
        Self {
            providers: vec![
                ("author", author_in as PredicateProvider),
                ("isbn", isbn_in as PredicateProvider),
                ("title", title_in as PredicateProvider),
            ],
        }
    }
}

impl PredicateProviderRegistry {
    /// Resolve a field key to its provider. A miss is a configuration
    /// defect, surfaced as an internal error rather than a validation one.
    pub fn resolve(&self, field: &str) -> Result<PredicateProvider, CatalogError> {
        self.providers
            .iter()
            .find(|(key, _)| *key == field)
            .map(|(_, provider)| *provider)
            .ok_or_else(|| CatalogError::unknown_search_field(field))
    }
}

/// Builds one conjunctive filter condition from sparse search parameters.
#[derive(Default)]
pub struct SpecificationBuilder {
    registry: PredicateProviderRegistry,
}

impl SpecificationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the present fields, in a fixed order, into a single AND
    /// condition. Absent or empty fields contribute nothing; no fields at
    /// all leaves the match-all identity.
    pub fn build(&self, params: &BookSearchParams) -> Result<Condition, CatalogError> {
        if params.is_empty() {
            return Ok(Condition::all());
        }

        let fields: [(&str, &[String]); 3] = [
            ("author", &params.author),
            ("isbn", &params.isbn),
            ("title", &params.title),
        ];

        let mut condition = Condition::all();
        for (field, values) in fields {
            if values.is_empty() {
                continue;
            }
            let provider = self.registry.resolve(field)?;
            condition = condition.add(provider(values));
        }
        Ok(condition)
    }
}
