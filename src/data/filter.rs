use std::collections::BTreeSet;
use std::fmt;

use super::model::{CatalogTable, ContentType, Record};

// ---------------------------------------------------------------------------
// Filter criteria: what the sidebar controls currently select
// ---------------------------------------------------------------------------

/// Content-type control: everything, or a single type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeSelection {
    #[default]
    All,
    Movie,
    TvShow,
}

impl TypeSelection {
    pub const OPTIONS: [TypeSelection; 3] =
        [TypeSelection::All, TypeSelection::Movie, TypeSelection::TvShow];

    pub fn matches(self, content_type: ContentType) -> bool {
        match self {
            TypeSelection::All => true,
            TypeSelection::Movie => content_type == ContentType::Movie,
            TypeSelection::TvShow => content_type == ContentType::TvShow,
        }
    }
}

impl fmt::Display for TypeSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSelection::All => f.write_str("All"),
            TypeSelection::Movie => f.write_str(ContentType::Movie.as_str()),
            TypeSelection::TvShow => f.write_str(ContentType::TvShow.as_str()),
        }
    }
}

/// User-selected constraints.
///
/// `countries` and `genres` use `None` for "unconstrained". An empty
/// selection is also unconstrained: clearing a control must not hide the
/// whole catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Inclusive `(min, max)` on `year_added`.
    pub year_range: (i32, i32),
    pub countries: Option<BTreeSet<String>>,
    pub content_type: TypeSelection,
    pub genres: Option<BTreeSet<String>>,
    /// Case-insensitive substring of the title; blank means no filter.
    pub title_query: Option<String>,
}

impl FilterCriteria {
    /// Criteria that keep every row of `table`: its full year span, no other
    /// constraint.
    pub fn for_table(table: &CatalogTable) -> Self {
        FilterCriteria {
            year_range: table.facets().year_bounds(),
            countries: None,
            content_type: TypeSelection::All,
            genres: None,
            title_query: None,
        }
    }

    pub fn with_year_range(mut self, min: i32, max: i32) -> Self {
        self.year_range = (min, max);
        self
    }

    pub fn with_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = selection(countries);
        self
    }

    pub fn with_content_type(mut self, content_type: TypeSelection) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = selection(genres);
        self
    }

    pub fn with_title_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.title_query = if query.is_empty() { None } else { Some(query) };
        self
    }

    fn lowered_query(&self) -> Option<String> {
        self.title_query
            .as_deref()
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }

    /// Whether a single record passes every active predicate; `query` is
    /// the pre-lowered title query.
    fn matches_with(&self, rec: &Record, query: Option<&str>) -> bool {
        let (lo, hi) = self.year_range;
        if rec.year_added < lo || rec.year_added > hi {
            return false;
        }
        if let Some(countries) = active(&self.countries) {
            if !countries.contains(&rec.primary_country) {
                return false;
            }
        }
        if !self.content_type.matches(rec.content_type) {
            return false;
        }
        if let Some(genres) = active(&self.genres) {
            if !rec.genres.iter().any(|g| genres.contains(g)) {
                return false;
            }
        }
        if let Some(query) = query {
            if !rec.title.to_lowercase().contains(query) {
                return false;
            }
        }
        true
    }
}

/// Collect a multi-select into a set, empty → `None`.
fn selection<I, S>(items: I) -> Option<BTreeSet<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let set: BTreeSet<String> = items.into_iter().map(Into::into).collect();
    if set.is_empty() {
        None
    } else {
        Some(set)
    }
}

fn active(set: &Option<BTreeSet<String>>) -> Option<&BTreeSet<String>> {
    set.as_ref().filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Filter engine
// ---------------------------------------------------------------------------

/// Return indices of records that pass all active filters, in table order.
pub fn filtered_indices(table: &CatalogTable, criteria: &FilterCriteria) -> Vec<usize> {
    let query = criteria.lowered_query();
    table
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.matches_with(rec, query.as_deref()))
        .map(|(i, _)| i)
        .collect()
}

/// Build the filtered view. The input table is left untouched; the result
/// keeps source order and every enriched column.
pub fn apply(table: &CatalogTable, criteria: &FilterCriteria) -> CatalogTable {
    let records = filtered_indices(table, criteria)
        .into_iter()
        .map(|i| table.records()[i].clone())
        .collect();
    CatalogTable::new(records, Vec::new())
}
