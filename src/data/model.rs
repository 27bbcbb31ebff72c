use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use super::sentiment::SentimentLabel;

/// Year range offered when the table carries no `year_added` values at all.
pub const DEFAULT_YEAR_RANGE: (i32, i32) = (2020, 2021);

/// Sentinel used for missing director / cast / country cells.
pub const UNKNOWN: &str = "Unknown";

/// Group-by key. Variant order is the sort order: missing values first,
/// then numbers, then text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum CellValue {
    Null,
    Integer(i64),
    String(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => f.write_str("n/a"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::String(s) => f.write_str(s),
        }
    }
}

impl CellValue {
    /// Position on a numeric plot axis; text and missing keys have none.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<Option<u32>> for CellValue {
    fn from(v: Option<u32>) -> Self {
        v.map_or(CellValue::Null, |n| CellValue::Integer(i64::from(n)))
    }
}

// ---------------------------------------------------------------------------
// ContentType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContentType {
    Movie,
    TvShow,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Movie => "Movie",
            ContentType::TvShow => "TV Show",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        match compact.to_ascii_lowercase().as_str() {
            "movie" => Ok(ContentType::Movie),
            "tvshow" => Ok(ContentType::TvShow),
            _ => Err(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one enriched catalog entry
// ---------------------------------------------------------------------------

/// One catalog entry after cleaning and feature derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Zero-based row position in the source file.
    pub id: usize,
    pub show_id: Option<String>,
    pub title: String,
    pub content_type: ContentType,
    pub director: String,
    pub cast: String,
    pub country_raw: String,
    /// First comma-separated entry of `country_raw`, trimmed.
    pub primary_country: String,
    pub date_added: NaiveDate,
    /// Absent when the source cell is blank or not a year.
    pub release_year: Option<i32>,
    pub year_added: i32,
    pub month_added: u32,
    pub rating: Option<String>,
    pub listed_in_raw: String,
    /// `listed_in_raw` split on `", "`; `[""]` when the field was empty.
    pub genres: Vec<String>,
    pub duration_raw: String,
    pub duration_minutes: Option<u32>,
    pub duration_seasons: Option<u32>,
    pub description: String,
    pub description_length: usize,
    pub title_length: usize,
    /// VADER compound polarity in [-1, 1].
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
}

// ---------------------------------------------------------------------------
// ParseWarning – recovered per-row problems
// ---------------------------------------------------------------------------

/// A non-fatal problem found while loading; the row was kept with a
/// fallback value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// `date_added` was missing or unparseable; Jan 1 of the release year
    /// was used.
    DateFallback { row: usize, value: String },
    /// `type` was neither Movie nor TV Show; it was inferred from the
    /// duration.
    UnknownType { row: usize, value: String },
    /// `duration` mentioned minutes or seasons without a leading number.
    UnparsedDuration { row: usize, value: String },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::DateFallback { row, value } => {
                write!(f, "row {row}: date_added '{value}' replaced by Jan 1 of release year")
            }
            ParseWarning::UnknownType { row, value } => {
                write!(f, "row {row}: unknown type '{value}', inferred from duration")
            }
            ParseWarning::UnparsedDuration { row, value } => {
                write!(f, "row {row}: duration '{value}' has no leading number")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// CatalogTable – the enriched dataset
// ---------------------------------------------------------------------------

/// The enriched dataset. Never mutated once built; filtering produces new
/// tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogTable {
    records: Vec<Record>,
    warnings: Vec<ParseWarning>,
}

impl CatalogTable {
    pub fn new(records: Vec<Record>, warnings: Vec<ParseWarning>) -> Self {
        CatalogTable { records, warnings }
    }

    /// A table with no rows, the "no data" state after a failed load.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    #[cfg(test)]
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.title.as_str())
    }

    /// Distinct values offered by the sidebar controls.
    pub fn facets(&self) -> Facets {
        let mut years = BTreeSet::new();
        let mut countries = BTreeSet::new();
        let mut genres = BTreeSet::new();

        for rec in &self.records {
            years.insert(rec.year_added);
            if rec.primary_country != UNKNOWN {
                countries.insert(rec.primary_country.clone());
            }
            for g in &rec.genres {
                let g = g.trim();
                if !g.is_empty() {
                    genres.insert(g.to_string());
                }
            }
        }

        Facets {
            years: years.into_iter().collect(),
            countries: countries.into_iter().collect(),
            genres: genres.into_iter().collect(),
        }
    }
}

/// Sorted option lists for the filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    pub years: Vec<i32>,
    /// Primary countries, `"Unknown"` excluded.
    pub countries: Vec<String>,
    /// Non-blank, trimmed genre names.
    pub genres: Vec<String>,
}

impl Facets {
    /// `(min, max)` of the available years, or [`DEFAULT_YEAR_RANGE`].
    pub fn year_bounds(&self) -> (i32, i32) {
        match (self.years.first(), self.years.last()) {
            (Some(&lo), Some(&hi)) => (lo, hi),
            _ => DEFAULT_YEAR_RANGE,
        }
    }
}
