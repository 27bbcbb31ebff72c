//! Derived views consumed by the charts: group-by counts, headline metrics,
//! histograms and correlations. Every function accepts an empty table and
//! answers with an empty map, an empty vec or `None`.

use std::collections::{BTreeMap, HashMap};

use super::model::{CatalogTable, CellValue, ContentType, Record};
use super::sentiment::SentimentLabel;

// ---------------------------------------------------------------------------
// Group-by counts
// ---------------------------------------------------------------------------

/// Columns a table can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Type,
    PrimaryCountry,
    /// Exploded: a record counts once per listed genre. Blank genres are
    /// skipped.
    Genre,
    YearAdded,
    MonthAdded,
    ReleaseYear,
    SentimentLabel,
    DurationMinutes,
    DurationSeasons,
    Rating,
    Director,
}

impl Column {
    /// Group keys contributed by one record.
    pub fn keys(self, rec: &Record) -> Vec<CellValue> {
        match self {
            Column::Type => vec![CellValue::from(rec.content_type.as_str())],
            Column::PrimaryCountry => vec![CellValue::from(rec.primary_country.as_str())],
            Column::Genre => rec
                .genres
                .iter()
                .map(|g| g.trim())
                .filter(|g| !g.is_empty())
                .map(CellValue::from)
                .collect(),
            Column::YearAdded => vec![CellValue::Integer(i64::from(rec.year_added))],
            Column::MonthAdded => vec![CellValue::Integer(i64::from(rec.month_added))],
            Column::ReleaseYear => {
                vec![rec.release_year.map_or(CellValue::Null, |y| CellValue::Integer(y.into()))]
            }
            Column::SentimentLabel => vec![CellValue::from(rec.sentiment_label.as_str())],
            Column::DurationMinutes => vec![CellValue::from(rec.duration_minutes)],
            Column::DurationSeasons => vec![CellValue::from(rec.duration_seasons)],
            Column::Rating => vec![rec
                .rating
                .as_deref()
                .map_or(CellValue::Null, CellValue::from)],
            Column::Director => vec![CellValue::from(rec.director.as_str())],
        }
    }
}

/// Row count per distinct key, in key order.
pub fn group_counts(table: &CatalogTable, column: Column) -> BTreeMap<CellValue, usize> {
    let mut counts = BTreeMap::new();
    for rec in table.records() {
        for key in column.keys(rec) {
            *counts.entry(key).or_insert(0) += 1;
        }
    }
    counts
}

/// Like `group_counts`, ordered by count descending, ties by key.
pub fn value_counts(table: &CatalogTable, column: Column) -> Vec<(CellValue, usize)> {
    let mut counts: Vec<_> = group_counts(table, column).into_iter().collect();
    // stable sort keeps the key order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Row count per `(a, b)` key pair, e.g. year × type for stacked bars.
pub fn cross_counts(
    table: &CatalogTable,
    a: Column,
    b: Column,
) -> BTreeMap<(CellValue, CellValue), usize> {
    let mut counts = BTreeMap::new();
    for rec in table.records() {
        let b_keys = b.keys(rec);
        for ka in a.keys(rec) {
            for kb in &b_keys {
                *counts.entry((ka.clone(), kb.clone())).or_insert(0) += 1;
            }
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Headline metrics
// ---------------------------------------------------------------------------

/// Figures shown on the metric cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    /// `total` minus the size of the unfiltered table (zero or negative).
    pub delta: i64,
    pub movies: usize,
    pub tv_shows: usize,
    /// Distinct primary countries, "Unknown" included.
    pub countries: usize,
}

impl Summary {
    pub fn of(filtered: &CatalogTable, full_len: usize) -> Self {
        let movies = filtered
            .records()
            .iter()
            .filter(|r| r.content_type == ContentType::Movie)
            .count();
        Summary {
            total: filtered.len(),
            delta: filtered.len() as i64 - full_len as i64,
            movies,
            tv_shows: filtered.len() - movies,
            countries: group_counts(filtered, Column::PrimaryCountry).len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Mean / min / max over the finite values, `None` if there are none.
pub fn numeric_stats(values: impl IntoIterator<Item = f64>) -> Option<NumericStats> {
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.into_iter().filter(|v| v.is_finite()) {
        count += 1;
        sum += v;
        min = min.min(v);
        max = max.max(v);
    }
    (count > 0).then(|| NumericStats {
        count,
        mean: sum / count as f64,
        min,
        max,
    })
}

/// Runtime statistics over the movies of the table.
pub fn movie_duration_stats(table: &CatalogTable) -> Option<NumericStats> {
    numeric_stats(
        table
            .records()
            .iter()
            .filter(|r| r.content_type == ContentType::Movie)
            .filter_map(|r| r.duration_minutes.map(f64::from)),
    )
}

/// Season-count statistics over the TV shows of the table.
pub fn season_stats(table: &CatalogTable) -> Option<NumericStats> {
    numeric_stats(
        table
            .records()
            .iter()
            .filter(|r| r.content_type == ContentType::TvShow)
            .filter_map(|r| r.duration_seasons.map(f64::from)),
    )
}

pub fn mean_description_length(table: &CatalogTable) -> Option<f64> {
    numeric_stats(table.records().iter().map(|r| r.description_length as f64)).map(|s| s.mean)
}

pub fn mean_title_length(table: &CatalogTable) -> Option<f64> {
    numeric_stats(table.records().iter().map(|r| r.title_length as f64)).map(|s| s.mean)
}

// ---------------------------------------------------------------------------
// Histograms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Equal-width bins spanning `[min, max]` of the finite values. The last
/// bin is closed on the right.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let Some(stats) = numeric_stats(finite.iter().copied()) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    if stats.min == stats.max {
        return vec![HistogramBin {
            start: stats.min,
            end: stats.max,
            count: finite.len(),
        }];
    }

    let width = (stats.max - stats.min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: stats.min + width * i as f64,
            end: stats.min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for v in finite {
        let idx = (((v - stats.min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

pub fn description_length_histogram(table: &CatalogTable, bins: usize) -> Vec<HistogramBin> {
    let values: Vec<f64> = table
        .records()
        .iter()
        .map(|r| r.description_length as f64)
        .collect();
    histogram(&values, bins)
}

pub fn sentiment_score_histogram(table: &CatalogTable, bins: usize) -> Vec<HistogramBin> {
    let values: Vec<f64> = table.records().iter().map(|r| r.sentiment_score).collect();
    histogram(&values, bins)
}

// ---------------------------------------------------------------------------
// Recommendations and title words
// ---------------------------------------------------------------------------

/// The `n` positive records with the highest sentiment score.
pub fn top_positive(table: &CatalogTable, n: usize) -> Vec<&Record> {
    let mut positive: Vec<&Record> = table
        .records()
        .iter()
        .filter(|r| r.sentiment_label == SentimentLabel::Positive)
        .collect();
    positive.sort_by(|a, b| b.sentiment_score.total_cmp(&a.sentiment_score));
    positive.truncate(n);
    positive
}

const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "an", "and", "are", "as", "at", "be", "but", "by", "for",
    "from", "have", "he", "her", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "me", "my", "no", "not", "of", "on", "or", "our", "out", "she", "so", "that", "the",
    "their", "them", "they", "this", "to", "up", "was", "we", "what", "when", "who", "why",
    "will", "with", "you", "your",
];

/// Most frequent title words (lower-cased, stop words and one-letter words
/// dropped), count descending then alphabetical.
pub fn title_word_counts(table: &CatalogTable, n: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for rec in table.records() {
        for token in rec
            .title
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        {
            let word = token.trim_matches('\'').to_lowercase();
            let word = word.strip_suffix("'s").unwrap_or(&word);
            if word.chars().count() < 2 || STOP_WORDS.contains(&word) {
                continue;
            }
            *counts.entry(word.to_string()).or_insert(0) += 1;
        }
    }
    let mut words: Vec<(String, usize)> = counts.into_iter().collect();
    words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    words.truncate(n);
    words
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

type NumericAccessor = fn(&Record) -> Option<f64>;

/// Numeric columns that take part in the correlation matrix.
pub const NUMERIC_COLUMNS: [(&str, NumericAccessor); 8] = [
    ("release_year", |r| r.release_year.map(f64::from)),
    ("year_added", |r| Some(f64::from(r.year_added))),
    ("month_added", |r| Some(f64::from(r.month_added))),
    ("duration_minutes", |r| r.duration_minutes.map(f64::from)),
    ("duration_seasons", |r| r.duration_seasons.map(f64::from)),
    ("description_length", |r| Some(r.description_length as f64)),
    ("title_length", |r| Some(r.title_length as f64)),
    ("sentiment_score", |r| Some(r.sentiment_score)),
];

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<&'static str>,
    /// `values[i][j]`: Pearson r of columns i and j, `None` when undefined
    /// (fewer than two paired values or zero variance).
    pub values: Vec<Vec<Option<f64>>>,
}

/// Pairwise-complete Pearson correlation of [`NUMERIC_COLUMNS`].
pub fn correlation_matrix(table: &CatalogTable) -> CorrelationMatrix {
    let columns: Vec<Vec<Option<f64>>> = NUMERIC_COLUMNS
        .iter()
        .map(|(_, get)| table.records().iter().map(get).collect())
        .collect();

    let n = columns.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&columns[i], &columns[j]).map(|r| if i == j { 1.0 } else { r });
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns: NUMERIC_COLUMNS.iter().map(|(name, _)| *name).collect(),
        values,
    }
}

fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn sample() -> CatalogTable {
        let mut a = record(0, "The Love Boat", 2019);
        a.genres = vec!["Dramas".to_string(), "Comedies".to_string()];
        a.sentiment_score = 0.8;
        a.sentiment_label = SentimentLabel::Positive;
        a.description_length = 100;

        let mut b = record(1, "Love's Labour", 2020);
        b.primary_country = "India".to_string();
        b.duration_minutes = Some(120);
        b.sentiment_score = 0.4;
        b.sentiment_label = SentimentLabel::Positive;
        b.description_length = 150;

        let mut c = record(2, "Dark", 2020);
        c.content_type = ContentType::TvShow;
        c.duration_minutes = None;
        c.duration_seasons = Some(3);
        c.genres = vec!["Crime TV Shows".to_string(), String::new()];
        c.sentiment_score = -0.6;
        c.sentiment_label = SentimentLabel::Negative;
        c.description_length = 80;

        CatalogTable::new(vec![a, b, c], Vec::new())
    }

    #[test]
    fn group_counts_by_categorical_and_derived_columns() {
        let table = sample();
        let by_type = group_counts(&table, Column::Type);
        assert_eq!(by_type[&CellValue::from("Movie")], 2);
        assert_eq!(by_type[&CellValue::from("TV Show")], 1);

        let by_year = group_counts(&table, Column::YearAdded);
        assert_eq!(
            by_year.into_iter().collect::<Vec<_>>(),
            vec![(CellValue::Integer(2019), 1), (CellValue::Integer(2020), 2)]
        );

        let seasons = group_counts(&table, Column::DurationSeasons);
        assert_eq!(seasons[&CellValue::Null], 2);
        assert_eq!(seasons[&CellValue::Integer(3)], 1);
    }

    #[test]
    fn genre_counts_are_exploded() {
        let counts = value_counts(&sample(), Column::Genre);
        assert_eq!(
            counts,
            vec![
                (CellValue::from("Dramas"), 2),
                (CellValue::from("Comedies"), 1),
                (CellValue::from("Crime TV Shows"), 1),
            ]
        );
    }

    #[test]
    fn cross_counts_pair_keys() {
        let counts = cross_counts(&sample(), Column::YearAdded, Column::Type);
        assert_eq!(counts[&(CellValue::Integer(2020), CellValue::from("Movie"))], 1);
        assert_eq!(counts[&(CellValue::Integer(2020), CellValue::from("TV Show"))], 1);
        assert_eq!(counts.len(), 3);
    }

    #[test]
    fn summary_counts_types_and_countries() {
        let summary = Summary::of(&sample(), 10);
        assert_eq!(
            summary,
            Summary {
                total: 3,
                delta: -7,
                movies: 2,
                tv_shows: 1,
                countries: 2,
            }
        );
    }

    #[test]
    fn duration_and_length_stats() {
        let table = sample();
        let movies = movie_duration_stats(&table).unwrap();
        assert_eq!((movies.count, movies.min, movies.max, movies.mean), (2, 90.0, 120.0, 105.0));
        let seasons = season_stats(&table).unwrap();
        assert_eq!(seasons.mean, 3.0);
        assert_eq!(mean_description_length(&table), Some(110.0));
    }

    #[test]
    fn histogram_bins_cover_the_range() {
        let bins = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0], 4);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins.iter().map(|b| b.count).collect::<Vec<_>>(), vec![1, 1, 1, 2]);
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[3].end, 4.0);

        let flat = histogram(&[2.5, 2.5], 30);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].count, 2);

        assert!(histogram(&[], 30).is_empty());
        assert!(histogram(&[f64::NAN], 30).is_empty());
    }

    #[test]
    fn top_positive_orders_by_score() {
        let table = sample();
        let top: Vec<&str> = top_positive(&table, 5).iter().map(|r| r.title.as_str()).collect();
        assert_eq!(top, vec!["The Love Boat", "Love's Labour"]);
        assert_eq!(top_positive(&table, 1).len(), 1);
    }

    #[test]
    fn title_words_skip_stop_words() {
        let words = title_word_counts(&sample(), 10);
        assert_eq!(words[0], ("love".to_string(), 2));
        assert!(words.iter().all(|(w, _)| w != "the"));
        assert!(words.iter().any(|(w, _)| w == "labour"));
    }

    #[test]
    fn correlation_is_symmetric_with_unit_diagonal() {
        let matrix = correlation_matrix(&sample());
        let idx = |name| matrix.columns.iter().position(|c| *c == name).unwrap();
        let (len, score) = (idx("description_length"), idx("sentiment_score"));
        assert_eq!(matrix.values[len][len], Some(1.0));
        assert_eq!(matrix.values[len][score], matrix.values[score][len]);
        assert!(matrix.values[len][score].unwrap() > 0.0);
        // only one TV show carries a season count
        let seasons = idx("duration_seasons");
        assert_eq!(matrix.values[seasons][len], None);
    }

    #[test]
    fn empty_table_yields_empty_views() {
        let empty = CatalogTable::empty();
        assert!(group_counts(&empty, Column::Genre).is_empty());
        assert!(value_counts(&empty, Column::PrimaryCountry).is_empty());
        assert!(cross_counts(&empty, Column::YearAdded, Column::Type).is_empty());
        assert_eq!(Summary::of(&empty, 0).total, 0);
        assert_eq!(movie_duration_stats(&empty), None);
        assert_eq!(mean_title_length(&empty), None);
        assert!(description_length_histogram(&empty, 30).is_empty());
        assert!(top_positive(&empty, 5).is_empty());
        assert!(title_word_counts(&empty, 10).is_empty());
        assert!(correlation_matrix(&empty).values.iter().flatten().all(Option::is_none));
    }
}
