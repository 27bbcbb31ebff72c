use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde_json::Value as JsonValue;

use super::model::{CatalogTable, ContentType, ParseWarning, Record, UNKNOWN};
use super::sentiment::{SentimentLabel, SentimentScorer};
use crate::error::LoadError;

/// Columns every catalog source must provide.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "title",
    "type",
    "director",
    "cast",
    "country",
    "date_added",
    "release_year",
    "listed_in",
    "duration",
    "description",
];

/// Accepted `date_added` layouts, tried in order.
const DATE_FORMATS: [&str; 6] = [
    "%B %d, %Y",
    "%b %d, %Y",
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d-%b-%y",
    "%Y/%m/%d",
];

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and enrich a catalog from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` – header row with at least [`REQUIRED_COLUMNS`]
/// * `.tsv` – same, tab separated
/// * `.json` – `[{ "title": ..., "type": ..., ... }, ...]`
pub fn load_file(path: &Path, scorer: &dyn SentimentScorer) -> Result<CatalogTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_delimited(path, b',', scorer),
        "tsv" => load_delimited(path, b'\t', scorer),
        "json" => load_json(path, scorer),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }?;

    log::info!(
        "Loaded {} titles from {} ({} recovered rows)",
        table.len(),
        path.display(),
        table.warnings().len()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Raw rows, before enrichment
// ---------------------------------------------------------------------------

/// One source row with blank cells already mapped to `None`.
#[derive(Debug, Default)]
struct RawRow {
    show_id: Option<String>,
    kind: Option<String>,
    title: Option<String>,
    director: Option<String>,
    cast: Option<String>,
    country: Option<String>,
    date_added: Option<String>,
    release_year: Option<String>,
    rating: Option<String>,
    listed_in: Option<String>,
    duration: Option<String>,
    description: Option<String>,
}

impl RawRow {
    /// Build a row from a column lookup; `cell` returns the raw text of a
    /// named column, if the column exists.
    fn from_lookup<'a>(cell: impl Fn(&str) -> Option<&'a str>) -> Self {
        let get = |name: &str| non_blank(cell(name));
        RawRow {
            show_id: get("show_id"),
            kind: get("type"),
            title: get("title"),
            director: get("director"),
            cast: get("cast"),
            country: get("country"),
            date_added: get("date_added"),
            release_year: get("release_year"),
            rating: get("rating"),
            listed_in: get("listed_in"),
            duration: get("duration"),
            description: get("description"),
        }
    }
}

fn non_blank(s: Option<&str>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty()).map(|v| v.to_string())
}

fn check_columns<'a>(present: impl IntoIterator<Item = &'a str>) -> Result<(), LoadError> {
    let present: BTreeSet<&str> = present.into_iter().collect();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !present.contains(*c))
        .map(|c| c.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(LoadError::MissingColumns(missing))
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_delimited(
    path: &Path,
    delimiter: u8,
    scorer: &dyn SentimentScorer,
) -> Result<CatalogTable, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_reader(file, delimiter, scorer)
}

/// Parse delimited text with a header row from any reader.
pub fn load_reader<R: Read>(
    reader: R,
    delimiter: u8,
    scorer: &dyn SentimentScorer,
) -> Result<CatalogTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers: HashMap<String, usize> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().trim_start_matches('\u{feff}').to_string(), i))
        .collect();
    check_columns(headers.keys().map(String::as_str))?;

    let mut builder = TableBuilder::new(scorer);
    for result in reader.records() {
        let record = result?;
        let raw = RawRow::from_lookup(|name| headers.get(name).and_then(|&i| record.get(i)));
        builder.push(raw)?;
    }
    Ok(builder.finish())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path, scorer: &dyn SentimentScorer) -> Result<CatalogTable, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_json(&text, scorer)
}

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "title": "Dick Johnson Is Dead", "type": "Movie", "release_year": 2020, ... },
///   ...
/// ]
/// ```
///
/// A key absent from one object is treated as a missing cell; a required key
/// absent from every object is a [`LoadError::MissingColumns`].
pub fn parse_json(text: &str, scorer: &dyn SentimentScorer) -> Result<CatalogTable, LoadError> {
    let root: JsonValue = serde_json::from_str(text)?;
    let records = root.as_array().ok_or(LoadError::NotAnArray)?;

    let mut objects = Vec::with_capacity(records.len());
    for (row, rec) in records.iter().enumerate() {
        objects.push(rec.as_object().ok_or(LoadError::InvalidRow { row })?);
    }
    if objects.is_empty() {
        return Ok(CatalogTable::empty());
    }
    check_columns(objects.iter().flat_map(|obj| obj.keys().map(String::as_str)))?;

    let mut builder = TableBuilder::new(scorer);
    for obj in objects {
        let cells: HashMap<&str, String> = obj
            .iter()
            .filter_map(|(k, v)| json_to_text(v).map(|t| (k.as_str(), t)))
            .collect();
        builder.push(RawRow::from_lookup(|name| cells.get(name).map(String::as_str)))?;
    }
    Ok(builder.finish())
}

fn json_to_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

/// Accumulates enriched records and the warnings raised along the way.
struct TableBuilder<'s> {
    scorer: &'s dyn SentimentScorer,
    records: Vec<Record>,
    warnings: Vec<ParseWarning>,
}

impl<'s> TableBuilder<'s> {
    fn new(scorer: &'s dyn SentimentScorer) -> Self {
        TableBuilder {
            scorer,
            records: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn push(&mut self, raw: RawRow) -> Result<(), LoadError> {
        let id = self.records.len();
        let record = self.enrich(id, raw)?;
        self.records.push(record);
        Ok(())
    }

    fn warn(&mut self, warning: ParseWarning) {
        log::debug!("{warning}");
        self.warnings.push(warning);
    }

    fn enrich(&mut self, id: usize, raw: RawRow) -> Result<Record, LoadError> {
        let release_year_text = raw.release_year.unwrap_or_default();
        let release_year = parse_year(&release_year_text);

        let date_text = raw.date_added.unwrap_or_default();
        let date_added = match parse_date(&date_text) {
            Some(date) => date,
            None => {
                self.warn(ParseWarning::DateFallback {
                    row: id,
                    value: date_text.clone(),
                });
                // the fallback is the only place a valid release year is required
                release_year
                    .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
                    .ok_or_else(|| LoadError::InvalidField {
                        row: id,
                        column: "release_year",
                        value: release_year_text.clone(),
                    })?
            }
        };

        let duration_raw = raw.duration.unwrap_or_default();
        let type_text = raw.kind.unwrap_or_default();
        let content_type = match type_text.parse::<ContentType>() {
            Ok(ct) => ct,
            Err(()) => {
                self.warn(ParseWarning::UnknownType {
                    row: id,
                    value: type_text.clone(),
                });
                if duration_raw.contains("Season") {
                    ContentType::TvShow
                } else {
                    ContentType::Movie
                }
            }
        };

        let (duration_minutes, duration_seasons) = match parse_duration(&duration_raw, content_type)
        {
            Duration::Minutes(m) => (Some(m), None),
            Duration::Seasons(s) => (None, Some(s)),
            Duration::Absent => (None, None),
            Duration::Unparsed => {
                self.warn(ParseWarning::UnparsedDuration {
                    row: id,
                    value: duration_raw.clone(),
                });
                (None, None)
            }
        };

        let title = raw.title.unwrap_or_default();
        let country_raw = raw.country.unwrap_or_else(|| UNKNOWN.to_string());
        let listed_in_raw = raw.listed_in.unwrap_or_default();
        let description = raw.description.unwrap_or_default();

        let sentiment_score = if description.is_empty() {
            0.0
        } else {
            self.scorer.compound(&description)
        };

        Ok(Record {
            id,
            show_id: raw.show_id,
            title_length: title.chars().count(),
            title,
            content_type,
            director: raw.director.unwrap_or_else(|| UNKNOWN.to_string()),
            cast: raw.cast.unwrap_or_else(|| UNKNOWN.to_string()),
            primary_country: primary_country(&country_raw),
            country_raw,
            year_added: date_added.year(),
            month_added: date_added.month(),
            date_added,
            release_year,
            rating: raw.rating,
            genres: split_genres(&listed_in_raw),
            listed_in_raw,
            duration_raw,
            duration_minutes,
            duration_seasons,
            description_length: description.chars().count(),
            description,
            sentiment_label: SentimentLabel::from_score(sentiment_score),
            sentiment_score,
        })
    }

    fn finish(self) -> CatalogTable {
        if !self.warnings.is_empty() {
            log::warn!(
                "{} of {} rows needed fallback values while loading",
                self.warnings.len(),
                self.records.len()
            );
        }
        CatalogTable::new(self.records, self.warnings)
    }
}

/// Integer year, also accepting the `2019.0` form float columns produce.
fn parse_year(s: &str) -> Option<i32> {
    let s = s.trim();
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let f = s.parse::<f64>().ok()?;
    if f.fract() == 0.0 && f.abs() < i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}

/// Permissive `date_added` parser; `None` for blank or unrecognised text.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// First comma-separated country, trimmed.
pub fn primary_country(country: &str) -> String {
    country.split(',').next().unwrap_or("").trim().to_string()
}

/// Split `listed_in` on `", "`. An empty field yields `[""]`.
pub fn split_genres(listed_in: &str) -> Vec<String> {
    listed_in.split(", ").map(str::to_string).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Duration {
    Minutes(u32),
    Seasons(u32),
    Absent,
    /// Unit found but no leading number.
    Unparsed,
}

/// Minutes only for movies, seasons for anything mentioning "Season".
pub(crate) fn parse_duration(raw: &str, content_type: ContentType) -> Duration {
    let leading = || raw.split_whitespace().next().and_then(|t| t.parse::<u32>().ok());
    if content_type == ContentType::Movie && raw.contains("min") {
        leading().map_or(Duration::Unparsed, Duration::Minutes)
    } else if raw.contains("Season") {
        leading().map_or(Duration::Unparsed, Duration::Seasons)
    } else {
        Duration::Absent
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Deterministic scorer: +0.5 if the text mentions "love", -0.5 for
    /// "war", 0 otherwise.
    pub(crate) struct KeywordScorer;

    impl SentimentScorer for KeywordScorer {
        fn compound(&self, text: &str) -> f64 {
            let lower = text.to_lowercase();
            if lower.contains("love") {
                0.5
            } else if lower.contains("war") {
                -0.5
            } else {
                0.0
            }
        }
    }

    pub(crate) const HEADER: &str =
        "show_id,type,title,director,cast,country,date_added,release_year,rating,duration,listed_in,description";

    pub(crate) fn load_csv_str(body: &str) -> CatalogTable {
        let text = format!("{HEADER}\n{body}");
        load_reader(text.as_bytes(), b',', &KeywordScorer).unwrap()
    }

    #[test]
    fn fills_missing_fields_and_derives_features() {
        let table = load_csv_str(
            "s1,Movie,Dick Johnson Is Dead,Kirsten Johnson,,\"United States, Ghana\",\"September 25, 2021\",2020,PG-13,90 min,\"Documentaries, International Movies\",A love letter\n",
        );
        assert_eq!(table.len(), 1);
        let rec = &table.records()[0];
        assert_eq!(rec.show_id.as_deref(), Some("s1"));
        assert_eq!(rec.cast, UNKNOWN);
        assert_eq!(rec.primary_country, "United States");
        assert_eq!(rec.year_added, 2021);
        assert_eq!(rec.month_added, 9);
        assert_eq!(rec.genres, vec!["Documentaries", "International Movies"]);
        assert_eq!(rec.duration_minutes, Some(90));
        assert_eq!(rec.duration_seasons, None);
        assert_eq!(rec.sentiment_score, 0.5);
        assert_eq!(rec.sentiment_label, SentimentLabel::Positive);
        assert_eq!(rec.title_length, "Dick Johnson Is Dead".chars().count());
        assert_eq!(rec.description_length, "A love letter".len());
        assert!(table.warnings().is_empty());
    }

    #[test]
    fn blank_cells_get_sentinels() {
        let table = load_csv_str("s2,TV Show,Blood & Water,,,,,2021,,2 Seasons,,\n");
        let rec = &table.records()[0];
        assert_eq!(rec.director, UNKNOWN);
        assert_eq!(rec.country_raw, UNKNOWN);
        assert_eq!(rec.primary_country, UNKNOWN);
        assert_eq!(rec.description, "");
        assert_eq!(rec.sentiment_score, 0.0);
        assert_eq!(rec.sentiment_label, SentimentLabel::Neutral);
        assert_eq!(rec.genres, vec![String::new()]);
        assert_eq!(rec.duration_seasons, Some(2));
        assert_eq!(rec.duration_minutes, None);
        assert_eq!(rec.rating, None);
    }

    #[test]
    fn bad_date_falls_back_to_release_year() {
        let table = load_csv_str(
            "s3,Movie,Odd Date,,,,not a date,2015,,100 min,Dramas,\ns4,Movie,No Date,,,,,2012,,80 min,Dramas,\n",
        );
        let dates: Vec<_> = table.records().iter().map(|r| (r.year_added, r.month_added)).collect();
        assert_eq!(dates, vec![(2015, 1), (2012, 1)]);
        assert_eq!(
            table.records()[0].date_added,
            NaiveDate::from_ymd_opt(2015, 1, 1).unwrap()
        );
        assert_eq!(table.warnings().len(), 2);
        assert!(matches!(
            table.warnings()[0],
            ParseWarning::DateFallback { row: 0, .. }
        ));
    }

    #[test]
    fn accepts_several_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2019, 8, 4).unwrap();
        for text in [
            " August 4, 2019",
            "Aug 4, 2019",
            "2019-08-04",
            "08/04/2019",
            "04-Aug-19",
            "2019-08-04 10:30:00",
            "2019-08-04T10:30:00+02:00",
        ] {
            assert_eq!(parse_date(text), Some(expected), "format {text:?}");
        }
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn duration_never_sets_both_units() {
        assert_eq!(parse_duration("90 min", ContentType::Movie), Duration::Minutes(90));
        assert_eq!(parse_duration("1 Season", ContentType::TvShow), Duration::Seasons(1));
        assert_eq!(parse_duration("3 Seasons", ContentType::TvShow), Duration::Seasons(3));
        // minutes are only meaningful for movies
        assert_eq!(parse_duration("45 min", ContentType::TvShow), Duration::Absent);
        assert_eq!(parse_duration("", ContentType::Movie), Duration::Absent);
        assert_eq!(parse_duration("TV-MA", ContentType::Movie), Duration::Absent);
        assert_eq!(parse_duration("long min", ContentType::Movie), Duration::Unparsed);

        let table = load_csv_str(
            "a,Movie,A,,,,,2020,,74 min,Dramas,\nb,TV Show,B,,,,,2020,,4 Seasons,Dramas,\nc,Movie,C,,,,,2020,,,Dramas,\n",
        );
        for rec in table.records() {
            assert!(!(rec.duration_minutes.is_some() && rec.duration_seasons.is_some()));
        }
    }

    #[test]
    fn unknown_type_is_inferred_not_dropped() {
        let table = load_csv_str("x,,Mystery,,,,,2020,,2 Seasons,Dramas,\n");
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].content_type, ContentType::TvShow);
        assert!(table
            .warnings()
            .iter()
            .any(|w| matches!(w, ParseWarning::UnknownType { row: 0, .. })));
    }

    #[test]
    fn label_matches_score_for_every_row() {
        let table = load_csv_str(
            "a,Movie,A,,,,,2020,,90 min,Dramas,love\nb,Movie,B,,,,,2020,,90 min,Dramas,war\nc,Movie,C,,,,,2020,,90 min,Dramas,plain\n",
        );
        for rec in table.records() {
            assert_eq!(rec.sentiment_label, SentimentLabel::from_score(rec.sentiment_score));
        }
    }

    #[test]
    fn missing_columns_is_fatal() {
        let err =
            load_reader("title,type\nA,Movie\n".as_bytes(), b',', &KeywordScorer).unwrap_err();
        match err {
            LoadError::MissingColumns(cols) => {
                assert!(cols.contains(&"release_year".to_string()));
                assert!(!cols.contains(&"title".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_release_year_is_fatal_only_when_the_date_falls_back() {
        let text = format!("{HEADER}\nx,Movie,A,,,,,soon,,90 min,Dramas,\n");
        let err = load_reader(text.as_bytes(), b',', &KeywordScorer).unwrap_err();
        assert!(matches!(err, LoadError::InvalidField { column: "release_year", .. }));

        let table = load_csv_str(
            "y,Movie,B,,,,\"March 3, 2020\",,,90 min,Dramas,\nz,Movie,C,,,,2021-05-01,soon,,95 min,Dramas,\n",
        );
        let years: Vec<_> =
            table.records().iter().map(|r| (r.release_year, r.year_added)).collect();
        assert_eq!(years, vec![(None, 2020), (None, 2021)]);
        assert!(table.warnings().is_empty());
    }

    #[test]
    fn header_only_source_is_an_empty_table() {
        let table = load_reader(format!("{HEADER}\n").as_bytes(), b',', &KeywordScorer).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn json_records_load_like_csv() {
        let json = r#"[
            {"title": "Love Actually", "type": "Movie", "director": null, "cast": "Hugh Grant",
             "country": "United Kingdom, United States", "date_added": "2019-12-01",
             "release_year": 2003, "listed_in": "Comedies, Romantic Movies",
             "duration": "135 min", "description": "Love stories"},
            {"title": "Narcos", "type": "TV Show", "director": "", "cast": null,
             "country": null, "date_added": null, "release_year": 2017.0,
             "listed_in": "Crime TV Shows", "duration": "3 Seasons", "description": "war on drugs"}
        ]"#;
        let table = parse_json(json, &KeywordScorer).unwrap();
        assert_eq!(table.titles().collect::<Vec<_>>(), vec!["Love Actually", "Narcos"]);
        let narcos = &table.records()[1];
        assert_eq!(narcos.release_year, Some(2017));
        assert_eq!(narcos.year_added, 2017);
        assert_eq!(narcos.primary_country, UNKNOWN);
        assert_eq!(narcos.director, UNKNOWN);
        assert_eq!(narcos.sentiment_label, SentimentLabel::Negative);
        assert_eq!(table.records()[0].primary_country, "United Kingdom");
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        assert!(matches!(parse_json("{}", &KeywordScorer), Err(LoadError::NotAnArray)));
        assert!(matches!(
            parse_json("[1]", &KeywordScorer),
            Err(LoadError::InvalidRow { row: 0 })
        ));
        assert!(parse_json("[]", &KeywordScorer).unwrap().is_empty());
        assert!(matches!(
            parse_json(r#"[{"title": "A"}]"#, &KeywordScorer),
            Err(LoadError::MissingColumns(_))
        ));
    }

    #[test]
    fn load_file_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("catalog.csv");
        std::fs::write(
            &csv_path,
            format!("{HEADER}\na,Movie,A,,,,,2020,,90 min,Dramas,\n"),
        )
        .unwrap();
        assert_eq!(load_file(&csv_path, &KeywordScorer).unwrap().len(), 1);

        let tsv_path = dir.path().join("catalog.tsv");
        let tsv = format!(
            "{}\na\tMovie\tA\t\t\t\t\t2020\t\t90 min\tDramas\t\n",
            HEADER.replace(',', "\t")
        );
        std::fs::write(&tsv_path, tsv).unwrap();
        assert_eq!(load_file(&tsv_path, &KeywordScorer).unwrap().len(), 1);

        let other = dir.path().join("catalog.xlsx");
        std::fs::write(&other, "").unwrap();
        assert!(matches!(
            load_file(&other, &KeywordScorer),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));

        assert!(matches!(
            load_file(&dir.path().join("absent.csv"), &KeywordScorer),
            Err(LoadError::Io { .. })
        ));
    }
}
