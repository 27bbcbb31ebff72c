use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::model::{CatalogTable, Record};

/// One exported line: the source columns followed by the derived ones.
/// Field order is the column order of the file.
#[derive(Serialize)]
struct ExportRow<'a> {
    show_id: Option<&'a str>,
    #[serde(rename = "type")]
    kind: &'static str,
    title: &'a str,
    director: &'a str,
    cast: &'a str,
    country: &'a str,
    date_added: String,
    release_year: Option<i32>,
    rating: Option<&'a str>,
    duration: &'a str,
    listed_in: &'a str,
    description: &'a str,
    year_added: i32,
    month_added: u32,
    primary_country: &'a str,
    duration_minutes: Option<u32>,
    duration_seasons: Option<u32>,
    sentiment_score: f64,
    sentiment_label: &'static str,
    description_length: usize,
    title_length: usize,
}

impl<'a> From<&'a Record> for ExportRow<'a> {
    fn from(rec: &'a Record) -> Self {
        ExportRow {
            show_id: rec.show_id.as_deref(),
            kind: rec.content_type.as_str(),
            title: &rec.title,
            director: &rec.director,
            cast: &rec.cast,
            country: &rec.country_raw,
            date_added: rec.date_added.format("%Y-%m-%d").to_string(),
            release_year: rec.release_year,
            rating: rec.rating.as_deref(),
            duration: &rec.duration_raw,
            listed_in: &rec.listed_in_raw,
            description: &rec.description,
            year_added: rec.year_added,
            month_added: rec.month_added,
            primary_country: &rec.primary_country,
            duration_minutes: rec.duration_minutes,
            duration_seasons: rec.duration_seasons,
            sentiment_score: rec.sentiment_score,
            sentiment_label: rec.sentiment_label.as_str(),
            description_length: rec.description_length,
            title_length: rec.title_length,
        }
    }
}

const HEADER: [&str; 21] = [
    "show_id",
    "type",
    "title",
    "director",
    "cast",
    "country",
    "date_added",
    "release_year",
    "rating",
    "duration",
    "listed_in",
    "description",
    "year_added",
    "month_added",
    "primary_country",
    "duration_minutes",
    "duration_seasons",
    "sentiment_score",
    "sentiment_label",
    "description_length",
    "title_length",
];

/// Write `table` as comma-separated text with a header row. The header is
/// written even when the table is empty.
pub fn write_csv<W: Write>(table: &CatalogTable, writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(HEADER).context("writing CSV header")?;
    for rec in table.records() {
        wtr.serialize(ExportRow::from(rec))
            .with_context(|| format!("writing row {}", rec.id))?;
    }
    wtr.flush().context("flushing CSV output")?;
    Ok(())
}

pub fn to_csv_string(table: &CatalogTable) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    String::from_utf8(buf).context("CSV output is not UTF-8")
}

/// Export `table` to a file at `path`, replacing any existing file.
pub fn export_csv(table: &CatalogTable, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(table, std::io::BufWriter::new(file))
        .with_context(|| format!("exporting to {}", path.display()))?;
    log::info!("Exported {} titles to {}", table.len(), path.display());
    Ok(())
}
