use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::model::{CatalogTable, Record};

const ROW_HEIGHT: f32 = 18.0;

/// Columns of the raw-data view: header and cell text.
const COLUMNS: [(&str, fn(&Record) -> String); 9] = [
    ("Title", |r| r.title.clone()),
    ("Type", |r| r.content_type.to_string()),
    ("Country", |r| r.primary_country.clone()),
    ("Added", |r| r.date_added.format("%Y-%m-%d").to_string()),
    ("Released", |r| r.release_year.map_or_else(String::new, |y| y.to_string())),
    ("Rating", |r| r.rating.clone().unwrap_or_default()),
    ("Duration", |r| r.duration_raw.clone()),
    ("Genres", |r| r.genres.join(", ")),
    ("Sentiment", |r| format!("{} ({:+.2})", r.sentiment_label, r.sentiment_score)),
];

/// Scrollable table of the filtered rows, in table order.
pub fn data_table(ui: &mut Ui, table: &CatalogTable) {
    ui.label(format!("{} rows", table.len()));
    let records = table.records();

    let mut builder = TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::initial(240.0).at_least(80.0).clip(true));
    for _ in 1..COLUMNS.len() - 1 {
        builder = builder.column(Column::auto().clip(true));
    }
    builder
        .column(Column::remainder())
        .header(ROW_HEIGHT + 2.0, |mut header| {
            for (name, _) in COLUMNS {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, records.len(), |mut row| {
                let rec = &records[row.index()];
                for (_, cell) in COLUMNS {
                    row.col(|ui| {
                        ui.label(cell(rec));
                    });
                }
            });
        });
}
