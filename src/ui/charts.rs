use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints};

use crate::color::{sentiment_color, ColorMap, ACCENT};
use crate::data::aggregate::{
    correlation_matrix, cross_counts, description_length_histogram, group_counts,
    mean_description_length, mean_title_length, movie_duration_stats, season_stats,
    sentiment_score_histogram, title_word_counts, top_positive, value_counts, Column,
    HistogramBin,
};
use crate::data::model::{CatalogTable, CellValue, ContentType};
use crate::data::sentiment::SentimentLabel;
use crate::state::{AppState, Tab};

const CHART_HEIGHT: f32 = 260.0;
const HISTOGRAM_BINS: usize = 30;
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// ---------------------------------------------------------------------------
// Tab dispatch (central panel)
// ---------------------------------------------------------------------------

/// Render the charts of the active tab for the filtered table.
pub fn show_tab(ui: &mut Ui, state: &AppState) {
    let table = &state.filtered;
    if table.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No data matches the selected filters. Please adjust your selection.");
        });
        return;
    }

    match state.tab {
        Tab::Overview => overview(ui, table),
        Tab::Genres => genres(ui, table),
        Tab::Duration => duration(ui, table),
        Tab::Text => text_analysis(ui, table),
        Tab::Sentiment => sentiment(ui, table),
        Tab::Trends => trends(ui, table),
        Tab::Data => super::table::data_table(ui, table),
    }
}

fn overview(ui: &mut Ui, table: &CatalogTable) {
    ui.columns(2, |cols: &mut [Ui]| {
        category_bars(
            &mut cols[0],
            "type_counts",
            &format!("Content Distribution ({} titles)", table.len()),
            &value_counts(table, Column::Type),
            ACCENT,
            false,
        );
        let mut countries = value_counts(table, Column::PrimaryCountry);
        countries.truncate(8);
        category_bars(
            &mut cols[1],
            "top_countries",
            "Top Countries in Selection",
            &countries,
            ACCENT,
            true,
        );
    });

    let by_year_type = cross_counts(table, Column::YearAdded, Column::Type);
    stacked_bars(ui, "year_type", "Content Added by Year and Type", &by_year_type);

    if group_counts(table, Column::YearAdded).len() > 1 {
        let points: Vec<[f64; 2]> = group_counts(table, Column::MonthAdded)
            .iter()
            .filter_map(|(month, n)| Some([month.as_f64()?, *n as f64]))
            .collect();
        ui.strong("Seasonal Content Addition Pattern");
        Plot::new("monthly")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
                month_label(mark.value)
            })
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from(points))
                        .color(ACCENT)
                        .width(2.0)
                        .name("Titles added"),
                );
            });
    }
}

fn genres(ui: &mut Ui, table: &CatalogTable) {
    let mut top = value_counts(table, Column::Genre);
    top.truncate(15);
    category_bars(ui, "top_genres", "Most Popular Genres", &top, ACCENT, true);

    let top10: BTreeSet<CellValue> = top.iter().take(10).map(|(g, _)| g.clone()).collect();
    let genre_type: BTreeMap<(CellValue, CellValue), usize> =
        cross_counts(table, Column::Genre, Column::Type)
            .into_iter()
            .filter(|((genre, _), _)| top10.contains(genre))
            .collect();
    stacked_bars(ui, "genre_type", "Genre Distribution by Content Type", &genre_type);
}

fn duration(ui: &mut Ui, table: &CatalogTable) {
    ui.columns(2, |cols: &mut [Ui]| {
        let minutes: Vec<f64> = table
            .records()
            .iter()
            .filter(|r| r.content_type == ContentType::Movie)
            .filter_map(|r| r.duration_minutes.map(f64::from))
            .collect();
        histogram_plot(
            &mut cols[0],
            "movie_durations",
            "Movie Duration Distribution (minutes)",
            &crate::data::aggregate::histogram(&minutes, HISTOGRAM_BINS),
            ACCENT,
        );
        match movie_duration_stats(table) {
            Some(s) => {
                cols[0].label(format!(
                    "Average {:.0} min · Shortest {:.0} min · Longest {:.0} min",
                    s.mean, s.min, s.max
                ));
            }
            None => {
                cols[0].label("No movies in the selection.");
            }
        }

        let mut seasons: Vec<(CellValue, usize)> = value_counts(table, Column::DurationSeasons)
            .into_iter()
            .filter(|(k, _)| *k != CellValue::Null)
            .collect();
        seasons.truncate(10);
        category_bars(&mut cols[1], "seasons", "TV Show Seasons", &seasons, ACCENT, false);
        match season_stats(table) {
            Some(s) => {
                cols[1].label(format!(
                    "Average {:.1} seasons · Shortest {:.0} · Longest {:.0}",
                    s.mean, s.min, s.max
                ));
            }
            None => {
                cols[1].label("No TV shows in the selection.");
            }
        }
    });
}

fn text_analysis(ui: &mut Ui, table: &CatalogTable) {
    ui.columns(2, |cols: &mut [Ui]| {
        let words: Vec<(CellValue, usize)> = title_word_counts(table, 20)
            .into_iter()
            .map(|(w, n)| (CellValue::String(w), n))
            .collect();
        category_bars(&mut cols[0], "title_words", "Most Common Title Words", &words, ACCENT, true);

        histogram_plot(
            &mut cols[1],
            "description_length",
            "Description Length Distribution (characters)",
            &description_length_histogram(table, HISTOGRAM_BINS),
            ACCENT,
        );
        if let (Some(desc), Some(title)) =
            (mean_description_length(table), mean_title_length(table))
        {
            cols[1].label(format!(
                "Average length {desc:.0} chars · Average title length {title:.0} chars"
            ));
        }
    });
}

fn sentiment(ui: &mut Ui, table: &CatalogTable) {
    ui.columns(2, |cols: &mut [Ui]| {
        let counts = group_counts(table, Column::SentimentLabel);
        cols[0].strong("Sentiment Distribution");
        let labels = [SentimentLabel::Positive, SentimentLabel::Neutral, SentimentLabel::Negative];
        let charts: Vec<BarChart> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let n = counts.get(&CellValue::from(label.as_str())).copied().unwrap_or(0);
                BarChart::new(vec![Bar::new(i as f64, n as f64).width(0.7)])
                    .name(label.as_str())
                    .color(sentiment_color(*label))
            })
            .collect();
        let names: Vec<String> = labels.iter().map(ToString::to_string).collect();
        Plot::new("sentiment_labels")
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
                label_at(&names, mark.value)
            })
            .show(&mut cols[0], |plot_ui| {
                for chart in charts {
                    plot_ui.bar_chart(chart);
                }
            });

        histogram_plot(
            &mut cols[1],
            "sentiment_scores",
            "Sentiment Score Distribution",
            &sentiment_score_histogram(table, HISTOGRAM_BINS),
            ACCENT,
        );
    });

    ui.add_space(8.0);
    ui.strong("Recommended Titles");
    let recommended = top_positive(table, 5);
    if recommended.is_empty() {
        ui.label("No highly-rated titles found with current filters");
        return;
    }
    egui::Grid::new("recommended")
        .striped(true)
        .num_columns(4)
        .show(ui, |ui: &mut Ui| {
            for header in ["Title", "Type", "Country", "Score"] {
                ui.strong(header);
            }
            ui.end_row();
            for rec in recommended {
                ui.label(&rec.title);
                ui.label(rec.content_type.as_str());
                ui.label(&rec.primary_country);
                ui.label(
                    RichText::new(format!("{:.2}", rec.sentiment_score))
                        .color(sentiment_color(rec.sentiment_label)),
                );
                ui.end_row();
            }
        });
}

fn trends(ui: &mut Ui, table: &CatalogTable) {
    let yearly = group_counts(table, Column::YearAdded);
    if yearly.len() > 1 {
        let points: Vec<[f64; 2]> = yearly
            .iter()
            .filter_map(|(year, n)| Some([year.as_f64()?, *n as f64]))
            .collect();
        line_plot(
            ui,
            "growth",
            "Content Growth Over Time",
            vec![("Titles added".to_string(), points, ACCENT)],
        );
    }

    let by_year_type = cross_counts(table, Column::YearAdded, Column::Type);
    stacked_bars(ui, "type_trends", "Content Type Trends Over Time", &by_year_type);

    let top_countries: BTreeSet<CellValue> = value_counts(table, Column::PrimaryCountry)
        .into_iter()
        .filter(|(c, _)| *c != CellValue::from(crate::data::model::UNKNOWN))
        .take(5)
        .map(|(c, _)| c)
        .collect();
    if !top_countries.is_empty() {
        let colors = ColorMap::new(&top_countries);
        let mut per_country: BTreeMap<CellValue, Vec<[f64; 2]>> = BTreeMap::new();
        for ((year, country), n) in cross_counts(table, Column::YearAdded, Column::PrimaryCountry) {
            if !top_countries.contains(&country) {
                continue;
            }
            if let Some(x) = year.as_f64() {
                per_country.entry(country).or_default().push([x, n as f64]);
            }
        }
        let lines = per_country
            .into_iter()
            .map(|(country, points)| {
                let color = colors.color_for(&country);
                (country.to_string(), points, color)
            })
            .collect();
        line_plot(ui, "country_trends", "Top Countries Over Time", lines);
    }

    ui.add_space(8.0);
    ui.strong("Correlation Analysis");
    let matrix = correlation_matrix(table);
    egui::Grid::new("correlation")
        .striped(true)
        .num_columns(matrix.columns.len() + 1)
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for name in &matrix.columns {
                ui.strong(*name);
            }
            ui.end_row();
            for (name, row) in matrix.columns.iter().zip(&matrix.values) {
                ui.strong(*name);
                for value in row {
                    match value {
                        Some(r) => ui.label(
                            RichText::new(format!("{r:+.2}")).color(correlation_color(*r)),
                        ),
                        None => ui.label("–"),
                    };
                }
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Chart helpers
// ---------------------------------------------------------------------------

/// One bar per category, labelled on the category axis.
fn category_bars(
    ui: &mut Ui,
    id: &str,
    title: &str,
    entries: &[(CellValue, usize)],
    color: Color32,
    horizontal: bool,
) {
    ui.strong(title);
    let labels: Vec<String> = entries.iter().map(|(k, _)| k.to_string()).collect();
    let bars: Vec<Bar> = entries
        .iter()
        .enumerate()
        .map(|(i, (k, n))| Bar::new(i as f64, *n as f64).name(k).width(0.7))
        .collect();
    let mut chart = BarChart::new(bars).color(color).name(title);
    if horizontal {
        chart = chart.horizontal();
    }

    let formatter =
        move |mark: GridMark, _range: &RangeInclusive<f64>| label_at(&labels, mark.value);
    let plot = Plot::new(id).height(CHART_HEIGHT).allow_scroll(false);
    let plot = if horizontal {
        plot.y_axis_formatter(formatter)
    } else {
        plot.x_axis_formatter(formatter)
    };
    plot.show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

/// Bars stacked per series over shared categories. Keys are
/// `(category, series)`.
fn stacked_bars(
    ui: &mut Ui,
    id: &str,
    title: &str,
    counts: &BTreeMap<(CellValue, CellValue), usize>,
) {
    ui.strong(title);
    let categories: Vec<CellValue> = counts
        .keys()
        .map(|(c, _)| c.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let series: BTreeSet<CellValue> = counts.keys().map(|(_, s)| s.clone()).collect();
    let colors = ColorMap::new(&series);

    let mut charts: Vec<BarChart> = Vec::new();
    for s in &series {
        let bars: Vec<Bar> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let n = counts.get(&(c.clone(), s.clone())).copied().unwrap_or(0);
                Bar::new(i as f64, n as f64).width(0.7)
            })
            .collect();
        let below: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(bars)
            .name(s)
            .color(colors.color_for(s))
            .stack_on(&below);
        charts.push(chart);
    }

    let labels: Vec<String> = categories.iter().map(ToString::to_string).collect();
    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            label_at(&labels, mark.value)
        })
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

fn histogram_plot(ui: &mut Ui, id: &str, title: &str, bins: &[HistogramBin], color: Color32) {
    ui.strong(title);
    let bars: Vec<Bar> = bins
        .iter()
        .map(|b| Bar::new(b.center(), b.count as f64).width(b.width().max(f64::EPSILON)))
        .collect();
    let chart = BarChart::new(bars).color(color).name(title);
    Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

fn line_plot(ui: &mut Ui, id: &str, title: &str, lines: Vec<(String, Vec<[f64; 2]>, Color32)>) {
    ui.strong(title);
    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .x_axis_label("Year")
        .show(ui, |plot_ui| {
            for (name, points, color) in lines {
                plot_ui.line(
                    Line::new(PlotPoints::from(points))
                        .name(name)
                        .color(color)
                        .width(2.0),
                );
            }
        });
}

/// Category label for an integral axis position, blank in between.
fn label_at(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

fn month_label(value: f64) -> String {
    let month = value.round();
    if (value - month).abs() > 1e-6 || !(1.0..=12.0).contains(&month) {
        return String::new();
    }
    MONTHS[month as usize - 1].to_string()
}

/// Red for positive, blue for negative correlation, faded towards zero.
fn correlation_color(r: f64) -> Color32 {
    let strength = (r.abs().min(1.0) * 255.0) as u8;
    let fade = 255 - strength / 2;
    if r >= 0.0 {
        Color32::from_rgb(255, fade, fade)
    } else {
        Color32::from_rgb(fade, fade, 255)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_labels_only_on_integral_marks() {
        let labels = vec!["Movie".to_string(), "TV Show".to_string()];
        assert_eq!(label_at(&labels, 1.0), "TV Show");
        assert_eq!(label_at(&labels, 0.5), "");
        assert_eq!(label_at(&labels, 2.0), "");
        assert_eq!(label_at(&labels, -1.0), "");
        assert_eq!(month_label(3.0), "Mar");
        assert_eq!(month_label(13.0), "");
    }
}
