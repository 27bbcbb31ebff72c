use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::aggregate::Summary;
use crate::data::filter::TypeSelection;
use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Controls");
    ui.separator();

    if state.table.is_empty() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Title search ----
            ui.strong("Title search");
            let mut query = state.title_query.clone();
            if ui.text_edit_singleline(&mut query).changed() {
                state.set_title_query(&query);
            }
            ui.separator();

            // ---- Year range ----
            ui.strong("Year added");
            let (min_year, max_year) = state.facets.year_bounds();
            let (mut lo, mut hi) = state.criteria.year_range;
            let from = ui.add(egui::Slider::new(&mut lo, min_year..=max_year).text("from"));
            let to = ui.add(egui::Slider::new(&mut hi, min_year..=max_year).text("to"));
            if from.changed() || to.changed() {
                state.set_year_range(lo, hi);
            }
            ui.separator();

            // ---- Content type ----
            let mut selection = state.criteria.content_type;
            egui::ComboBox::from_label("Content type")
                .selected_text(selection.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for option in TypeSelection::OPTIONS {
                        ui.selectable_value(&mut selection, option, option.to_string());
                    }
                });
            if selection != state.criteria.content_type {
                state.set_content_type(selection);
            }
            ui.separator();

            country_filter(ui, state);
            genre_filter(ui, state);

            ui.separator();
            if ui.button("Reset All Filters").clicked() {
                state.reset_filters();
            }
            if ui.button("Download Filtered Data…").clicked() {
                save_file_dialog(state);
            }
        });
}

fn country_filter(ui: &mut Ui, state: &mut AppState) {
    // Clone the options so the state can be mutated inside the loop.
    let countries = state.facets.countries.clone();
    let n_selected = state.criteria.countries.as_ref().map_or(0, |s| s.len());
    let header = if n_selected == 0 {
        format!("Countries  (all {})", countries.len())
    } else {
        format!("Countries  ({n_selected}/{})", countries.len())
    };

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("countries")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("Clear").clicked() {
                state.clear_countries();
            }
            ScrollArea::vertical()
                .id_salt("country_list")
                .max_height(200.0)
                .show(ui, |ui: &mut Ui| {
                    for country in &countries {
                        let mut checked = state
                            .criteria
                            .countries
                            .as_ref()
                            .is_some_and(|s| s.contains(country));
                        if ui.checkbox(&mut checked, country).changed() {
                            state.toggle_country(country);
                        }
                    }
                });
        });
}

fn genre_filter(ui: &mut Ui, state: &mut AppState) {
    let genres = state.facets.genres.clone();
    let n_selected = state.criteria.genres.as_ref().map_or(0, |s| s.len());
    let header = if n_selected == 0 {
        format!("Genres  (all {})", genres.len())
    } else {
        format!("Genres  ({n_selected}/{})", genres.len())
    };

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("genres")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_genres();
                }
                if ui.small_button("Clear").clicked() {
                    state.clear_genres();
                }
            });
            ScrollArea::vertical()
                .id_salt("genre_list")
                .max_height(240.0)
                .show(ui, |ui: &mut Ui| {
                    for genre in &genres {
                        let mut checked = state
                            .criteria
                            .genres
                            .as_ref()
                            .is_some_and(|s| s.contains(genre));
                        if ui.checkbox(&mut checked, genre).changed() {
                            state.toggle_genre(genre);
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.source.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                state.reload();
                ui.close_menu();
            }
            if ui.button("Export filtered…").clicked() {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if !state.table.is_empty() {
            ui.label(format!(
                "Showing {} of {} titles",
                state.filtered.len(),
                state.table.len()
            ));
        }

        if !state.table.warnings().is_empty() {
            ui.separator();
            ui.label(format!("{} rows recovered while loading", state.table.warnings().len()))
                .on_hover_text(
                    state
                        .table
                        .warnings()
                        .iter()
                        .take(20)
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("\n"),
                );
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::LIGHT_GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Metric cards and tab strip (top of the central panel)
// ---------------------------------------------------------------------------

pub fn metric_cards(ui: &mut Ui, state: &AppState) {
    let summary = Summary::of(&state.filtered, state.table.len());
    let cards = [
        ("Total Titles", summary.total.to_string(), Some(summary.delta)),
        ("Movies", summary.movies.to_string(), None),
        ("TV Shows", summary.tv_shows.to_string(), None),
        ("Countries", summary.countries.to_string(), None),
    ];
    ui.columns(cards.len(), |cols: &mut [Ui]| {
        for (col, (title, value, delta)) in cols.iter_mut().zip(cards) {
            col.group(|ui: &mut Ui| {
                ui.vertical_centered(|ui: &mut Ui| {
                    ui.label(title);
                    ui.heading(RichText::new(value).strong());
                    if let Some(delta) = delta {
                        let color = if delta < 0 {
                            Color32::LIGHT_RED
                        } else {
                            Color32::LIGHT_GREEN
                        };
                        ui.label(
                            RichText::new(format!("{delta:+} from total"))
                                .color(color)
                                .small(),
                        );
                    }
                });
            });
        }
    });
}

pub fn tab_strip(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.tab, tab, tab.label());
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open catalog data")
        .add_filter("Supported files", &["csv", "tsv", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("TSV", &["tsv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered titles")
        .set_file_name("filtered_catalog.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        state.export_filtered(&path);
    }
}
