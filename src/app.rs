use eframe::egui::{self, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CatalogLensApp {
    pub state: AppState,
}

impl CatalogLensApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for CatalogLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics + tabbed charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.table.is_empty() {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Open a catalog file to get started  (File → Open…)");
                });
                return;
            }
            panels::metric_cards(ui, &self.state);
            ui.add_space(6.0);
            panels::tab_strip(ui, &mut self.state);
            ui.separator();
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    charts::show_tab(ui, &self.state);
                });
        });
    }
}
