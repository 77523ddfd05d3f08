use eframe::egui::{self, RichText, ScrollArea};

use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct VaxDashboardApp {
    pub state: AppState,
}

impl eframe::App for VaxDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Bottom panel: attribution ----
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            panels::footer(ui);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Err(e) = &self.state.dataset {
                // No dataset, no dashboard.
                ui.centered_and_justified(|ui| {
                    ui.heading(
                        RichText::new(format!("{e:#}")).color(egui::Color32::RED),
                    );
                });
                return;
            }

            ui.heading("Vaccination Coverage Dashboard");
            ui.label("Immunization coverage for children aged 12-23 months.");
            ui.separator();

            let Some(views) = self.state.view.views() else {
                ui.centered_and_justified(|ui| {
                    ui.heading("Select at least one region in the sidebar.");
                });
                return;
            };

            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    charts::kpi_row(ui, views);
                    ui.separator();

                    ui.columns(2, |cols| {
                        charts::region_bar_chart(&mut cols[0], views, &self.state.region_colors);
                        charts::heatmap(&mut cols[1], &views.pivot);
                    });
                    ui.separator();

                    charts::lollipops(ui, views, &self.state.region_colors);
                });
        });
    }
}
