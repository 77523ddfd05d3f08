use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::aggregate::RegionOrder;
use crate::data::export::DEFAULT_EXPORT_NAME;
use crate::data::model::ChartCategory;
use crate::state::AppState;

const SOURCE_URL: &str = "https://openstat.psa.gov.ph/";

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    let regions = match &state.dataset {
        Ok(ds) => ds.regions.clone(),
        Err(_) => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // ---- Category selector ----
    ui.strong("Category for charts");
    let mut category = state.selection.category;
    egui::ComboBox::from_id_salt("chart_category")
        .selected_text(category.label())
        .show_ui(ui, |ui: &mut Ui| {
            for option in ChartCategory::ALL {
                ui.selectable_value(&mut category, option, option.label());
            }
        });
    state.set_category(category);

    let mut by_rate = state.region_order == RegionOrder::ByRateDescending;
    if ui.checkbox(&mut by_rate, "Sort regions by rate").changed() {
        state.set_region_order(if by_rate {
            RegionOrder::ByRateDescending
        } else {
            RegionOrder::ByRegion
        });
    }
    ui.separator();

    // ---- Region multiselect ----
    let header_text = format!(
        "Regions  ({}/{})",
        state.selection.regions.len(),
        regions.len()
    );
    ui.strong(header_text);
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all();
        }
        if ui.small_button("None").clicked() {
            state.select_none();
        }
    });

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for region in &regions {
                let mut checked = state.selection.regions.contains(region);
                let text = RichText::new(region).color(state.region_colors.color_for(region));
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_region(region);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            let enabled = state.dataset.is_ok();
            if ui
                .add_enabled(enabled, egui::Button::new("Export data…"))
                .clicked()
            {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Ok(ds) = &state.dataset {
            ui.label(format!(
                "{} rows, {} regions, {} vaccines, {} selected",
                ds.len(),
                ds.regions.len(),
                ds.vaccines.len(),
                state.selection.regions.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                ui.visuals().text_color()
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Footer
// ---------------------------------------------------------------------------

pub fn footer(ui: &mut Ui) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.strong("Data Source:");
        ui.hyperlink_to(
            "OpenStat PSA – Vaccination by Region, Year and Type of Vaccination of Children Age 12-23 months",
            SOURCE_URL,
        );
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export coverage data")
        .set_file_name(DEFAULT_EXPORT_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        state.export_to(&path);
    }
}
