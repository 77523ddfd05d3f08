use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{uniform_grid_spacer, Bar, BarChart, Line, Plot, PlotPoint, Points, Text};

use crate::color::{intensity, text_on, RegionColors};
use crate::data::pivot::PivotMatrix;
use crate::data::views::{RegionBreakdown, Views};

// ---------------------------------------------------------------------------
// KPI row
// ---------------------------------------------------------------------------

/// Render the key figures. Empty aggregates show a message, never a zero.
pub fn kpi_row(ui: &mut Ui, views: &Views) {
    ui.heading("Key Demographics");
    ui.columns(3, |cols| {
        kpi(
            &mut cols[0],
            "Total Children Target (in Thousands)",
            views
                .population
                .value()
                .map(|t| format!("{}k", group_digits(t))),
            "No demographic data available for the selected filters.",
        );
        kpi(
            &mut cols[1],
            &format!("Avg. Coverage ({})", views.category),
            views.average_coverage.map(|v| format!("{v:.2}%")),
            "No coverage data for the selected regions.",
        );
        kpi(
            &mut cols[2],
            &format!("Max. Coverage ({})", views.category),
            views.max_coverage.map(|v| format!("{v:.2}%")),
            "No coverage data for the selected regions.",
        );
    });
}

fn kpi(ui: &mut Ui, label: &str, value: Option<String>, empty: &str) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(label);
        match value {
            Some(v) => {
                ui.label(RichText::new(v).size(26.0).strong());
            }
            None => {
                ui.colored_label(Color32::from_rgb(200, 150, 0), empty);
            }
        }
    });
}

/// `1234567.4` → `"1,234,567"`.
fn group_digits(value: f64) -> String {
    let rounded = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0.0 && rounded != "0" {
        out.insert(0, '-');
    }
    out
}

// ---------------------------------------------------------------------------
// Average rate by region (bar chart)
// ---------------------------------------------------------------------------

pub fn region_bar_chart(ui: &mut Ui, views: &Views, colors: &RegionColors) {
    ui.strong(format!("Avg. {} Coverage by Region", views.category));
    if views.region_averages.is_empty() {
        ui.label("No data for the selected regions.");
        return;
    }

    let bars: Vec<Bar> = views
        .region_averages
        .iter()
        .enumerate()
        .map(|(i, avg)| {
            Bar::new(i as f64, avg.mean)
                .name(format!("{} ({} rows)", avg.region, avg.rows))
                .fill(colors.color_for(&avg.region))
                .width(0.7)
        })
        .collect();
    let labels: Vec<String> = views
        .region_averages
        .iter()
        .map(|avg| avg.region.clone())
        .collect();
    let top = views
        .region_averages
        .iter()
        .map(|avg| avg.mean)
        .fold(0.0, f64::max);

    Plot::new("region_bar_chart")
        .height(320.0)
        .include_y(0.0)
        // headroom for the value labels
        .include_y(top * 1.08)
        .y_axis_label("Coverage Rate (%)")
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 1.0, 1.0]))
        .x_axis_formatter(move |mark, _range| axis_label(&labels, mark.value))
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
            for (i, avg) in views.region_averages.iter().enumerate() {
                plot_ui.text(
                    Text::new(PlotPoint::new(i as f64, avg.mean), bar_label(avg.mean))
                        .anchor(egui::Align2::CENTER_BOTTOM),
                );
            }
        });
}

/// Value printed above a bar, one decimal.
fn bar_label(mean: f64) -> String {
    format!("{mean:.1}")
}

/// Category label for an integer axis position, blank elsewhere.
fn axis_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Region × vaccine heatmap
// ---------------------------------------------------------------------------

/// Render the pivot matrix as a coloured table. Absent cells stay blank and
/// do not affect the colour scale.
pub fn heatmap(ui: &mut Ui, pivot: &PivotMatrix) {
    ui.strong("Coverage Intensity Heatmap");
    let Some(range) = pivot.value_range() else {
        ui.label("No data for the selected regions.");
        return;
    };

    egui::ScrollArea::horizontal()
        .id_salt("heatmap_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(false)
                .column(Column::auto().at_least(110.0))
                .columns(Column::exact(64.0), pivot.vaccines().len())
                .header(22.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("Region");
                    });
                    for vaccine in pivot.vaccines() {
                        header.col(|ui| {
                            ui.strong(vaccine);
                        });
                    }
                })
                .body(|mut body| {
                    for (i, region) in pivot.regions().iter().enumerate() {
                        body.row(20.0, |mut row| {
                            row.col(|ui| {
                                ui.label(region);
                            });
                            for cell in pivot.row(i).unwrap_or_default() {
                                row.col(|ui| match cell {
                                    Some(v) => {
                                        let bg = intensity(*v, range);
                                        ui.label(
                                            RichText::new(format!("{v:.1}"))
                                                .background_color(bg)
                                                .color(text_on(bg)),
                                        );
                                    }
                                    None => {
                                        ui.weak("–");
                                    }
                                });
                            }
                        });
                    }
                });
        });

    ui.label(format!(
        "Scale {:.1}% – {:.1}% over {} of {} cells",
        range.0,
        range.1,
        pivot.present(),
        pivot.regions().len() * pivot.vaccines().len()
    ));
}

// ---------------------------------------------------------------------------
// Per-region lollipop charts
// ---------------------------------------------------------------------------

pub fn lollipops(ui: &mut Ui, views: &Views, colors: &RegionColors) {
    ui.heading("Regional Breakdown");
    if views.breakdowns.is_empty() {
        ui.label("No data for the selected regions.");
        return;
    }
    for breakdown in &views.breakdowns {
        lollipop(ui, breakdown, colors.color_for(&breakdown.region));
    }
}

fn lollipop(ui: &mut Ui, breakdown: &RegionBreakdown, color: Color32) {
    ui.strong(&breakdown.region);

    let labels: Vec<String> = breakdown
        .entries
        .iter()
        .map(|e| e.vaccine.clone())
        .collect();
    let height = 40.0 + 22.0 * breakdown.entries.len() as f32;

    Plot::new(("lollipop", &breakdown.region))
        .height(height)
        .include_x(0.0)
        .include_x(100.0)
        .x_axis_label("Coverage Rate (%)")
        .y_grid_spacer(uniform_grid_spacer(|_| [1.0, 1.0, 1.0]))
        .y_axis_formatter(move |mark, _range| axis_label(&labels, mark.value))
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            for (i, entry) in breakdown.entries.iter().enumerate() {
                let y = i as f64;
                plot_ui.line(
                    Line::new(vec![[0.0, y], [entry.rate, y]])
                        .color(color)
                        .width(2.0),
                );
                plot_ui.points(
                    Points::new(vec![[entry.rate, y]])
                        .name(format!("{}: {:.1}%", entry.vaccine, entry.rate))
                        .color(color)
                        .filled(true)
                        .radius(5.0),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits(0.0), "0");
        assert_eq!(group_digits(999.4), "999");
        assert_eq!(group_digits(3000.0), "3,000");
        assert_eq!(group_digits(1234567.6), "1,234,568");
        assert_eq!(group_digits(-2500.0), "-2,500");
    }

    #[test]
    fn test_bar_label_one_decimal() {
        assert_eq!(bar_label(85.0), "85.0");
        assert_eq!(bar_label(79.96), "80.0");
        assert_eq!(bar_label(62.34), "62.3");
    }

    #[test]
    fn test_axis_label() {
        let labels = vec!["A".to_string(), "B".to_string()];
        assert_eq!(axis_label(&labels, 0.0), "A");
        assert_eq!(axis_label(&labels, 1.0), "B");
        assert_eq!(axis_label(&labels, 0.5), "");
        assert_eq!(axis_label(&labels, 2.0), "");
        assert_eq!(axis_label(&labels, -1.0), "");
    }
}
