use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Region colours
// ---------------------------------------------------------------------------

/// Fixed colour per region, built from the full region list so a region
/// keeps its colour whatever else is selected.
#[derive(Debug, Clone, Default)]
pub struct RegionColors {
    mapping: BTreeMap<String, Color32>,
}

impl RegionColors {
    pub fn new(regions: &[String]) -> Self {
        let palette = generate_palette(regions.len());
        RegionColors {
            mapping: regions.iter().cloned().zip(palette).collect(),
        }
    }

    pub fn color_for(&self, region: &str) -> Color32 {
        self.mapping.get(region).copied().unwrap_or(Color32::GRAY)
    }
}

// ---------------------------------------------------------------------------
// Intensity scale for the heatmap
// ---------------------------------------------------------------------------

/// Viridis anchor colours, evenly spaced over [0, 1].
const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

/// Viridis-like colour at `t` in [0, 1] (clamped).
pub fn viridis(t: f64) -> Color32 {
    let t = t.clamp(0.0, 1.0) as f32;
    let segments = (VIRIDIS.len() - 1) as f32;
    let pos = t * segments;
    let i = (pos.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = pos - i as f32;

    let lin = |(r, g, b): (u8, u8, u8)| -> LinSrgb {
        Srgb::<u8>::new(r, g, b).into_format::<f32>().into_linear()
    };
    let mixed = lin(VIRIDIS[i]).mix(lin(VIRIDIS[i + 1]), frac);
    to_color32(Srgb::from_linear(mixed))
}

/// Colour of `value` on a scale spanning `range`. A flat range maps to the
/// middle of the scale.
pub fn intensity(value: f64, (lo, hi): (f64, f64)) -> Color32 {
    let span = hi - lo;
    if span.abs() < f64::EPSILON {
        return viridis(0.5);
    }
    viridis((value - lo) / span)
}

/// Readable text colour on top of an intensity cell.
pub fn text_on(background: Color32) -> Color32 {
    let [r, g, b, _] = background.to_array();
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}
