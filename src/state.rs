use std::path::Path;
use std::sync::Arc;

use crate::color::RegionColors;
use crate::data::aggregate::RegionOrder;
use crate::data::export;
use crate::data::filter::Selection;
use crate::data::model::{ChartCategory, Dataset};
use crate::data::store::DatasetStore;
use crate::data::views::{compute_views, DashboardView};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Session-local UI state, independent of rendering.
///
/// Shares the dataset read-only with the store; selection and derived views
/// belong to this session alone.
pub struct AppState {
    /// Loaded dataset, or why it could not be loaded (a `DataUnavailable`
    /// with its cause chain).
    pub dataset: anyhow::Result<Arc<Dataset>>,

    /// Current region set and chart category.
    pub selection: Selection,

    /// Ordering of the average-by-region chart.
    pub region_order: RegionOrder,

    /// Derived views for the current selection (recomputed on every change).
    pub view: DashboardView,

    /// One colour per region, fixed for the session.
    pub region_colors: RegionColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Open a session on the shared store.
    pub fn new(store: &DatasetStore, default_regions: usize) -> Self {
        let dataset = store.load().map_err(anyhow::Error::from);
        let (selection, region_colors) = match &dataset {
            Ok(ds) => {
                if ds.is_empty() {
                    log::warn!("{} contains no usable rows", store.path().display());
                }
                (
                    Selection::with_default_regions(ds, default_regions),
                    RegionColors::new(&ds.regions),
                )
            }
            Err(e) => {
                log::error!("{e:#}");
                (Selection::default(), RegionColors::default())
            }
        };

        let mut state = Self {
            dataset,
            selection,
            region_order: RegionOrder::default(),
            view: DashboardView::NoSelection,
            region_colors,
            status_message: None,
        };
        state.refresh();
        state
    }

    /// Recompute every derived view from the dataset and selection.
    pub fn refresh(&mut self) {
        self.view = match &self.dataset {
            Ok(ds) => compute_views(ds, &self.selection, self.region_order),
            Err(_) => DashboardView::NoSelection,
        };
    }

    pub fn toggle_region(&mut self, region: &str) {
        self.selection.toggle_region(region);
        self.refresh();
    }

    pub fn select_all(&mut self) {
        if let Ok(ds) = &self.dataset {
            self.selection.select_all(ds);
            self.refresh();
        }
    }

    pub fn select_none(&mut self) {
        self.selection.select_none();
        self.refresh();
    }

    pub fn set_category(&mut self, category: ChartCategory) {
        if self.selection.category != category {
            self.selection.category = category;
            self.refresh();
        }
    }

    pub fn set_region_order(&mut self, order: RegionOrder) {
        if self.region_order != order {
            self.region_order = order;
            self.refresh();
        }
    }

    /// Write the full dataset to `path`, reporting the outcome in the status line.
    pub fn export_to(&mut self, path: &Path) {
        let Ok(ds) = &self.dataset else {
            return;
        };
        match export::save_export(ds, path) {
            Ok(()) => {
                self.status_message = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to export data: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
