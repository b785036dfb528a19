use std::sync::Arc;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::aggregate::Summary;
use crate::data::filter::{FilterState, Stage, cascade, domain_of, head};
use crate::data::loader::DataSource;
use crate::data::model::{CellValue, Column, Record, Table};
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded table (None until loaded, or if loading failed).
    pub table: Option<Arc<Table>>,

    /// Current selection; every field is a member of its stage's domain.
    pub filters: FilterState,

    /// Cascading selectors with their offered options (cached).
    pub stages: Vec<Stage>,

    /// First rows of the full table.
    pub table_preview: Vec<Record>,

    /// First rows of the filtered subset (cached).
    pub filtered_preview: Vec<Record>,

    /// Aggregates of the filtered subset (cached).
    pub summary: Summary,

    /// Bar colours of the visit-mode chart.
    pub visit_mode_colors: Option<ColorMap>,

    /// Fatal load error shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let summary = Summary::compute(&[], &config);
        Self {
            config,
            table: None,
            filters: FilterState::default(),
            stages: Vec::new(),
            table_preview: Vec::new(),
            filtered_preview: Vec::new(),
            summary,
            visit_mode_colors: None,
            status_message: None,
        }
    }

    /// Load from `source`; a failure is kept as the status message.
    pub fn load(&mut self, source: &DataSource) {
        match source.load() {
            Ok(table) => self.set_table(table),
            Err(e) => self.fail(e),
        }
    }

    /// Ingest the loaded table and run the first cascade.
    pub fn set_table(&mut self, table: Arc<Table>) {
        let rows = table.rows();
        self.table_preview = head(&rows, self.config.preview_rows)
            .iter()
            .map(|r| (*r).clone())
            .collect();
        self.visit_mode_colors = Some(ColorMap::new(&domain_of(&rows, Column::VisitMode)));

        self.table = Some(table);
        self.filters = FilterState::default();
        self.status_message = None;
        self.refilter();
    }

    pub fn fail(&mut self, error: DashboardError) {
        self.table = None;
        self.status_message = Some(format!("Error: {error}"));
    }

    /// Recompute stages, previews and aggregates after a selection change.
    pub fn refilter(&mut self) {
        let Some(table) = self.table.clone() else {
            return;
        };

        let result = cascade(&table, &self.filters);
        if let Some(column) = result.empty_stage() {
            log::warn!("No values available for {}", column.label());
        }
        self.filters = result.resolved();
        self.summary = Summary::compute(&result.filtered, &self.config);
        self.filtered_preview = head(&result.filtered, self.config.preview_rows)
            .iter()
            .map(|r| (*r).clone())
            .collect();
        log::debug!(
            "Selection {:?} matches {} rows",
            self.filters,
            result.filtered.len()
        );
        self.stages = result.stages;
    }

    /// Choose a value for one selector; later selectors are re-validated.
    pub fn select(&mut self, column: Column, value: CellValue) {
        self.filters.set(column, Some(value));
        self.refilter();
    }

    pub fn matching_rows(&self) -> usize {
        self.summary.total_visits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: i64, month: i64, city: &str, atype: &str, id: &str, rating: f64) -> Record {
        Record {
            visit_year: year,
            visit_month: month,
            city_id: CellValue::from(city),
            attraction_type: atype.to_string(),
            attraction_id: CellValue::from(id),
            rating,
            visit_mode: "Family".to_string(),
        }
    }

    fn loaded_state() -> AppState {
        let table = Table::from_records(vec![
            record(2022, 3, "C1", "Beach", "A1", 4.0),
            record(2023, 1, "C1", "Beach", "A1", 4.0),
            record(2023, 1, "C1", "Beach", "A2", 5.0),
            record(2023, 1, "C2", "Museum", "A3", 3.0),
            record(2023, 5, "C2", "Museum", "A3", 2.0),
        ]);
        let mut state = AppState::new(DashboardConfig::default());
        state.set_table(Arc::new(table));
        state
    }

    #[test]
    fn first_options_are_selected_on_load() {
        let state = loaded_state();
        assert_eq!(state.filters, FilterState::new(2022, 3, "C1", "Beach"));
        assert_eq!(state.stages.len(), 4);
        assert_eq!(state.matching_rows(), 1);
        assert_eq!(state.table_preview.len(), 5);
    }

    #[test]
    fn changing_year_revalidates_later_selectors() {
        let mut state = loaded_state();
        state.select(Column::VisitYear, CellValue::from(2023));

        assert_eq!(state.filters, FilterState::new(2023, 1, "C1", "Beach"));
        assert_eq!(state.summary.total_visits, 2);
        assert_eq!(state.summary.average_rating, Some(4.5));

        state.select(Column::CityId, CellValue::from("C2"));
        assert_eq!(state.filters.attraction_type, Some(CellValue::from("Museum")));
        assert_eq!(state.filtered_preview.len(), 1);
    }

    #[test]
    fn failed_load_sets_status_message() {
        let dir = tempfile::tempdir().unwrap();
        let source = DataSource::new(dir.path().join("final_dataset.csv"));
        let mut state = AppState::new(DashboardConfig::default());
        state.load(&source);

        assert!(state.table.is_none());
        let message = state.status_message.unwrap();
        assert!(message.starts_with("Error: dataset unavailable at"));
    }
}
