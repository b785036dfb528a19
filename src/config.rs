use std::path::PathBuf;

/// Fixed location of the tourism dataset, relative to the working directory.
pub const DEFAULT_DATASET_PATH: &str = "final_dataset.csv";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Static settings for one dashboard session.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Source file, loaded once.
    pub dataset_path: PathBuf,
    /// Rows shown in each preview table.
    pub preview_rows: usize,
    /// Length of the "Top Recommendations" ranking.
    pub top_k: usize,
    /// Bin count of the rating histogram.
    pub histogram_bins: usize,
    pub window_title: String,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            preview_rows: 10,
            top_k: 5,
            histogram_bins: 5,
            window_title: "Tourism Analytics Dashboard".to_string(),
            window_size: [1280.0, 860.0],
            min_window_size: [640.0, 420.0],
        }
    }
}
