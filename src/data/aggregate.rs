use std::collections::{BTreeSet, HashMap};

use super::model::{CellValue, Record};
use crate::config::DashboardConfig;
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

pub fn total_visits(subset: &[&Record]) -> usize {
    subset.len()
}

/// Mean rating rounded to two decimals.
pub fn average_rating(subset: &[&Record]) -> Result<f64, DashboardError> {
    if subset.is_empty() {
        return Err(DashboardError::UndefinedAggregate {
            aggregate: "Average Rating",
        });
    }
    let sum: f64 = subset.iter().map(|r| r.rating).sum();
    Ok(round2(sum / subset.len() as f64))
}

pub fn unique_attractions(subset: &[&Record]) -> usize {
    subset
        .iter()
        .map(|r| &r.attraction_id)
        .collect::<BTreeSet<_>>()
        .len()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Grouping helpers
// ---------------------------------------------------------------------------

/// Count occurrences of each key, keeping keys in order of first appearance.
fn counts_in_order<'a, K, F>(subset: &[&'a Record], key: F) -> Vec<(K, usize)>
where
    K: Eq + std::hash::Hash + Clone,
    F: Fn(&'a Record) -> K,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();
    for &record in subset {
        let k = key(record);
        match slots.get(&k) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(k.clone(), counts.len());
                counts.push((k, 1));
            }
        }
    }
    counts
}

/// Most frequent key; ties go to the key seen first.
fn mode_by<'a, K, F>(subset: &[&'a Record], key: F) -> Option<K>
where
    K: Eq + std::hash::Hash + Clone,
    F: Fn(&'a Record) -> K,
{
    let mut best: Option<(K, usize)> = None;
    for (k, n) in counts_in_order(subset, key) {
        match &best {
            Some((_, top)) if n <= *top => {}
            _ => best = Some((k, n)),
        }
    }
    best.map(|(k, _)| k)
}

// ---------------------------------------------------------------------------
// Rankings and distributions
// ---------------------------------------------------------------------------

/// One row of the "Top Recommendations" table.
#[derive(Debug, Clone, PartialEq)]
pub struct RatedAttraction {
    pub attraction_id: CellValue,
    pub mean_rating: f64,
}

/// Attractions by mean rating, best first, at most `k` of them.
///
/// Equal means keep the order in which the attractions first appear.
pub fn top_rated(subset: &[&Record], k: usize) -> Vec<RatedAttraction> {
    let mut sums: HashMap<&CellValue, (f64, usize)> = HashMap::new();
    let mut order: Vec<&CellValue> = Vec::new();
    for &record in subset {
        let entry = sums.entry(&record.attraction_id).or_insert_with(|| {
            order.push(&record.attraction_id);
            (0.0, 0)
        });
        entry.0 += record.rating;
        entry.1 += 1;
    }

    let mut ranked: Vec<RatedAttraction> = order
        .into_iter()
        .map(|id| {
            let (sum, n) = sums[id];
            RatedAttraction {
                attraction_id: id.clone(),
                mean_rating: sum / n as f64,
            }
        })
        .collect();
    // `sort_by` is stable.
    ranked.sort_by(|a, b| b.mean_rating.total_cmp(&a.mean_rating));
    ranked.truncate(k);
    ranked
}

pub fn mode_visit_mode(subset: &[&Record]) -> Result<String, DashboardError> {
    mode_by(subset, |r| r.visit_mode.as_str())
        .map(str::to_string)
        .ok_or(DashboardError::UndefinedAggregate {
            aggregate: "Most Common Visit Mode",
        })
}

pub fn mode_attraction_type(subset: &[&Record]) -> Result<String, DashboardError> {
    mode_by(subset, |r| r.attraction_type.as_str())
        .map(str::to_string)
        .ok_or(DashboardError::UndefinedAggregate {
            aggregate: "Most Popular Attraction Type",
        })
}

/// Frequency of each visit mode, most frequent first (ties by first appearance).
pub fn visit_mode_histogram(subset: &[&Record]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> =
        counts_in_order(subset, |r| r.visit_mode.as_str())
            .into_iter()
            .map(|(mode, n)| (mode.to_string(), n))
            .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// One equal-width rating interval and the number of ratings inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Split `[min, max]` of the subset's ratings into `bins` equal intervals.
///
/// Intervals are half-open except the last, which includes `max`. A single
/// distinct rating `r` widens the range to `[r - 0.5, r + 0.5]`; an empty
/// subset yields zero-count bins over `[0, 1]`.
pub fn rating_histogram(subset: &[&Record], bins: usize) -> Vec<HistogramBin> {
    if bins == 0 {
        return Vec::new();
    }

    let (mut lo, mut hi) = subset
        .iter()
        .map(|r| r.rating)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if subset.is_empty() {
        (lo, hi) = (0.0, 1.0);
    } else if lo == hi {
        (lo, hi) = (lo - 0.5, hi + 0.5);
    }

    let width = (hi - lo) / bins as f64;
    let mut histogram: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for record in subset {
        let slot = (((record.rating - lo) / width) as usize).min(bins - 1);
        histogram[slot].count += 1;
    }
    histogram
}

// ---------------------------------------------------------------------------
// Summary – everything the dashboard shows for one selection
// ---------------------------------------------------------------------------

/// The three textual insights.
#[derive(Debug, Clone, PartialEq)]
pub struct Insights {
    pub most_common_visit_mode: String,
    pub most_popular_attraction_type: String,
    pub highest_rated_attraction: CellValue,
}

impl Insights {
    pub fn compute(subset: &[&Record], top: &[RatedAttraction]) -> Result<Self, DashboardError> {
        let highest = top.first().ok_or(DashboardError::UndefinedAggregate {
            aggregate: "Highest Rated Attraction",
        })?;
        Ok(Self {
            most_common_visit_mode: mode_visit_mode(subset)?,
            most_popular_attraction_type: mode_attraction_type(subset)?,
            highest_rated_attraction: highest.attraction_id.clone(),
        })
    }
}

/// Owned aggregates of a filtered subset.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_visits: usize,
    /// `None` when not available.
    pub average_rating: Option<f64>,
    pub unique_attractions: usize,
    pub top_rated: Vec<RatedAttraction>,
    pub visit_modes: Vec<(String, usize)>,
    pub ratings: Vec<HistogramBin>,
    /// `None` when the subset is empty.
    pub insights: Option<Insights>,
}

impl Summary {
    pub fn compute(subset: &[&Record], config: &DashboardConfig) -> Self {
        let top_rated = top_rated(subset, config.top_k);
        Self {
            total_visits: total_visits(subset),
            average_rating: average_rating(subset).ok(),
            unique_attractions: unique_attractions(subset),
            visit_modes: visit_mode_histogram(subset),
            ratings: rating_histogram(subset, config.histogram_bins),
            insights: Insights::compute(subset, &top_rated).ok(),
            top_rated,
        }
    }
}
