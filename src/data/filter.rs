use std::collections::BTreeSet;

use super::model::{CellValue, Column, Record, Table};
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Single-step operations
// ---------------------------------------------------------------------------

/// Sorted distinct values of `column` in `subset`. Empty for an empty subset.
///
/// `Rating` has no discrete domain and always yields an empty set.
pub fn domain_of(subset: &[&Record], column: Column) -> BTreeSet<CellValue> {
    subset.iter().filter_map(|r| r.value(column)).collect()
}

/// Rows of `subset` whose `column` equals `value`, in their original order.
pub fn narrow<'a>(subset: &[&'a Record], column: Column, value: &CellValue) -> Vec<&'a Record> {
    subset
        .iter()
        .copied()
        .filter(|r| r.matches(column, value))
        .collect()
}

/// The first `n` rows of a subset.
pub fn head<'a, 'b>(subset: &'b [&'a Record], n: usize) -> &'b [&'a Record] {
    &subset[..n.min(subset.len())]
}

// ---------------------------------------------------------------------------
// FilterState – one selection per cascading selector
// ---------------------------------------------------------------------------

/// Selections for the four cascading selectors, in [`Column::CASCADE`] order.
/// `None` means "nothing chosen yet"; the cascade picks the first option.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub year: Option<CellValue>,
    pub month: Option<CellValue>,
    pub city: Option<CellValue>,
    pub attraction_type: Option<CellValue>,
}

impl FilterState {
    pub fn new(
        year: impl Into<CellValue>,
        month: impl Into<CellValue>,
        city: impl Into<CellValue>,
        attraction_type: impl Into<CellValue>,
    ) -> Self {
        Self {
            year: Some(year.into()),
            month: Some(month.into()),
            city: Some(city.into()),
            attraction_type: Some(attraction_type.into()),
        }
    }

    pub fn get(&self, column: Column) -> Option<&CellValue> {
        match column {
            Column::VisitYear => self.year.as_ref(),
            Column::VisitMonth => self.month.as_ref(),
            Column::CityId => self.city.as_ref(),
            Column::AttractionType => self.attraction_type.as_ref(),
            _ => None,
        }
    }

    /// Set one selector. Columns outside the cascade are ignored.
    pub fn set(&mut self, column: Column, value: Option<CellValue>) {
        match column {
            Column::VisitYear => self.year = value,
            Column::VisitMonth => self.month = value,
            Column::CityId => self.city = value,
            Column::AttractionType => self.attraction_type = value,
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Cascade – the left fold of domain_of + narrow
// ---------------------------------------------------------------------------

/// One selector after the cascade resolved it.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub column: Column,
    /// Options offered, computed from the previous stage's subset.
    pub domain: BTreeSet<CellValue>,
    /// Always a member of `domain`; `None` only when `domain` is empty.
    pub selected: Option<CellValue>,
    /// Rows left after this stage narrowed.
    pub remaining: usize,
}

impl Stage {
    pub fn selection(&self) -> Result<&CellValue, DashboardError> {
        self.selected
            .as_ref()
            .ok_or(DashboardError::EmptyDomain { column: self.column })
    }
}

/// Result of running every selector against the table.
#[derive(Debug, Clone)]
pub struct Cascade<'a> {
    pub stages: Vec<Stage>,
    pub filtered: Vec<&'a Record>,
}

impl Cascade<'_> {
    /// The selection actually in effect, every field drawn from its own domain.
    pub fn resolved(&self) -> FilterState {
        let mut state = FilterState::default();
        for stage in &self.stages {
            state.set(stage.column, stage.selected.clone());
        }
        state
    }

    /// The first stage whose domain came up empty.
    pub fn empty_stage(&self) -> Option<Column> {
        self.stages
            .iter()
            .find(|s| s.selected.is_none())
            .map(|s| s.column)
    }
}

/// Narrow `table` by each selector in turn.
///
/// Every stage offers the domain of the subset left by the stages before it.
/// A requested value outside that domain is replaced by the domain's first
/// member, so a selection can never contradict an earlier one. An empty
/// domain leaves the stage unselected and empties every later stage.
pub fn cascade<'a>(table: &'a Table, requested: &FilterState) -> Cascade<'a> {
    let mut subset = table.rows();
    let mut stages = Vec::with_capacity(Column::CASCADE.len());

    for column in Column::CASCADE {
        let domain = domain_of(&subset, column);
        let selected = match requested.get(column) {
            Some(value) if domain.contains(value) => Some(value.clone()),
            _ => domain.first().cloned(),
        };

        subset = match &selected {
            Some(value) => narrow(&subset, column, value),
            None => Vec::new(),
        };

        stages.push(Stage {
            column,
            domain,
            selected,
            remaining: subset.len(),
        });
    }

    Cascade {
        stages,
        filtered: subset,
    }
}
