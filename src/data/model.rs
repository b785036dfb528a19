use std::fmt;

use serde::{Deserialize, Deserializer, de};

// ---------------------------------------------------------------------------
// CellValue – a single selectable / groupable cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value for identifier and categorical columns.
///
/// Integers order numerically and sort before text, so numeric ids such as
/// `CityId` come out as `1, 2, 10` rather than `1, 10, 2`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CellValue {
    Integer(i64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

#[cfg(test)]
impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Integer(value as i64)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl CellValue {
    /// Guess the type of a raw text cell: integer if it parses, text otherwise.
    pub fn guess(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(i) => CellValue::Integer(i),
            Err(_) => CellValue::Text(trimmed.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Column – the fixed record schema
// ---------------------------------------------------------------------------

/// Every column of the tourism dataset, by header name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    VisitYear,
    VisitMonth,
    CityId,
    AttractionType,
    AttractionId,
    Rating,
    VisitMode,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::VisitYear,
        Column::VisitMonth,
        Column::CityId,
        Column::AttractionType,
        Column::AttractionId,
        Column::Rating,
        Column::VisitMode,
    ];

    /// The selector order of the cascading filters.
    pub const CASCADE: [Column; 4] = [
        Column::VisitYear,
        Column::VisitMonth,
        Column::CityId,
        Column::AttractionType,
    ];

    /// Header name as it appears in the input file.
    pub fn header(self) -> &'static str {
        match self {
            Column::VisitYear => "VisitYear",
            Column::VisitMonth => "VisitMonth",
            Column::CityId => "CityId",
            Column::AttractionType => "AttractionType",
            Column::AttractionId => "AttractionId",
            Column::Rating => "Rating",
            Column::VisitMode => "VisitMode",
        }
    }

    /// Human-readable selector label.
    pub fn label(self) -> &'static str {
        match self {
            Column::VisitYear => "Visit Year",
            Column::VisitMonth => "Visit Month",
            Column::CityId => "City",
            Column::AttractionType => "Attraction Type",
            Column::AttractionId => "Attraction",
            Column::Rating => "Rating",
            Column::VisitMode => "Visit Mode",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the dataset
// ---------------------------------------------------------------------------

/// A single visit (one row of the source table).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Record {
    #[serde(deserialize_with = "integer")]
    pub visit_year: i64,
    /// 1–12.
    #[serde(deserialize_with = "integer")]
    pub visit_month: i64,
    #[serde(deserialize_with = "cell")]
    pub city_id: CellValue,
    #[serde(deserialize_with = "text")]
    pub attraction_type: String,
    #[serde(deserialize_with = "cell")]
    pub attraction_id: CellValue,
    pub rating: f64,
    #[serde(deserialize_with = "text")]
    pub visit_mode: String,
}

// -- JSON cell typing, kept in line with the CSV loader --

/// Any scalar token a records-oriented JSON file may hold.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCell {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawCell {
    /// Integral floats such as pandas' `2023.0` count as integers.
    fn into_cell(self) -> CellValue {
        match self {
            RawCell::Integer(i) => CellValue::Integer(i),
            RawCell::Float(f) if f.is_finite() && f.fract() == 0.0 => CellValue::Integer(f as i64),
            RawCell::Float(f) => CellValue::Text(f.to_string()),
            RawCell::Text(s) => CellValue::guess(&s),
        }
    }
}

fn cell<'de, D: Deserializer<'de>>(deserializer: D) -> Result<CellValue, D::Error> {
    RawCell::deserialize(deserializer).map(RawCell::into_cell)
}

fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match cell(deserializer)? {
        CellValue::Integer(i) => Ok(i),
        CellValue::Text(s) => Err(de::Error::custom(format!("'{s}' is not an integer"))),
    }
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(String::deserialize(deserializer)?.trim().to_string())
}

impl Record {
    /// The value of a selectable / groupable column.
    ///
    /// `Rating` is continuous and has no `CellValue` form; it yields `None`.
    pub fn value(&self, column: Column) -> Option<CellValue> {
        match column {
            Column::VisitYear => Some(CellValue::Integer(self.visit_year)),
            Column::VisitMonth => Some(CellValue::Integer(self.visit_month)),
            Column::CityId => Some(self.city_id.clone()),
            Column::AttractionType => Some(CellValue::Text(self.attraction_type.clone())),
            Column::AttractionId => Some(self.attraction_id.clone()),
            Column::VisitMode => Some(CellValue::Text(self.visit_mode.clone())),
            Column::Rating => None,
        }
    }

    /// Whether `column` of this record equals `value`, without cloning.
    pub fn matches(&self, column: Column, value: &CellValue) -> bool {
        match (column, value) {
            (Column::VisitYear, CellValue::Integer(v)) => self.visit_year == *v,
            (Column::VisitMonth, CellValue::Integer(v)) => self.visit_month == *v,
            (Column::CityId, v) => self.city_id == *v,
            (Column::AttractionType, CellValue::Text(v)) => self.attraction_type == *v,
            (Column::AttractionId, v) => self.attraction_id == *v,
            (Column::VisitMode, CellValue::Text(v)) => self.visit_mode == *v,
            _ => false,
        }
    }

    /// Display text of any column, for preview tables.
    pub fn display(&self, column: Column) -> String {
        match column {
            Column::Rating => format!("{}", self.rating),
            other => self
                .value(other)
                .map(|v| v.to_string())
                .unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The immutable in-memory table. Never mutated after load.
#[derive(Debug, Clone, Default)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    pub fn from_records(records: Vec<Record>) -> Self {
        Table { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Every row, as the starting subset of a cascade.
    pub fn rows(&self) -> Vec<&Record> {
        self.records().iter().collect()
    }

    /// Number of rows.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guess_prefers_integers() {
        assert_eq!(CellValue::guess("42"), CellValue::Integer(42));
        assert_eq!(CellValue::guess(" 7 "), CellValue::Integer(7));
        assert_eq!(CellValue::guess("C1"), CellValue::Text("C1".into()));
        assert_eq!(CellValue::guess("4.5"), CellValue::Text("4.5".into()));
    }

    #[test]
    fn integers_sort_numerically_and_before_text() {
        let mut values = vec![
            CellValue::from("A"),
            CellValue::from(10),
            CellValue::from(2),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![CellValue::from(2), CellValue::from(10), CellValue::from("A")]
        );
    }

    #[test]
    fn matches_agrees_with_value() {
        let record = Record {
            visit_year: 2023,
            visit_month: 4,
            city_id: CellValue::from(12),
            attraction_type: "Beach".into(),
            attraction_id: CellValue::from("A1"),
            rating: 4.0,
            visit_mode: "Family".into(),
        };
        for column in Column::ALL {
            if let Some(value) = record.value(column) {
                assert!(record.matches(column, &value), "{column}");
            }
        }
        assert!(!record.matches(Column::VisitYear, &CellValue::from("2023")));
        assert!(!record.matches(Column::Rating, &CellValue::from(4)));
    }

    #[test]
    fn display_renders_rating_and_ids() {
        let record = Record {
            visit_year: 2022,
            visit_month: 12,
            city_id: CellValue::from("C9"),
            attraction_type: "Museum".into(),
            attraction_id: CellValue::from(640),
            rating: 3.5,
            visit_mode: "Solo".into(),
        };
        assert_eq!(record.display(Column::Rating), "3.5");
        assert_eq!(record.display(Column::CityId), "C9");
        assert_eq!(record.display(Column::AttractionId), "640");
    }
}
