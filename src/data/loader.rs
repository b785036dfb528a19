use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{CellValue, Column, Record, Table};
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// DataSource – load once, reuse for the session
// ---------------------------------------------------------------------------

/// Explicit handle to the dataset file.
///
/// The first successful [`DataSource::load`] reads and parses the file; every
/// later call hands back the same `Arc<Table>` without touching the disk.
/// Failures are not cached.
#[derive(Debug)]
pub struct DataSource {
    path: PathBuf,
    table: OnceCell<Arc<Table>>,
}

impl DataSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: OnceCell::new(),
        }
    }

    /// Whether the table has already been read.
    #[cfg(test)]
    pub fn is_loaded(&self) -> bool {
        self.table.get().is_some()
    }

    pub fn load(&self) -> Result<Arc<Table>, DashboardError> {
        if let Some(table) = self.table.get() {
            log::debug!("Reusing cached table from {}", self.path.display());
            return Ok(Arc::clone(table));
        }

        let table = load_file(&self.path).map_err(|e| {
            log::error!("Failed to load {}: {e:#}", self.path.display());
            DashboardError::DataUnavailable {
                path: self.path.clone(),
                reason: format!("{e:#}"),
            }
        })?;
        log::info!("Loaded {} rows from {}", table.len(), self.path.display());

        let table = Arc::new(table);
        let _ = self.table.set(Arc::clone(&table));
        Ok(table)
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the tourism table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row naming every [`Column`]
/// * `.json`    – `[{ "VisitYear": 2023, "VisitMonth": 1, ... }, ...]`
/// * `.parquet` – flat scalar columns with the same names
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Column positions resolved from a header row.
struct ColumnIndex([usize; 7]);

impl ColumnIndex {
    fn resolve<'h>(headers: impl Iterator<Item = &'h str> + Clone) -> Result<Self> {
        let mut positions = [0usize; 7];
        for (slot, column) in positions.iter_mut().zip(Column::ALL) {
            *slot = headers
                .clone()
                .position(|h| h.trim() == column.header())
                .with_context(|| format!("missing '{column}' column"))?;
        }
        Ok(ColumnIndex(positions))
    }

    fn of(&self, column: Column) -> usize {
        // `Column::ALL` lists the variants in declaration order.
        self.0[column as usize]
    }
}

fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let index = ColumnIndex::resolve(headers.iter().map(String::as_str)).context("CSV header")?;

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = |column: Column| row.get(index.of(column)).unwrap_or("").trim();

        records.push(Record {
            visit_year: parse_integer(cell(Column::VisitYear), row_no, Column::VisitYear)?,
            visit_month: parse_integer(cell(Column::VisitMonth), row_no, Column::VisitMonth)?,
            city_id: CellValue::guess(cell(Column::CityId)),
            attraction_type: cell(Column::AttractionType).to_string(),
            attraction_id: CellValue::guess(cell(Column::AttractionId)),
            rating: parse_float(cell(Column::Rating), row_no, Column::Rating)?,
            visit_mode: cell(Column::VisitMode).to_string(),
        });
    }

    Ok(Table::from_records(records))
}

fn parse_integer(s: &str, row: usize, column: Column) -> Result<i64> {
    s.parse::<i64>()
        .with_context(|| format!("Row {row}, {column}: '{s}' is not an integer"))
}

fn parse_float(s: &str, row: usize, column: Column) -> Result<f64> {
    let value = s
        .parse::<f64>()
        .with_context(|| format!("Row {row}, {column}: '{s}' is not a number"))?;
    if !value.is_finite() {
        bail!("Row {row}, {column}: '{s}' is not a finite number");
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records orientation, as written by `df.to_json(orient='records')`.
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let records: Vec<Record> = serde_json::from_str(&text).context("parsing JSON records")?;
    Ok(Table::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one scalar column per [`Column`].
///
/// Integer columns may be Int32 or Int64, `Rating` any float or integer type,
/// and categorical columns Utf8 / LargeUtf8 (identifiers may also be integers).
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let index = ColumnIndex::resolve(schema.fields().iter().map(|f| f.name().as_str()))
            .context("Parquet schema")?;
        let col = |column: Column| batch.column(index.of(column));

        for row in 0..batch.num_rows() {
            let at = |column: Column| format!("Row {row}, {column}");
            records.push(Record {
                visit_year: extract_integer(col(Column::VisitYear), row)
                    .with_context(|| at(Column::VisitYear))?,
                visit_month: extract_integer(col(Column::VisitMonth), row)
                    .with_context(|| at(Column::VisitMonth))?,
                city_id: extract_cell(col(Column::CityId), row)
                    .with_context(|| at(Column::CityId))?,
                attraction_type: extract_text(col(Column::AttractionType), row)
                    .with_context(|| at(Column::AttractionType))?,
                attraction_id: extract_cell(col(Column::AttractionId), row)
                    .with_context(|| at(Column::AttractionId))?,
                rating: extract_float(col(Column::Rating), row)
                    .with_context(|| at(Column::Rating))?,
                visit_mode: extract_text(col(Column::VisitMode), row)
                    .with_context(|| at(Column::VisitMode))?,
            });
        }
    }

    Ok(Table::from_records(records))
}

// -- Parquet / Arrow helpers --

fn extract_integer(col: &Arc<dyn Array>, row: usize) -> Result<i64> {
    if col.is_null(row) {
        bail!("null value");
    }
    match col.data_type() {
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            Ok(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            Ok(arr.value(row))
        }
        other => bail!("expected an integer column, got {other:?}"),
    }
}

fn extract_float(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value");
    }
    let value = match col.data_type() {
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            arr.value(row) as f64
        }
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            arr.value(row)
        }
        DataType::Int32 | DataType::Int64 => return extract_integer(col, row).map(|i| i as f64),
        other => bail!("expected a numeric column, got {other:?}"),
    };
    if !value.is_finite() {
        bail!("'{value}' is not a finite number");
    }
    Ok(value)
}

/// Categorical text, trimmed like a CSV cell.
fn extract_text(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value");
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(arr.value(row).trim().to_string())
        }
        DataType::LargeUtf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<LargeStringArray>()
                .context("expected LargeStringArray")?;
            Ok(arr.value(row).trim().to_string())
        }
        DataType::Int32 | DataType::Int64 => extract_integer(col, row).map(|i| i.to_string()),
        other => bail!("expected a text or integer column, got {other:?}"),
    }
}

/// Identifier cell; text goes through the same guess as CSV.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    match col.data_type() {
        DataType::Int32 | DataType::Int64 => extract_integer(col, row).map(CellValue::Integer),
        _ => extract_text(col, row).map(|s| CellValue::guess(&s)),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const HEADER: &str = "VisitYear,VisitMonth,CityId,AttractionType,AttractionId,Rating,VisitMode";

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn csv_rows_are_parsed_and_typed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "visits.csv",
            &format!("{HEADER}\n2023,1,C1,Beach,A1,4.0,Family\n2022,12,7,Museum,640,3,Solo\n"),
        );

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        let first = &table.records()[0];
        assert_eq!(first.visit_year, 2023);
        assert_eq!(first.city_id, CellValue::from("C1"));
        assert_eq!(first.rating, 4.0);
        let second = &table.records()[1];
        assert_eq!(second.city_id, CellValue::from(7));
        assert_eq!(second.attraction_id, CellValue::from(640));
        assert_eq!(second.visit_mode, "Solo");
    }

    #[test]
    fn csv_columns_are_found_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "reordered.csv",
            "UserId,Rating,VisitMode,AttractionId,AttractionType,CityId,VisitMonth,VisitYear\n\
             u1,5,Couples,A9,Park,C2,6,2021\n",
        );

        let table = load_file(&path).unwrap();
        let record = &table.records()[0];
        assert_eq!(record.visit_year, 2021);
        assert_eq!(record.visit_month, 6);
        assert_eq!(record.attraction_type, "Park");
        assert_eq!(record.rating, 5.0);
    }

    #[test]
    fn csv_missing_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "partial.csv",
            "VisitYear,VisitMonth,CityId,AttractionType,AttractionId,Rating\n2023,1,C1,Beach,A1,4\n",
        );

        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("missing 'VisitMode' column"));
    }

    #[test]
    fn csv_bad_cell_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "bad.csv", &format!("{HEADER}\n2023,1,C1,Beach,A1,great,Family\n"));

        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Row 0, Rating: 'great' is not a number"));
    }

    #[test]
    fn json_records_are_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "visits.json",
            r#"[
                {"VisitYear": 2023, "VisitMonth": 1, "CityId": "C1", "AttractionType": "Beach",
                 "AttractionId": 17, "Rating": 4, "VisitMode": "Family", "Extra": true}
            ]"#,
        );

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 1);
        let record = &table.records()[0];
        assert_eq!(record.attraction_id, CellValue::from(17));
        assert_eq!(record.rating, 4.0);
    }

    #[test]
    fn parquet_columns_are_parsed() {
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("VisitYear", DataType::Int32, false),
            Field::new("VisitMonth", DataType::Int64, false),
            Field::new("CityId", DataType::Int64, false),
            Field::new("AttractionType", DataType::Utf8, false),
            Field::new("AttractionId", DataType::Utf8, false),
            Field::new("Rating", DataType::Int64, false),
            Field::new("VisitMode", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int32Array::from(vec![2023, 2022])),
                Arc::new(Int64Array::from(vec![1, 8])),
                Arc::new(Int64Array::from(vec![3, 11])),
                Arc::new(StringArray::from(vec!["Beach", "Museum"])),
                Arc::new(StringArray::from(vec!["A1", "A2"])),
                Arc::new(Int64Array::from(vec![4, 2])),
                Arc::new(StringArray::from(vec!["Family", "Solo"])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("visits.parquet");
        let mut writer = ArrowWriter::try_new(fs::File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        let second = &table.records()[1];
        assert_eq!(second.visit_year, 2022);
        assert_eq!(second.city_id, CellValue::from(11));
        assert_eq!(second.attraction_id, CellValue::from("A2"));
        assert_eq!(second.rating, 2.0);
        assert_eq!(second.visit_mode, "Solo");
    }

    #[test]
    fn parquet_non_finite_rating_is_rejected() {
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("VisitYear", DataType::Int64, false),
            Field::new("VisitMonth", DataType::Int64, false),
            Field::new("CityId", DataType::Utf8, false),
            Field::new("AttractionType", DataType::Utf8, false),
            Field::new("AttractionId", DataType::Utf8, false),
            Field::new("Rating", DataType::Float64, false),
            Field::new("VisitMode", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![2023, 2023])),
                Arc::new(Int64Array::from(vec![1, 1])),
                Arc::new(StringArray::from(vec![" 7", "7"])),
                Arc::new(StringArray::from(vec!["Beach", "Beach"])),
                Arc::new(StringArray::from(vec!["A1", "A2"])),
                Arc::new(Float64Array::from(vec![f64::NAN, 4.0])),
                Arc::new(StringArray::from(vec!["Family", "Solo"])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nan.parquet");
        let mut writer = ArrowWriter::try_new(fs::File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let err = load_file(&path).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("Row 0, Rating"), "{message}");
        assert!(message.contains("is not a finite number"), "{message}");
    }

    #[test]
    fn json_and_csv_type_cells_alike() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = write(
            &dir,
            "visits.csv",
            &format!("{HEADER}\n2023,1,7,Beach,A1,4.0,Family\n2023,1,10, Park ,640,5,Solo\n"),
        );
        let json_path = write(
            &dir,
            "visits.json",
            r#"[
                {"VisitYear": 2023.0, "VisitMonth": 1, "CityId": "7", "AttractionType": "Beach",
                 "AttractionId": "A1", "Rating": 4.0, "VisitMode": "Family"},
                {"VisitYear": 2023, "VisitMonth": 1.0, "CityId": 10, "AttractionType": " Park ",
                 "AttractionId": " 640 ", "Rating": 5, "VisitMode": "Solo"}
            ]"#,
        );

        let from_csv = load_file(&csv_path).unwrap();
        let from_json = load_file(&json_path).unwrap();
        assert_eq!(from_csv.records(), from_json.records());
        assert_eq!(from_json.records()[0].city_id, CellValue::from(7));
        assert_eq!(from_json.records()[1].attraction_id, CellValue::from(640));
        assert_eq!(from_json.records()[1].attraction_type, "Park");
    }

    #[test]
    fn json_fractional_year_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "visits.json",
            r#"[{"VisitYear": 2023.5, "VisitMonth": 1, "CityId": "C1", "AttractionType": "Beach",
                 "AttractionId": "A1", "Rating": 4, "VisitMode": "Family"}]"#,
        );

        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("'2023.5' is not an integer"));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "visits.xlsx", "");
        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension: .xlsx"));
    }

    #[test]
    fn data_source_reuses_the_loaded_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "visits.csv", &format!("{HEADER}\n2023,1,C1,Beach,A1,4.0,Family\n"));
        let source = DataSource::new(&path);
        assert!(!source.is_loaded());

        let first = source.load().unwrap();
        fs::remove_file(&path).unwrap();
        let second = source.load().unwrap();

        assert!(source.is_loaded());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn data_source_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = DataSource::new(dir.path().join("absent.csv"));

        match source.load() {
            Err(DashboardError::DataUnavailable { path, reason }) => {
                assert_eq!(path, dir.path().join("absent.csv"));
                assert!(reason.contains("opening CSV"));
            }
            other => panic!("expected DataUnavailable, got {other:?}"),
        }
        assert!(!source.is_loaded());
    }
}
