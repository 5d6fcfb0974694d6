use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, AsArray, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Schema};
use chrono::NaiveDateTime;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::filter;
use super::model::{Selection, TripDataset, TripRecord};
use crate::config::Config;
use crate::error::BikeshareError;

pub const START_TIME: &str = "Start Time";
pub const START_STATION: &str = "Start Station";
pub const END_STATION: &str = "End Station";
pub const TRIP_DURATION: &str = "Trip Duration";
pub const USER_TYPE: &str = "User Type";
pub const GENDER: &str = "Gender";
pub const BIRTH_YEAR: &str = "Birth Year";

const REQUIRED_COLUMNS: [&str; 5] = [START_TIME, START_STATION, END_STATION, TRIP_DURATION, USER_TYPE];

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the selected city's trips and apply the month/day filters.
pub fn load_data(config: &Config, selection: &Selection) -> Result<TripDataset> {
    let path = config.path_for(selection.city);
    let dataset = load_file(&path)
        .with_context(|| format!("loading {} data from {}", selection.city, path.display()))?;
    Ok(filter::apply(&dataset, selection.month, selection.day))
}

/// Load a trip dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the bikeshare column names (default export)
/// * `.json`    – `[{ "Start Time": "...", "Trip Duration": 776, ... }, ...]`
/// * `.parquet` – same column names; `Start Time` as string or timestamp
pub fn load_file(path: &Path) -> Result<TripDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(BikeshareError::UnsupportedFormat(other.to_string()).into()),
    };

    log::info!(
        "Loaded {} trips from {} (gender: {}, birth year: {})",
        dataset.len(),
        path.display(),
        dataset.has_gender,
        dataset.has_birth_year
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Row decoding shared by the CSV and JSON loaders
// ---------------------------------------------------------------------------

/// One row as it appears in the source, before timestamp parsing.
#[derive(Debug, Deserialize)]
struct RawTrip {
    #[serde(rename = "Start Time")]
    start_time: String,
    #[serde(rename = "Start Station")]
    start_station: String,
    #[serde(rename = "End Station")]
    end_station: String,
    #[serde(rename = "Trip Duration")]
    trip_duration: f64,
    #[serde(rename = "User Type", default)]
    user_type: Option<String>,
    #[serde(rename = "Gender", default)]
    gender: Option<String>,
    #[serde(rename = "Birth Year", default)]
    birth_year: Option<f64>,
}

impl RawTrip {
    fn into_record(self, row: usize) -> Result<TripRecord, BikeshareError> {
        let start_time = parse_timestamp(&self.start_time).ok_or_else(|| {
            BikeshareError::InvalidTimestamp {
                row,
                value: self.start_time.clone(),
            }
        })?;
        Ok(TripRecord {
            row,
            start_time,
            start_station: self.start_station,
            end_station: self.end_station,
            trip_duration: self.trip_duration,
            user_type: non_blank(self.user_type),
            gender: non_blank(self.gender),
            birth_year: self.birth_year.filter(|y| y.is_finite()),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Parse `YYYY-MM-DD HH:MM:SS` with optional fractional seconds or `T` separator.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

fn require_columns(mut has: impl FnMut(&str) -> bool) -> Result<(), BikeshareError> {
    match REQUIRED_COLUMNS.into_iter().find(|&col| !has(col)) {
        Some(missing) => Err(BikeshareError::MissingColumn(missing)),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names; unknown columns (such as the
/// unnamed row id in the public exports) are ignored. Empty optional cells
/// become missing values.
fn load_csv(path: &Path) -> Result<TripDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();
    let has_column = |name: &str| headers.iter().any(|h| h == name);

    require_columns(has_column)?;
    let has_gender = has_column(GENDER);
    let has_birth_year = has_column(BIRTH_YEAR);

    let mut trips = Vec::new();
    for (row, result) in reader.deserialize::<RawTrip>().enumerate() {
        let raw = result.with_context(|| format!("CSV row {row}"))?;
        trips.push(raw.into_record(row)?);
    }

    Ok(TripDataset {
        trips,
        has_gender,
        has_birth_year,
    })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `to_json(orient='records')` layout.
/// An optional column counts as present when any record carries the key.
fn load_json(path: &Path) -> Result<TripDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let has_key = |name: &str| {
        records
            .iter()
            .any(|rec| rec.as_object().is_some_and(|obj| obj.contains_key(name)))
    };
    if !records.is_empty() {
        require_columns(has_key)?;
    }
    let has_gender = has_key(GENDER);
    let has_birth_year = has_key(BIRTH_YEAR);

    let mut trips = Vec::with_capacity(records.len());
    for (row, rec) in records.iter().enumerate() {
        let raw = RawTrip::deserialize(rec).with_context(|| format!("JSON record {row}"))?;
        trips.push(raw.into_record(row)?);
    }

    Ok(TripDataset {
        trips,
        has_gender,
        has_birth_year,
    })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the bikeshare column names.
///
/// `Start Time` may be stored as text or as a timestamp; `Trip Duration` and
/// `Birth Year` may be any numeric type. Everything is cast to the shape the
/// CSV loader produces.
fn load_parquet(path: &Path) -> Result<TripDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let schema: &Schema = builder.schema();
    let has_column = |name: &str| schema.index_of(name).is_ok();
    require_columns(has_column)?;
    let has_gender = has_column(GENDER);
    let has_birth_year = has_column(BIRTH_YEAR);

    let reader = builder.build().context("building parquet reader")?;

    let mut trips = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let column = |name: &str, to: &DataType| -> Result<ArrayRef> {
            let idx = batch.schema().index_of(name)?;
            cast(batch.column(idx).as_ref(), to).with_context(|| format!("casting column '{name}'"))
        };

        let start_time = column(START_TIME, &DataType::Utf8)?;
        let start_station = column(START_STATION, &DataType::Utf8)?;
        let end_station = column(END_STATION, &DataType::Utf8)?;
        let trip_duration = column(TRIP_DURATION, &DataType::Float64)?;
        let user_type = column(USER_TYPE, &DataType::Utf8)?;
        let gender = if has_gender {
            Some(column(GENDER, &DataType::Utf8)?)
        } else {
            None
        };
        let birth_year = if has_birth_year {
            Some(column(BIRTH_YEAR, &DataType::Float64)?)
        } else {
            None
        };

        let start_time = start_time.as_string::<i32>();
        let start_station = start_station.as_string::<i32>();
        let end_station = end_station.as_string::<i32>();
        let trip_duration = trip_duration.as_primitive::<Float64Type>();
        let user_type = user_type.as_string::<i32>();
        let gender = gender.as_ref().map(|g| g.as_string::<i32>());
        let birth_year = birth_year.as_ref().map(|b| b.as_primitive::<Float64Type>());

        for i in 0..batch.num_rows() {
            let row = trips.len();
            if start_time.is_null(i) {
                return Err(BikeshareError::InvalidValue { row, column: START_TIME }.into());
            }
            if trip_duration.is_null(i) {
                return Err(BikeshareError::InvalidValue { row, column: TRIP_DURATION }.into());
            }
            let text = |arr: &StringArray| {
                (!arr.is_null(i)).then(|| arr.value(i).to_string())
            };

            let raw = RawTrip {
                start_time: start_time.value(i).to_string(),
                start_station: text(start_station).unwrap_or_default(),
                end_station: text(end_station).unwrap_or_default(),
                trip_duration: trip_duration.value(i),
                user_type: text(user_type),
                gender: gender.and_then(text),
                birth_year: birth_year.and_then(|b| (!b.is_null(i)).then(|| b.value(i))),
            };
            trips.push(raw.into_record(row)?);
        }
    }

    Ok(TripDataset {
        trips,
        has_gender,
        has_birth_year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{DayFilter, MonthFilter};
    use crate::data::table::{trips_to_batch, TableLayout};
    use chrono::{Datelike, Timelike, Weekday};
    use parquet::arrow::ArrowWriter;
    use std::io::Write;

    const CHICAGO_CSV: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
1423854,2017-06-23 15:09:32,2017-06-23 15:14:53,321,Wood St & Hubbard St,Damen Ave & Chicago Ave,Subscriber,Male,1992.0
955915,2017-05-25 18:19:03,2017-05-25 18:45:53,1610,Theater on the Lake,Sheffield Ave & Waveland Ave,Subscriber,Female,1992.0
9031,2017-01-04 08:27:49,2017-01-04 08:34:45,416,May St & Taylor St,Wood St & Taylor St,Subscriber,Male,1981.0
304487,2017-03-06 13:49:38,2017-03-06 13:55:28,350,Christiana Ave & Lawrence Ave,St. Louis Ave & Balmoral Ave,Customer,,
";

    const WASHINGTON_CSV: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type
1621326,2017-06-21 08:36:34,2017-06-21 08:44:43,489.066,14th & Belmont St NW,15th & K St NW,Subscriber
482740,2017-03-11 10:40:00,2017-03-11 10:46:00,402.549,Yuma St & Tenley Circle NW,Connecticut Ave & Yuma St NW,Subscriber
";

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_with_demographics() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "chicago.csv", CHICAGO_CSV);
        let ds = load_file(&path).unwrap();

        assert_eq!(ds.len(), 4);
        assert!(ds.has_gender);
        assert!(ds.has_birth_year);

        let first = &ds.trips[0];
        assert_eq!(first.start_station, "Wood St & Hubbard St");
        assert_eq!(first.trip_duration, 321.0);
        assert_eq!(first.gender.as_deref(), Some("Male"));
        assert_eq!(first.birth_year, Some(1992.0));
        assert_eq!(first.month(), 6);
        assert_eq!(first.day_name(), "Friday");

        let last = &ds.trips[3];
        assert_eq!(last.row, 3);
        assert_eq!(last.gender, None);
        assert_eq!(last.birth_year, None);
    }

    #[test]
    fn csv_without_optional_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "washington.csv", WASHINGTON_CSV);
        let ds = load_file(&path).unwrap();

        assert_eq!(ds.len(), 2);
        assert!(!ds.has_gender);
        assert!(!ds.has_birth_year);
        assert!((ds.trips[0].trip_duration - 489.066).abs() < 1e-9);
    }

    #[test]
    fn padded_headers_are_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "padded.csv",
            "Start Time, Start Station ,End Station,Trip Duration,User Type\n2017-01-02 08:00:00,A,B,10,Customer\n",
        );
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.trips[0].start_station, "A");
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "broken.csv", "Start Time,Start Station\n2017-01-01 00:00:00,A\n");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BikeshareError>(),
            Some(BikeshareError::MissingColumn(END_STATION))
        ));
    }

    #[test]
    fn bad_timestamp_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "bad.csv",
            "Start Time,Start Station,End Station,Trip Duration,User Type\nyesterday,A,B,10,Customer\n",
        );
        let err = load_file(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BikeshareError>(),
            Some(BikeshareError::InvalidTimestamp { row: 0, .. })
        ));
    }

    #[test]
    fn unsupported_extension() {
        let err = load_file(Path::new("trips.xlsx")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BikeshareError>(),
            Some(BikeshareError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn json_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "nyc.json",
            r#"[
                {"Start Time": "2017-06-11 14:55:05", "Start Station": "A", "End Station": "B",
                 "Trip Duration": 795, "User Type": "Subscriber", "Gender": "Female", "Birth Year": 1998},
                {"Start Time": "2017-05-11 15:30:11", "Start Station": "C", "End Station": "A",
                 "Trip Duration": 692.5, "User Type": null, "Gender": null, "Birth Year": null}
            ]"#,
        );
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert!(ds.has_gender && ds.has_birth_year);
        assert_eq!(ds.trips[0].birth_year, Some(1998.0));
        assert_eq!(ds.trips[1].user_type, None);
        assert_eq!(ds.trips[1].trip_duration, 692.5);
    }

    #[test]
    fn parquet_written_from_batch() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = write_file(&dir, "chicago.csv", CHICAGO_CSV);
        let source = load_file(&csv_path).unwrap();

        let batch = trips_to_batch(&source, &source.trips, TableLayout::Source).unwrap();
        let pq_path = dir.path().join("chicago.parquet");
        let file = std::fs::File::create(&pq_path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let loaded = load_file(&pq_path).unwrap();
        assert_eq!(loaded, source);
    }

    #[test]
    fn load_data_filters_the_selected_city() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir, "chicago.csv", CHICAGO_CSV);
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let selection = Selection {
            city: crate::data::model::City::Chicago,
            month: MonthFilter::Month(6),
            day: DayFilter::Day(Weekday::Fri),
        };
        let ds = load_data(&config, &selection).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.trips[0].row, 0);
    }

    #[test]
    fn timestamp_variants() {
        let t = parse_timestamp("2017-01-01T09:07:57.500").unwrap();
        assert_eq!((t.month(), t.hour()), (1, 9));
        assert!(parse_timestamp("2017-01-01 09:07:57").is_some());
        assert!(parse_timestamp("01/01/2017").is_none());
    }
}
