use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{
    ArrayRef, Float64Array, StringArray, TimestampMicrosecondArray, UInt32Array, UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;

use super::loader::{BIRTH_YEAR, END_STATION, GENDER, START_STATION, START_TIME, TRIP_DURATION, USER_TYPE};
use super::model::{TripDataset, TripRecord};

/// Which columns a batch carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableLayout {
    /// The export's own columns, with `Start Time` as a timestamp. Suitable
    /// for writing Parquet files the loader can read back.
    Source,
    /// Source row index, the export columns as text, plus the derived
    /// `month` and `day_of_week` fields. Used when paging raw rows.
    Display,
}

/// Build an Arrow batch from a slice of trips. Optional columns follow the
/// dataset's presence flags.
pub fn trips_to_batch(dataset: &TripDataset, trips: &[TripRecord], layout: TableLayout) -> Result<RecordBatch> {
    let mut fields: Vec<Field> = Vec::new();
    let mut columns: Vec<ArrayRef> = Vec::new();

    if layout == TableLayout::Display {
        fields.push(Field::new("", DataType::UInt64, false));
        columns.push(Arc::new(UInt64Array::from_iter_values(
            trips.iter().map(|t| t.row as u64),
        )));
    }

    match layout {
        TableLayout::Source => {
            fields.push(Field::new(
                START_TIME,
                DataType::Timestamp(TimeUnit::Microsecond, None),
                false,
            ));
            columns.push(Arc::new(TimestampMicrosecondArray::from_iter_values(
                trips.iter().map(|t| t.start_time.and_utc().timestamp_micros()),
            )));
        }
        TableLayout::Display => {
            fields.push(Field::new(START_TIME, DataType::Utf8, false));
            columns.push(Arc::new(StringArray::from_iter_values(
                trips.iter().map(|t| t.start_time.format("%Y-%m-%d %H:%M:%S").to_string()),
            )));
        }
    }

    fields.push(Field::new(TRIP_DURATION, DataType::Float64, false));
    columns.push(Arc::new(Float64Array::from_iter_values(
        trips.iter().map(|t| t.trip_duration),
    )));

    fields.push(Field::new(START_STATION, DataType::Utf8, false));
    columns.push(Arc::new(StringArray::from_iter_values(
        trips.iter().map(|t| t.start_station.as_str()),
    )));

    fields.push(Field::new(END_STATION, DataType::Utf8, false));
    columns.push(Arc::new(StringArray::from_iter_values(
        trips.iter().map(|t| t.end_station.as_str()),
    )));

    fields.push(Field::new(USER_TYPE, DataType::Utf8, true));
    columns.push(Arc::new(StringArray::from_iter(
        trips.iter().map(|t| t.user_type.as_deref()),
    )));

    if dataset.has_gender {
        fields.push(Field::new(GENDER, DataType::Utf8, true));
        columns.push(Arc::new(StringArray::from_iter(
            trips.iter().map(|t| t.gender.as_deref()),
        )));
    }

    if dataset.has_birth_year {
        fields.push(Field::new(BIRTH_YEAR, DataType::Float64, true));
        columns.push(Arc::new(Float64Array::from_iter(
            trips.iter().map(|t| t.birth_year),
        )));
    }

    if layout == TableLayout::Display {
        fields.push(Field::new("month", DataType::UInt32, false));
        columns.push(Arc::new(UInt32Array::from_iter_values(
            trips.iter().map(TripRecord::month),
        )));
        fields.push(Field::new("day_of_week", DataType::Utf8, false));
        columns.push(Arc::new(StringArray::from_iter_values(
            trips.iter().map(TripRecord::day_name),
        )));
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).context("building trip table")
}

/// Render trips as an aligned text table.
pub fn render(dataset: &TripDataset, trips: &[TripRecord]) -> Result<String> {
    let batch = trips_to_batch(dataset, trips, TableLayout::Display)?;
    let table = pretty_format_batches(&[batch]).context("formatting trip table")?;
    Ok(table.to_string())
}
