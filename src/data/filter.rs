use super::model::{DayFilter, MonthFilter, TripDataset, TripRecord};

// ---------------------------------------------------------------------------
// Month / weekday filtering
// ---------------------------------------------------------------------------

/// Whether a trip passes both constraints. `All` imposes nothing.
pub fn matches(trip: &TripRecord, month: MonthFilter, day: DayFilter) -> bool {
    month.matches(trip.month()) && day.matches(trip.weekday())
}

/// Return a new dataset holding only the trips that pass the filters, in
/// their original order. An empty result is valid.
pub fn apply(dataset: &TripDataset, month: MonthFilter, day: DayFilter) -> TripDataset {
    let trips: Vec<TripRecord> = dataset
        .trips
        .iter()
        .filter(|trip| matches(trip, month, day))
        .cloned()
        .collect();

    log::debug!(
        "filter month={month} day={day}: kept {} of {} trips",
        trips.len(),
        dataset.len()
    );

    dataset.with_trips(trips)
}
