use std::io::{self, Write};
use std::time::Instant;

use crate::data::model::TripDataset;
use crate::stats::{self, format_duration, mode, value_counts};

/// Separator printed after every section.
pub const RULE: &str = "----------------------------------------";

pub const NO_TRIPS: &str = "No trips match the selected filters.";
pub const NO_GENDER: &str = "No Data of Gender Available";
pub const NO_BIRTH_YEAR: &str = "No Data of Birth Year available";

// ---------------------------------------------------------------------------
// Computed statistics
// ---------------------------------------------------------------------------

/// Most frequent times of travel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeStats {
    /// 1-based month.
    pub month: u32,
    pub day: &'static str,
    /// Hour of day, 0–23.
    pub hour: u32,
}

/// Most popular stations and trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationStats {
    pub start_station: String,
    pub end_station: String,
    pub trip: String,
}

/// Total and mean trip duration, in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationStats {
    pub total: f64,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthYearStats {
    pub earliest: i64,
    pub most_recent: i64,
    pub most_common: i64,
}

/// Demographic breakdown. `None` marks an unavailable statistic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStats {
    pub user_types: Vec<(String, usize)>,
    pub genders: Option<Vec<(String, usize)>>,
    pub birth_years: Option<BirthYearStats>,
}

pub fn time_stats(dataset: &TripDataset) -> Option<TimeStats> {
    let trips = &dataset.trips;
    Some(TimeStats {
        month: mode(trips.iter().map(|t| t.month()))?,
        day: mode(trips.iter().map(|t| t.day_name()))?,
        hour: mode(trips.iter().map(|t| t.hour()))?,
    })
}

pub fn station_stats(dataset: &TripDataset) -> Option<StationStats> {
    let trips = &dataset.trips;
    Some(StationStats {
        start_station: mode(trips.iter().map(|t| t.start_station.as_str()))?.to_string(),
        end_station: mode(trips.iter().map(|t| t.end_station.as_str()))?.to_string(),
        trip: mode(trips.iter().map(|t| t.trip_label()))?,
    })
}

pub fn duration_stats(dataset: &TripDataset) -> Option<DurationStats> {
    let durations: Vec<f64> = dataset.trips.iter().map(|t| t.trip_duration).collect();
    Some(DurationStats {
        total: stats::sum(&durations),
        mean: stats::mean(&durations)?,
    })
}

pub fn user_stats(dataset: &TripDataset) -> Option<UserStats> {
    if dataset.is_empty() {
        return None;
    }
    let trips = &dataset.trips;

    let owned = |counts: Vec<(&str, usize)>| -> Vec<(String, usize)> {
        counts.into_iter().map(|(v, n)| (v.to_string(), n)).collect()
    };

    let user_types = owned(value_counts(trips.iter().filter_map(|t| t.user_type.as_deref())));

    let genders = dataset
        .has_gender
        .then(|| owned(value_counts(trips.iter().filter_map(|t| t.gender.as_deref()))))
        .filter(|counts| !counts.is_empty());

    let birth_years = if dataset.has_birth_year {
        let years: Vec<f64> = trips.iter().filter_map(|t| t.birth_year).collect();
        birth_year_stats(&years)
    } else {
        None
    };

    Some(UserStats {
        user_types,
        genders,
        birth_years,
    })
}

/// Earliest, most recent and most common year. `None` when no years are known.
pub fn birth_year_stats(years: &[f64]) -> Option<BirthYearStats> {
    Some(BirthYearStats {
        earliest: stats::min(years)? as i64,
        most_recent: stats::max(years)? as i64,
        most_common: mode(years.iter().map(|y| *y as i64))?,
    })
}

// ---------------------------------------------------------------------------
// Console reporters
// ---------------------------------------------------------------------------

/// Heading, timed body, elapsed time, rule.
fn section<W, F>(out: &mut W, heading: &str, body: F) -> io::Result<()>
where
    W: Write,
    F: FnOnce(&mut W) -> io::Result<()>,
{
    writeln!(out, "\n{heading}\n")?;
    let started = Instant::now();
    body(out)?;
    writeln!(out, "\nThis took {} seconds.", started.elapsed().as_secs_f64())?;
    writeln!(out, "{RULE}")
}

fn write_counts<W: Write>(out: &mut W, counts: &[(String, usize)]) -> io::Result<()> {
    let width = counts.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, count) in counts {
        writeln!(out, "  {label:<width$}  {count}")?;
    }
    Ok(())
}

pub fn report_time_stats<W: Write>(out: &mut W, dataset: &TripDataset) -> io::Result<()> {
    section(out, "Calculating The Most Frequent Times of Travel...", |out| {
        match time_stats(dataset) {
            Some(s) => {
                writeln!(out, "Most Common Month: {}", s.month)?;
                writeln!(out, "Most Common Day: {}", s.day)?;
                writeln!(out, "Most Common Start Hour: {}", s.hour)
            }
            None => writeln!(out, "{NO_TRIPS}"),
        }
    })
}

pub fn report_station_stats<W: Write>(out: &mut W, dataset: &TripDataset) -> io::Result<()> {
    section(out, "Calculating The Most Popular Stations and Trip...", |out| {
        match station_stats(dataset) {
            Some(s) => {
                writeln!(out, "Most Commonly Used Start Station: {}", s.start_station)?;
                writeln!(out, "Most Commonly Used End Station: {}", s.end_station)?;
                writeln!(
                    out,
                    "Most Frequent Combination of Start Station And End Station Trip: {}",
                    s.trip
                )
            }
            None => writeln!(out, "{NO_TRIPS}"),
        }
    })
}

pub fn report_duration_stats<W: Write>(out: &mut W, dataset: &TripDataset) -> io::Result<()> {
    section(out, "Calculating Trip Duration...", |out| {
        match duration_stats(dataset) {
            Some(s) => {
                writeln!(out, "Total Travel Time: {}", format_duration(s.total))?;
                writeln!(out, "Mean Travel Time: {}", format_duration(s.mean))
            }
            None => writeln!(out, "{NO_TRIPS}"),
        }
    })
}

pub fn report_user_stats<W: Write>(out: &mut W, dataset: &TripDataset) -> io::Result<()> {
    section(out, "Calculating User Stats...", |out| {
        let Some(s) = user_stats(dataset) else {
            return writeln!(out, "{NO_TRIPS}");
        };

        writeln!(out, "Counts of User Types:")?;
        write_counts(out, &s.user_types)?;

        match &s.genders {
            Some(genders) => {
                writeln!(out, "Counts of Gender:")?;
                write_counts(out, genders)?;
            }
            None => writeln!(out, "{NO_GENDER}")?,
        }

        match &s.birth_years {
            Some(b) => {
                writeln!(out, "Earliest Year of Birth: {}", b.earliest)?;
                writeln!(out, "Most Recent Year of Birth: {}", b.most_recent)?;
                writeln!(out, "Most Common Year of Birth: {}", b.most_common)
            }
            None => writeln!(out, "{NO_BIRTH_YEAR}"),
        }
    })
}

/// Run the four reporters in order.
pub fn report_all<W: Write>(out: &mut W, dataset: &TripDataset) -> io::Result<()> {
    report_time_stats(out, dataset)?;
    report_station_stats(out, dataset)?;
    report_duration_stats(out, dataset)?;
    report_user_stats(out, dataset)
}
