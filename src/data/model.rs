use std::fmt;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Enumerated selections
// ---------------------------------------------------------------------------

/// Months covered by the bikeshare exports, in calendar order.
pub const MONTHS: [&str; 6] = ["January", "February", "March", "April", "May", "June"];

/// Full weekday names in Monday-first order.
pub const WEEKDAYS: [(Weekday, &str); 7] = [
    (Weekday::Mon, "Monday"),
    (Weekday::Tue, "Tuesday"),
    (Weekday::Wed, "Wednesday"),
    (Weekday::Thu, "Thursday"),
    (Weekday::Fri, "Friday"),
    (Weekday::Sat, "Saturday"),
    (Weekday::Sun, "Sunday"),
];

/// Full English name of a weekday.
pub fn weekday_name(day: Weekday) -> &'static str {
    WEEKDAYS[day.num_days_from_monday() as usize].1
}

/// A city with a bikeshare dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub enum City {
    #[serde(rename = "chicago")]
    Chicago,
    #[serde(rename = "new york city")]
    NewYorkCity,
    #[serde(rename = "washington")]
    Washington,
}

impl City {
    pub const ALL: [City; 3] = [City::Chicago, City::NewYorkCity, City::Washington];

    /// Lower-case name as typed at the prompt.
    pub fn key(self) -> &'static str {
        match self {
            City::Chicago => "chicago",
            City::NewYorkCity => "new york city",
            City::Washington => "washington",
        }
    }

    /// File name used when the configuration does not override it.
    pub fn default_file(self) -> &'static str {
        match self {
            City::Chicago => "chicago.csv",
            City::NewYorkCity => "new_york_city.csv",
            City::Washington => "washington.csv",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn parse(input: &str) -> Option<City> {
        let input = input.trim();
        City::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(input))
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            City::Chicago => "Chicago",
            City::NewYorkCity => "New York City",
            City::Washington => "Washington",
        };
        f.write_str(name)
    }
}

/// Month constraint: `All` or a 1-based month index within [`MONTHS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthFilter {
    All,
    Month(u32),
}

impl MonthFilter {
    pub fn parse(input: &str) -> Option<MonthFilter> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("all") {
            return Some(MonthFilter::All);
        }
        MONTHS
            .iter()
            .position(|m| m.eq_ignore_ascii_case(input))
            .map(|i| MonthFilter::Month(i as u32 + 1))
    }

    pub fn matches(self, month: u32) -> bool {
        match self {
            MonthFilter::All => true,
            MonthFilter::Month(m) => m == month,
        }
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthFilter::All => f.write_str("All"),
            MonthFilter::Month(m) => match MONTHS.get((*m as usize).wrapping_sub(1)) {
                Some(name) => f.write_str(name),
                None => write!(f, "month {m}"),
            },
        }
    }
}

/// Day-of-week constraint: `All` or one full weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayFilter {
    All,
    Day(Weekday),
}

impl DayFilter {
    pub fn parse(input: &str) -> Option<DayFilter> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("all") {
            return Some(DayFilter::All);
        }
        WEEKDAYS
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(input))
            .map(|(day, _)| DayFilter::Day(*day))
    }

    pub fn matches(self, day: Weekday) -> bool {
        match self {
            DayFilter::All => true,
            DayFilter::Day(d) => d == day,
        }
    }
}

impl fmt::Display for DayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayFilter::All => f.write_str("All"),
            DayFilter::Day(d) => f.write_str(weekday_name(*d)),
        }
    }
}

/// The user's filter choice for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub city: City,
    pub month: MonthFilter,
    pub day: DayFilter,
}

// ---------------------------------------------------------------------------
// TripRecord – one row of a city export
// ---------------------------------------------------------------------------

/// A single bicycle rental.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    /// Zero-based position of the row in the source file.
    pub row: usize,
    pub start_time: NaiveDateTime,
    pub start_station: String,
    pub end_station: String,
    /// Trip length in seconds.
    pub trip_duration: f64,
    pub user_type: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<f64>,
}

impl TripRecord {
    /// Derived calendar month (1-based).
    pub fn month(&self) -> u32 {
        self.start_time.month()
    }

    /// Derived day of week.
    pub fn weekday(&self) -> Weekday {
        self.start_time.weekday()
    }

    pub fn day_name(&self) -> &'static str {
        weekday_name(self.weekday())
    }

    pub fn hour(&self) -> u32 {
        self.start_time.hour()
    }

    /// Combined start/end station label.
    pub fn trip_label(&self) -> String {
        format!("{} to {}", self.start_station, self.end_station)
    }
}

// ---------------------------------------------------------------------------
// TripDataset – a loaded (and possibly filtered) city export
// ---------------------------------------------------------------------------

/// Trip records plus the optional-column flags detected at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct TripDataset {
    pub trips: Vec<TripRecord>,
    /// Whether the source carried a `Gender` column.
    pub has_gender: bool,
    /// Whether the source carried a `Birth Year` column.
    pub has_birth_year: bool,
}

impl TripDataset {
    /// Same schema flags, different rows.
    pub fn with_trips(&self, trips: Vec<TripRecord>) -> Self {
        TripDataset {
            trips,
            has_gender: self.has_gender,
            has_birth_year: self.has_birth_year,
        }
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}
