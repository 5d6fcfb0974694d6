use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bikeshare_explorer::config::Config;
use bikeshare_explorer::data::model::{City, TripDataset, TripRecord};
use bikeshare_explorer::data::table::{trips_to_batch, TableLayout};
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

const TRIPS_PER_CITY: usize = 1500;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }
}

fn stations(city: City) -> &'static [&'static str] {
    match city {
        City::Chicago => &[
            "Streeter Dr & Grand Ave",
            "Lake Shore Dr & Monroe St",
            "Clinton St & Washington Blvd",
            "Canal St & Adams St",
            "Theater on the Lake",
            "Michigan Ave & Oak St",
        ],
        City::NewYorkCity => &[
            "Pershing Square North",
            "E 17 St & Broadway",
            "W 21 St & 6 Ave",
            "Broadway & E 22 St",
            "Lafayette St & E 8 St",
            "West St & Chambers St",
        ],
        City::Washington => &[
            "Columbus Circle / Union Station",
            "Lincoln Memorial",
            "Jefferson Dr & 14th St SW",
            "Massachusetts Ave & Dupont Circle NW",
            "15th & P St NW",
            "Thomas Circle",
        ],
    }
}

fn generate_city(city: City, rng: &mut SimpleRng) -> TripDataset {
    let demographics = city != City::Washington;
    let first_day = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap_or_default();
    let commute_hours = [7, 8, 8, 9, 16, 17, 17, 18];

    let trips = (0..TRIPS_PER_CITY)
        .map(|row| {
            let day = rng.below(181) as i64;
            let hour = if rng.next_f64() < 0.6 {
                commute_hours[rng.below(commute_hours.len())]
            } else {
                rng.below(24) as i64
            };
            let start_time = (first_day + Duration::days(day)).and_hms_opt(0, 0, 0).unwrap_or_default()
                + Duration::hours(hour)
                + Duration::seconds(rng.below(3600) as i64);

            let is_customer = rng.next_f64() < 0.2;
            let user_type = if is_customer { "Customer" } else { "Subscriber" };
            let (gender, birth_year) = if demographics && !is_customer {
                let gender = rng.pick(&["Male", "Male", "Male", "Female"]);
                (Some(gender.to_string()), Some(1950.0 + rng.below(50) as f64))
            } else {
                (None, None)
            };

            TripRecord {
                row,
                start_time,
                start_station: rng.pick(stations(city)).to_string(),
                end_station: rng.pick(stations(city)).to_string(),
                trip_duration: (60 + rng.below(2400)) as f64,
                user_type: Some(user_type.to_string()),
                gender,
                birth_year,
            }
        })
        .collect();

    TripDataset {
        trips,
        has_gender: demographics,
        has_birth_year: demographics,
    }
}

fn write_csv(dataset: &TripDataset, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;

    let mut header = vec!["", "Start Time", "Trip Duration", "Start Station", "End Station", "User Type"];
    if dataset.has_gender {
        header.push("Gender");
    }
    if dataset.has_birth_year {
        header.push("Birth Year");
    }
    writer.write_record(&header)?;

    for trip in &dataset.trips {
        let mut record = vec![
            trip.row.to_string(),
            trip.start_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            trip.trip_duration.to_string(),
            trip.start_station.clone(),
            trip.end_station.clone(),
            trip.user_type.clone().unwrap_or_default(),
        ];
        if dataset.has_gender {
            record.push(trip.gender.clone().unwrap_or_default());
        }
        if dataset.has_birth_year {
            record.push(trip.birth_year.map(|y| format!("{y:.1}")).unwrap_or_default());
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(dataset: &TripDataset, path: &Path) -> Result<()> {
    let batch = trips_to_batch(dataset, &dataset.trips, TableLayout::Source)?;
    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Usage: `generate_sample [csv|parquet] [out_dir]`
fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let format = args.next().unwrap_or_else(|| "csv".to_string());
    let out_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    if !matches!(format.as_str(), "csv" | "parquet") {
        bail!("unknown format '{format}', expected csv or parquet");
    }
    std::fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let defaults = Config::default();

    for city in City::ALL {
        let dataset = generate_city(city, &mut rng);
        let file = defaults.path_for(city).with_extension(&format);
        let path = out_dir.join(file.file_name().context("data file name")?);

        match format.as_str() {
            "parquet" => write_parquet(&dataset, &path)?,
            _ => write_csv(&dataset, &path)?,
        }
        println!("Wrote {} {city} trips to {}", dataset.len(), path.display());
    }
    Ok(())
}
