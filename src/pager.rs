use std::io::{BufRead, Write};

use anyhow::Result;

use crate::console::{parse_yes_no, Console};
use crate::data::model::{TripDataset, TripRecord};
use crate::data::table;

pub const PAGE_SIZE: usize = 5;

const INVALID_ANSWER: &str = "Please Enter a Valid Answer";

/// Rows `[offset, offset + PAGE_SIZE)` clipped to the dataset; empty past the end.
pub fn page(dataset: &TripDataset, offset: usize) -> &[TripRecord] {
    let trips = &dataset.trips;
    let start = offset.min(trips.len());
    let end = offset.saturating_add(PAGE_SIZE).min(trips.len());
    &trips[start..end]
}

/// Offer the filtered rows five at a time until the user says no.
pub fn page_raw_data<R: BufRead, W: Write>(console: &mut Console<R, W>, dataset: &TripDataset) -> Result<()> {
    let mut wants_more = console.choose(
        "Would You Like to See 5 Lines of Raw Data? Yes/No",
        INVALID_ANSWER,
        parse_yes_no,
    )?;

    let mut offset = 0;
    while wants_more {
        let rows = page(dataset, offset);
        if rows.is_empty() {
            console.say("No more rows to display.")?;
        } else {
            console.say(&table::render(dataset, rows)?)?;
        }
        offset += PAGE_SIZE;

        wants_more = console.choose_repeating(
            "Would You Like to See 5 more Lines? Yes/No",
            INVALID_ANSWER,
            parse_yes_no,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Cursor;

    fn dataset(n: usize) -> TripDataset {
        let trips = (0..n)
            .map(|row| TripRecord {
                row,
                start_time: NaiveDate::from_ymd_opt(2017, 1, 1 + row as u32)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap(),
                start_station: format!("Station {row}"),
                end_station: "Depot".into(),
                trip_duration: 300.0,
                user_type: Some("Subscriber".into()),
                gender: None,
                birth_year: None,
            })
            .collect();
        TripDataset {
            trips,
            has_gender: false,
            has_birth_year: false,
        }
    }

    fn run(ds: &TripDataset, input: &str) -> Result<String> {
        let mut console = Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        page_raw_data(&mut console, ds)?;
        Ok(String::from_utf8(console.into_output()).unwrap())
    }

    #[test]
    fn page_clips_to_the_end() {
        let ds = dataset(7);
        assert_eq!(page(&ds, 0).len(), 5);
        assert_eq!(page(&ds, 5).len(), 2);
        assert!(page(&ds, 10).is_empty());
    }

    #[test]
    fn seven_rows_in_two_pages() {
        let ds = dataset(7);
        let text = run(&ds, "yes\nyes\nno\n").unwrap();
        let chunks: Vec<&str> = text.split("Would You Like to See 5 more Lines?").collect();
        assert_eq!(chunks.len(), 3);

        for row in 0..5 {
            assert!(chunks[0].contains(&format!("Station {row}")));
        }
        assert!(!chunks[0].contains("Station 5"));
        assert!(chunks[1].contains("Station 5"));
        assert!(chunks[1].contains("Station 6"));
        assert!(!chunks[1].contains("Station 4"));
        assert!(!chunks[2].contains("Station"));
    }

    #[test]
    fn declining_shows_nothing() {
        let text = run(&dataset(7), "no\n").unwrap();
        assert!(!text.contains("Station"));
        assert!(!text.contains("5 more Lines"));
    }

    #[test]
    fn invalid_answer_does_not_advance() {
        let text = run(&dataset(7), "maybe\nyes\nsure\nno\n").unwrap();
        assert_eq!(text.matches(INVALID_ANSWER).count(), 2);
        assert!(text.contains("Station 4"));
        assert!(!text.contains("Station 5"));
    }

    #[test]
    fn invalid_answer_repeats_the_more_lines_question() {
        let text = run(&dataset(7), "yes\nmaybe\nno\n").unwrap();
        assert_eq!(text.matches("Would You Like to See 5 more Lines?").count(), 2);
    }

    #[test]
    fn paging_past_the_end_keeps_asking() {
        let text = run(&dataset(3), "yes\nyes\nyes\nno\n").unwrap();
        assert_eq!(text.matches("No more rows to display.").count(), 2);
    }
}
