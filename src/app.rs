use std::io::{BufRead, Write};

use anyhow::Result;

use crate::config::Config;
use crate::console::{collect_selection, Console};
use crate::data::loader;
use crate::pager;
use crate::report;

// ---------------------------------------------------------------------------
// Interactive session
// ---------------------------------------------------------------------------

pub struct BikeshareApp<R, W> {
    pub config: Config,
    console: Console<R, W>,
}

impl<R: BufRead, W: Write> BikeshareApp<R, W> {
    pub fn new(config: Config, input: R, output: W) -> Self {
        Self {
            config,
            console: Console::new(input, output),
        }
    }

    /// Run explore cycles until the user declines to restart.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.run_once()?;

            self.console.say("\nWould you like to restart? Enter yes or no.")?;
            if self.console.read_answer()? != "yes" {
                log::info!("Session finished");
                return Ok(());
            }
        }
    }

    /// One cycle: collect filters, load, report, page.
    pub fn run_once(&mut self) -> Result<()> {
        let selection = collect_selection(&mut self.console)?;
        let dataset = loader::load_data(&self.config, &selection)?;

        report::report_all(self.console.output(), &dataset)?;
        pager::page_raw_data(&mut self.console, &dataset)
    }

    pub fn into_output(self) -> W {
        self.console.into_output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const NYC_CSV: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
5688089,2017-06-11 14:55:05,2017-06-11 15:08:21,795,Suffolk St & Stanton St,W Broadway & Spring St,Subscriber,Male,1998.0
4096714,2017-05-11 15:30:11,2017-05-11 15:41:43,692,Lexington Ave & E 63 St,1 Ave & E 78 St,Subscriber,Male,1981.0
2173887,2017-03-29 13:26:26,2017-03-29 13:48:31,1325,1 Pl & Clinton St,Henry St & Degraw St,Subscriber,Male,1987.0
3945638,2017-05-08 19:47:18,2017-05-08 19:59:01,703,Barrow St & Hudson St,W 20 St & 8 Ave,Subscriber,Female,1986.0
6208972,2017-06-21 07:49:16,2017-06-21 07:54:46,329,1 Ave & E 44 St,E 53 St & 3 Ave,Subscriber,Male,1992.0
";

    const WASHINGTON_CSV: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type
1621326,2017-06-21 08:36:34,2017-06-21 08:44:43,489.066,14th & Belmont St NW,15th & K St NW,Subscriber
";

    fn app(dir: &tempfile::TempDir, input: &str) -> BikeshareApp<Cursor<Vec<u8>>, Vec<u8>> {
        std::fs::write(dir.path().join("new_york_city.csv"), NYC_CSV).unwrap();
        std::fs::write(dir.path().join("washington.csv"), WASHINGTON_CSV).unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        BikeshareApp::new(config, Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn full_cycle_with_month_filter() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir, "new york city\nmay\nall\nno\nno\n");
        app.run().unwrap();
        let text = String::from_utf8(app.into_output()).unwrap();

        assert!(text.contains("Most Common Month: 5"));
        assert!(text.contains("Most Commonly Used Start Station: Lexington Ave & E 63 St"));
        assert!(text.contains("Total Travel Time: 0:23:15"));
        assert!(text.contains("Earliest Year of Birth: 1981"));
        assert!(text.contains("Would you like to restart?"));
    }

    #[test]
    fn restart_runs_another_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir, "washington\nall\nall\nno\nyes\nwashington\njanuary\nall\nno\nno\n");
        app.run().unwrap();
        let text = String::from_utf8(app.into_output()).unwrap();

        assert_eq!(text.matches("You chose:").count(), 2);
        assert!(text.contains(report::NO_GENDER));
        // The January cycle matches nothing.
        assert_eq!(text.matches(report::NO_TRIPS).count(), 4);
    }

    #[test]
    fn missing_data_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir, "chicago\nall\nall\n");
        assert!(app.run().is_err());
    }
}
