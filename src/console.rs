use std::io::{BufRead, Write};

use anyhow::Result;

use crate::data::model::{City, DayFilter, MonthFilter, Selection};
use crate::error::BikeshareError;
use crate::report::RULE;

// ---------------------------------------------------------------------------
// Console – line-oriented prompts over any reader/writer pair
// ---------------------------------------------------------------------------

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    /// Next input line, trimmed and lower-cased. Bytes that are not valid
    /// UTF-8 are replaced, so a garbled line is just another invalid answer.
    /// End of input is an error so that reprompt loops cannot spin forever.
    pub fn read_answer(&mut self) -> Result<String> {
        self.output.flush()?;
        let mut line = Vec::new();
        if self.input.read_until(b'\n', &mut line)? == 0 {
            return Err(BikeshareError::InputClosed.into());
        }
        Ok(String::from_utf8_lossy(&line).trim().to_lowercase())
    }

    /// Print `question` once, then read answers until `parse` accepts one,
    /// printing `invalid` after each rejected answer.
    pub fn choose<T>(
        &mut self,
        question: &str,
        invalid: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<T> {
        self.choose_with(question, invalid, parse, false)
    }

    /// Like [`Console::choose`], but repeats `question` after every rejected answer.
    pub fn choose_repeating<T>(
        &mut self,
        question: &str,
        invalid: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<T> {
        self.choose_with(question, invalid, parse, true)
    }

    fn choose_with<T>(
        &mut self,
        question: &str,
        invalid: &str,
        parse: impl Fn(&str) -> Option<T>,
        repeat_question: bool,
    ) -> Result<T> {
        self.say(question)?;
        loop {
            let answer = self.read_answer()?;
            if let Some(value) = parse(&answer) {
                return Ok(value);
            }
            log::debug!("rejected answer {answer:?}");
            self.say(invalid)?;
            if repeat_question {
                self.say(question)?;
            }
        }
    }
}

/// A strict yes/no answer.
pub fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Input collector
// ---------------------------------------------------------------------------

/// Ask for city, month and day until each is valid, then echo the choice.
pub fn collect_selection<R: BufRead, W: Write>(console: &mut Console<R, W>) -> Result<Selection> {
    console.say("Hello! Let's explore some US bikeshare data!\n")?;

    let city = console.choose(
        "Please enter the name of the city (Chicago, New York City, Washington) to filter by",
        "Please enter a valid city",
        City::parse,
    )?;
    let month = console.choose(
        "Please enter the name of the month (January - June) to filter by, or 'all' to apply no month filter",
        "Please enter a valid month",
        MonthFilter::parse,
    )?;
    let day = console.choose(
        "Please enter the name of the day to filter by, or 'all' to apply no day filter",
        "Please enter a valid day",
        DayFilter::parse,
    )?;

    let selection = Selection { city, month, day };
    log::info!("Selected city={city} month={month} day={day}");

    console.say("You chose:\n")?;
    console.say(&format!("City: {city}"))?;
    console.say(&format!("Month: {month}"))?;
    console.say(&format!("Day: {day}\n"))?;
    console.say(RULE)?;

    Ok(selection)
}
