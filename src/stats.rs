use std::collections::HashMap;
use std::fmt::Write;
use std::hash::Hash;

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;

// ---------------------------------------------------------------------------
// Frequency aggregates
// ---------------------------------------------------------------------------

/// Count occurrences of each distinct value.
///
/// Sorted by descending count; values with equal counts keep the order in
/// which they were first seen.
pub fn value_counts<T, I>(values: I) -> Vec<(T, usize)>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut position: HashMap<T, usize> = HashMap::new();
    let mut counts: Vec<(T, usize)> = Vec::new();

    for value in values {
        match position.get(&value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                position.insert(value.clone(), counts.len());
                counts.push((value, 1));
            }
        }
    }

    // Stable sort keeps first-seen order among ties.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Most frequent value; ties go to the value seen first. `None` when empty.
pub fn mode<T, I>(values: I) -> Option<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    value_counts(values).into_iter().next().map(|(value, _)| value)
}

// ---------------------------------------------------------------------------
// Numeric aggregates
// ---------------------------------------------------------------------------

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(sum(values) / values.len() as f64)
    }
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

// ---------------------------------------------------------------------------
// Elapsed-time formatting
// ---------------------------------------------------------------------------

/// Format a number of seconds as `[D day[s], ]H:MM:SS[.ffffff]`.
///
/// Rounds to the nearest microsecond (ties to even). Negative inputs borrow
/// from the day count, so the clock part is always non-negative.
pub fn format_duration(seconds: f64) -> String {
    let total = (seconds * MICROS_PER_SECOND as f64).round_ties_even() as i64;
    let days = total.div_euclid(MICROS_PER_DAY);
    let rest = total.rem_euclid(MICROS_PER_DAY);

    let secs = rest / MICROS_PER_SECOND;
    let micros = rest % MICROS_PER_SECOND;
    let (h, m, s) = (secs / 3600, secs % 3600 / 60, secs % 60);

    let mut out = String::new();
    if days != 0 {
        let plural = if days.abs() == 1 { "" } else { "s" };
        let _ = write!(out, "{days} day{plural}, ");
    }
    let _ = write!(out, "{h}:{m:02}:{s:02}");
    if micros != 0 {
        let _ = write!(out, ".{micros:06}");
    }
    out
}
