use std::time::{Duration, Instant};

const UNITS: [&str; 4] = ["ns", "μs", "ms", "s"];
const SIGNIFICANT_DIGITS: usize = 4;

/// Run `f`, returning its result and how long it took.
pub fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let result = f();
    (result, start.elapsed())
}

/// Human-readable duration, e.g. `12.35ms` or `2s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let mut value = elapsed.as_nanos() as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }

    let mut text = round_to_significant(value);
    // rounding can carry into the next unit
    if text == "1000" && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
        text = round_to_significant(value);
    }

    format!("{text}{}", UNITS[unit])
}

fn round_to_significant(value: f64) -> String {
    let integer_digits = match value {
        v if v >= 100.0 => 3,
        v if v >= 10.0 => 2,
        _ => 1,
    };
    let decimals = SIGNIFICANT_DIGITS.saturating_sub(integer_digits);
    let text = format!("{value:.decimals$}");

    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}
