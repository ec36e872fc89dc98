//! The pages behind the three script binaries. Each module has a `handler`
//! suitable for [`crate::main`], and a lower-level function that does the
//! actual work against any sink, for testing.

pub mod hello;
pub mod slow;
pub mod test_form;

use chrono::NaiveDateTime;

/// How the pages print the current time: `2026-10-16 12:34:56.789012`.
pub fn format_time(now: &NaiveDateTime) -> String {
    now.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

#[cfg(test)]
pub(crate) fn fixed_time() -> NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
        .and_hms_micro_opt(12, 34, 56, 789).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_format_has_microseconds() {
        assert_eq!(format_time(&fixed_time()), "2026-10-16 12:34:56.000789");
    }
}
