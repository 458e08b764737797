//! Text helpers for display strings

use core::fmt::Write;

use heapless::String;
use pixelix_hal::DateTime;

/// Maximum length of a formatted date/time string
pub const DATE_TIME_LEN: usize = 32;

/// Replace `,` thousands separators by `'`
///
/// Purely textual; the number itself is not reinterpreted.
pub fn substitute_group_separator(text: &str) -> alloc::string::String {
    text.replace(',', "'")
}

/// Format a date/time with a small strftime subset
///
/// Supported: `%H %M %S %d %m %Y %y %%`. Unknown specifiers are copied
/// literally. Returns `None` if the result does not fit.
pub fn format_date_time(format: &str, time: &DateTime) -> Option<String<DATE_TIME_LEN>> {
    let mut out: String<DATE_TIME_LEN> = String::new();
    let mut chars = format.chars();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch).ok()?;
            continue;
        }

        match chars.next() {
            Some('H') => write!(out, "{:02}", time.hour).ok()?,
            Some('M') => write!(out, "{:02}", time.minute).ok()?,
            Some('S') => write!(out, "{:02}", time.second).ok()?,
            Some('d') => write!(out, "{:02}", time.day).ok()?,
            Some('m') => write!(out, "{:02}", time.month).ok()?,
            Some('Y') => write!(out, "{:04}", time.year).ok()?,
            Some('y') => write!(out, "{:02}", time.year % 100).ok()?,
            Some('%') => out.push('%').ok()?,
            Some(other) => {
                out.push('%').ok()?;
                out.push(other).ok()?;
            }
            None => out.push('%').ok()?,
        }
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DateTime {
        DateTime {
            year: 2024,
            month: 3,
            day: 7,
            hour: 9,
            minute: 5,
            second: 2,
            weekday: 4,
            year_day: 66,
        }
    }

    #[test]
    fn test_group_separator() {
        assert_eq!(substitute_group_separator("42,123.50"), "42'123.50");
        assert_eq!(substitute_group_separator("1,000,000"), "1'000'000");
        assert_eq!(substitute_group_separator("99.5"), "99.5");
    }

    #[test]
    fn test_time_format() {
        let s = format_date_time("%H:%M:%S", &sample()).unwrap();
        assert_eq!(s.as_str(), "09:05:02");
    }

    #[test]
    fn test_date_format() {
        let s = format_date_time("%d.%m.%Y", &sample()).unwrap();
        assert_eq!(s.as_str(), "07.03.2024");
        let s = format_date_time("%y-%q 100%%", &sample()).unwrap();
        assert_eq!(s.as_str(), "24-%q 100%");
    }

    #[test]
    fn test_overflow() {
        let fmt = "%Y%Y%Y%Y%Y%Y%Y%Y%Y";
        assert!(format_date_time(fmt, &sample()).is_none());
    }
}
