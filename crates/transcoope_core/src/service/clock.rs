//! Local-time labels: the header date and the time-of-day greeting.

use chrono::{DateTime, Local, TimeZone, Timelike};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Greeting {
    Morning,
    Afternoon,
    Evening,
}

impl Greeting {
    /// Morning before 12:00, afternoon before 18:00, evening otherwise.
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            0..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            _ => Self::Evening,
        }
    }

    pub fn now() -> Self {
        Self::for_hour(Local::now().hour())
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Morning => "Good morning",
            Self::Afternoon => "Good afternoon",
            Self::Evening => "Good evening",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Morning => "🌅",
            Self::Afternoon => "☀️",
            Self::Evening => "🌙",
        }
    }
}

/// Formats a date as `Weekday, Month D, YYYY`.
pub fn date_label<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%A, %B %-d, %Y").to_string()
}

pub fn current_date_label() -> String {
    date_label(&Local::now())
}

#[cfg(test)]
mod tests {
    use super::{date_label, Greeting};
    use chrono::{TimeZone, Utc};

    #[test]
    fn greeting_boundaries() {
        assert_eq!(Greeting::for_hour(0), Greeting::Morning);
        assert_eq!(Greeting::for_hour(11), Greeting::Morning);
        assert_eq!(Greeting::for_hour(12), Greeting::Afternoon);
        assert_eq!(Greeting::for_hour(17), Greeting::Afternoon);
        assert_eq!(Greeting::for_hour(18), Greeting::Evening);
        assert_eq!(Greeting::for_hour(23), Greeting::Evening);
    }

    #[test]
    fn date_label_spells_out_weekday_and_month() {
        let date = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();
        assert_eq!(date_label(&date), "Monday, October 19, 2026");
    }
}
