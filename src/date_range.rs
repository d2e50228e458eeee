//! Reporting periods: inclusive date ranges and the months they cover.

use std::{fmt::Display, str::FromStr};

use time::{
    Date, Month, OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::Error;

/// The format used for dates in forms and query strings, e.g. "2024-01-31".
pub const DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month repr:numerical padding:zero]-[day padding:zero]");

/// Parse a date in the `YYYY-MM-DD` format.
///
/// # Errors
/// Returns [Error::InvalidDate] with the offending text if it cannot be parsed.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDate(text.to_owned()))
}

/// Format a date in the `YYYY-MM-DD` format.
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

/// An inclusive range of dates where the start is never after the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    /// Create a date range from `start` to `end`, inclusive.
    ///
    /// # Errors
    /// Returns [Error::InvalidDateRange] if `start` is after `end`.
    pub fn new(start: Date, end: Date) -> Result<Self, Error> {
        if start > end {
            return Err(Error::InvalidDateRange { start, end });
        }

        Ok(Self { start, end })
    }

    /// The calendar year containing today in the timezone given by `local_offset`.
    ///
    /// This is the period reports default to when none is given.
    pub fn current_year(local_offset: UtcOffset) -> Self {
        let today = OffsetDateTime::now_utc().to_offset(local_offset).date();
        Self::calendar_year(today.year())
    }

    /// January 1st to December 31st of `year`.
    pub fn calendar_year(year: i32) -> Self {
        // January 1st and December 31st exist in every year `Date` can represent.
        let start = Date::from_calendar_date(year, Month::January, 1).unwrap_or(Date::MIN);
        let end = Date::from_calendar_date(year, Month::December, 31).unwrap_or(Date::MAX);

        Self { start, end }
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// The number of calendar months overlapped by this range.
    pub fn month_count(&self) -> i64 {
        let years = i64::from(self.end.year()) - i64::from(self.start.year());
        let months = i64::from(self.end.month() as u8) - i64::from(self.start.month() as u8);

        years * 12 + months + 1
    }

    /// The months overlapped by this range in chronological order.
    pub fn months(&self) -> Vec<YearMonth> {
        let last = YearMonth::from_date(self.end);
        let mut month = YearMonth::from_date(self.start);
        let mut months = Vec::new();

        while month <= last {
            months.push(month);
            month = month.next();
        }

        months
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", format_date(self.start), format_date(self.end))
    }
}

/// A calendar month of a specific year.
///
/// Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u8,
}

impl YearMonth {
    /// Create a month from a year and a month number from 1 to 12.
    ///
    /// # Errors
    /// Returns [Error::InvalidDate] if `month` is not between 1 and 12.
    pub fn new(year: i32, month: u8) -> Result<Self, Error> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidDate(format!("{year}-{month}")));
        }

        Ok(Self { year, month })
    }

    /// The month that `date` falls in.
    pub fn from_date(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month() as u8,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month number from 1 to 12.
    pub fn month(&self) -> u8 {
        self.month
    }

    /// The following month.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The month as a sortable key, e.g. "2024-01".
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// The month as a human readable label, e.g. "Jan 2024".
    pub fn label(&self) -> String {
        let name = match self.month {
            1 => "Jan",
            2 => "Feb",
            3 => "Mar",
            4 => "Apr",
            5 => "May",
            6 => "Jun",
            7 => "Jul",
            8 => "Aug",
            9 => "Sep",
            10 => "Oct",
            11 => "Nov",
            _ => "Dec",
        };

        format!("{name} {}", self.year)
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    /// Parse a month key in the form "YYYY-MM".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidDate(s.to_owned());

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;

        YearMonth::new(year, month)
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}
