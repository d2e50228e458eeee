//! Resolves the configured timezone to the offset used for "today".

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::{Error, date_range::DateRange};

pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// The current calendar year in `canonical_timezone`, e.g. "Pacific/Auckland".
///
/// # Errors
/// Returns [Error::InvalidTimezoneError] if `canonical_timezone` is not a
/// known timezone.
pub fn current_year(canonical_timezone: &str) -> Result<DateRange, Error> {
    let local_offset = get_local_offset(canonical_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", canonical_timezone);
        Error::InvalidTimezoneError(canonical_timezone.to_owned())
    })?;

    Ok(DateRange::current_year(local_offset))
}
