use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;
use time::{Date, Duration, Month, OffsetDateTime, Time, UtcOffset};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValidityUnit {
    Year,
    Day,
    Hour,
    Minute,
}

/// Certificate or private key validity, e.g. `2y`, `30d`, `12h`, `90m`.
/// A bare number is a count of days.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Validity {
    pub count: u32,
    pub unit: ValidityUnit,
}

impl Validity {
    pub fn days(count: u32) -> Self {
        Validity { count, unit: ValidityUnit::Day }
    }

    /// `instant` moved forward by this validity. Years are calendar years; a
    /// 29 February start lands on 28 February when the target year has none.
    pub fn add_to(&self, instant: OffsetDateTime) -> Option<OffsetDateTime> {
        let count = self.count as i64;
        match self.unit {
            ValidityUnit::Year => {
                let year = instant.year().checked_add(i32::try_from(self.count).ok()?)?;
                let date = match Date::from_calendar_date(year, instant.month(), instant.day()) {
                    Ok(date) => date,
                    Err(_) if instant.month() == Month::February && instant.day() == 29 =>
                        Date::from_calendar_date(year, Month::February, 28).ok()?,
                    Err(_) => return None,
                };
                Some(instant.replace_date(date))
            },
            ValidityUnit::Day => instant.checked_add(Duration::days(count)),
            ValidityUnit::Hour => instant.checked_add(Duration::hours(count)),
            ValidityUnit::Minute => instant.checked_add(Duration::minutes(count)),
        }
    }
}

impl FromStr for Validity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidValidity(s.to_string());
        let text = s.trim();
        let (digits, unit) = match text.chars().last() {
            Some('y') | Some('Y') => (&text[..text.len() - 1], ValidityUnit::Year),
            Some('d') | Some('D') => (&text[..text.len() - 1], ValidityUnit::Day),
            Some('h') | Some('H') => (&text[..text.len() - 1], ValidityUnit::Hour),
            Some('m') | Some('M') => (&text[..text.len() - 1], ValidityUnit::Minute),
            Some(c) if c.is_ascii_digit() => (text, ValidityUnit::Day),
            _ => return Err(invalid()),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let count = digits.parse::<u32>().map_err(|_| invalid())?;
        if count == 0 {
            return Err(invalid());
        }
        Ok(Validity { count, unit })
    }
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            ValidityUnit::Year => 'y',
            ValidityUnit::Day => 'd',
            ValidityUnit::Hour => 'h',
            ValidityUnit::Minute => 'm',
        };
        write!(f, "{}{}", self.count, unit)
    }
}

/// How the certificate notBefore is derived from the requested one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NotBeforeOption {
    Offset(Duration),
    /// Start of the day in the given zone.
    Midnight(UtcOffset),
}

impl NotBeforeOption {
    pub fn not_before(&self, requested: Option<OffsetDateTime>, now: OffsetDateTime) -> OffsetDateTime {
        let base = match requested {
            Some(requested) if requested > now => requested,
            _ => now,
        };
        match self {
            NotBeforeOption::Offset(offset) => base.checked_add(*offset).unwrap_or(base),
            NotBeforeOption::Midnight(zone) => base
                .to_offset(*zone)
                .replace_time(Time::MIDNIGHT)
                .to_offset(UtcOffset::UTC),
        }
    }
}

impl Default for NotBeforeOption {
    fn default() -> Self {
        NotBeforeOption::Offset(Duration::ZERO)
    }
}

fn parse_zone(id: &str) -> Option<UtcOffset> {
    let rest = id.strip_prefix("GMT")?;
    let (sign, hours) = match rest.chars().next()? {
        '+' => (1, &rest[1..]),
        '-' => (-1, &rest[1..]),
        _ => return None,
    };
    if hours.is_empty() || hours.len() > 2 || !hours.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i8 = hours.parse().ok()?;
    if hours > 12 {
        return None;
    }
    UtcOffset::from_hms(sign * hours, 0, 0).ok()
}

/// `current`, `midnight`, `midnight:GMT+8`, `+1d`, `-30m`, `+15s`.
impl FromStr for NotBeforeOption {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidNotBefore(s.to_string());
        let text = s.trim().to_ascii_lowercase();
        if text == "current" {
            return Ok(NotBeforeOption::Offset(Duration::ZERO));
        }
        if let Some(rest) = text.strip_prefix("midnight") {
            let zone = match rest.strip_prefix(':') {
                Some(id) => parse_zone(&id.to_ascii_uppercase()).ok_or_else(invalid)?,
                None if rest.is_empty() => UtcOffset::UTC,
                None => return Err(invalid()),
            };
            return Ok(NotBeforeOption::Midnight(zone));
        }
        let negative = match text.chars().next() {
            Some('+') => false,
            Some('-') => true,
            _ => return Err(invalid()),
        };
        if text.len() < 3 {
            return Err(invalid());
        }
        let digits = &text[1..text.len() - 1];
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let count: i64 = digits.parse().map_err(|_| invalid())?;
        let offset = match text.chars().last() {
            Some('d') => Duration::days(count),
            Some('h') => Duration::hours(count),
            Some('m') => Duration::minutes(count),
            Some('s') => Duration::seconds(count),
            _ => return Err(invalid()),
        };
        Ok(NotBeforeOption::Offset(if negative { -offset } else { offset }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{datetime, offset};

    #[test]
    fn validity_should_parse_units () {
        assert_eq!("2y".parse::<Validity>(), Ok(Validity { count: 2, unit: ValidityUnit::Year }));
        assert_eq!("30".parse::<Validity>(), Ok(Validity::days(30)));
        assert_eq!("12h".parse::<Validity>(), Ok(Validity { count: 12, unit: ValidityUnit::Hour }));
        assert!("y".parse::<Validity>().is_err());
        assert!("0d".parse::<Validity>().is_err());
        assert!("1w".parse::<Validity>().is_err());
    }

    #[test]
    fn leap_day_should_land_on_february_28 () {
        let start = datetime!(2024-02-29 10:00 UTC);
        let end = "1y".parse::<Validity>().unwrap().add_to(start).unwrap();
        assert_eq!(end, datetime!(2025-02-28 10:00 UTC));
        let end = "4y".parse::<Validity>().unwrap().add_to(start).unwrap();
        assert_eq!(end, datetime!(2028-02-29 10:00 UTC));
    }

    #[test]
    fn days_should_add_exactly () {
        let start = datetime!(2023-01-01 0:00 UTC);
        assert_eq!(Validity::days(30).add_to(start), Some(datetime!(2023-01-31 0:00 UTC)));
    }

    #[test]
    fn not_before_should_parse_every_form () {
        assert_eq!("current".parse::<NotBeforeOption>(), Ok(NotBeforeOption::Offset(Duration::ZERO)));
        assert_eq!("+1d".parse::<NotBeforeOption>(), Ok(NotBeforeOption::Offset(Duration::days(1))));
        assert_eq!("-30m".parse::<NotBeforeOption>(), Ok(NotBeforeOption::Offset(Duration::minutes(-30))));
        assert_eq!("midnight".parse::<NotBeforeOption>(), Ok(NotBeforeOption::Midnight(UtcOffset::UTC)));
        assert_eq!("midnight:GMT+8".parse::<NotBeforeOption>(), Ok(NotBeforeOption::Midnight(offset!(+8))));
        assert!("midnight:GMT+13".parse::<NotBeforeOption>().is_err());
        assert!("+1w".parse::<NotBeforeOption>().is_err());
        assert!("tomorrow".parse::<NotBeforeOption>().is_err());
    }

    #[test]
    fn not_before_should_start_from_the_later_instant () {
        let now = datetime!(2023-05-01 12:00 UTC);
        let option = NotBeforeOption::Offset(Duration::hours(1));
        assert_eq!(option.not_before(None, now), datetime!(2023-05-01 13:00 UTC));
        assert_eq!(option.not_before(Some(datetime!(2023-04-01 0:00 UTC)), now), datetime!(2023-05-01 13:00 UTC));
        assert_eq!(option.not_before(Some(datetime!(2023-06-01 0:00 UTC)), now), datetime!(2023-06-01 1:00 UTC));
    }

    #[test]
    fn midnight_should_truncate_in_zone () {
        let now = datetime!(2023-05-01 20:00 UTC);
        let option = NotBeforeOption::Midnight(offset!(+8));
        // 2023-05-02 04:00 at +8, so midnight there is 2023-05-01 16:00 UTC
        assert_eq!(option.not_before(None, now), datetime!(2023-05-01 16:00 UTC));
    }
}
