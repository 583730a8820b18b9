/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Parsing and formatting of the timestamps that appear in request and response headers.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::time::SystemTime;

const ISO_8601_BASIC: &str = "%Y%m%dT%H%M%SZ";
const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Timestamp formats understood by this module.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    /// RFC 7231 IMF-fixdate, e.g. `Sat, 01 Jun 2019 00:00:00 GMT`. Parsing also accepts any
    /// RFC 2822 date.
    HttpDate,
    /// ISO-8601 basic format, e.g. `20190601T000000Z`.
    Iso8601Basic,
}

impl Format {
    fn name(self) -> &'static str {
        match self {
            Format::HttpDate => "http-date",
            Format::Iso8601Basic => "iso-8601 basic",
        }
    }
}

/// A timestamp could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("`{input}` is not a valid {} timestamp", .format.name())]
pub struct DateTimeParseError {
    input: String,
    format: Format,
}

impl DateTimeParseError {
    fn new(input: &str, format: Format) -> Self {
        Self {
            input: input.to_owned(),
            format,
        }
    }
}

/// Parses `input` in the given `format`.
pub fn parse(input: &str, format: Format) -> Result<SystemTime, DateTimeParseError> {
    let input = input.trim();
    match format {
        Format::HttpDate => DateTime::parse_from_rfc2822(input)
            .map(SystemTime::from)
            .or_else(|_| parse_naive(input, IMF_FIXDATE))
            .map_err(|_| DateTimeParseError::new(input, format)),
        Format::Iso8601Basic => {
            parse_naive(input, ISO_8601_BASIC).map_err(|_| DateTimeParseError::new(input, format))
        }
    }
}

fn parse_naive(input: &str, pattern: &str) -> Result<SystemTime, chrono::ParseError> {
    let naive = NaiveDateTime::parse_from_str(input, pattern)?;
    Ok(Utc.from_utc_datetime(&naive).into())
}

/// Formats `time` in the given `format`. Sub-second precision is truncated.
pub fn format(time: SystemTime, format: Format) -> String {
    let time = DateTime::<Utc>::from(time);
    match format {
        Format::HttpDate => time.format(IMF_FIXDATE).to_string(),
        Format::Iso8601Basic => time.format(ISO_8601_BASIC).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{format, parse, Format};
    use pretty_assertions::assert_eq;
    use std::time::{Duration, UNIX_EPOCH};

    // 2019-06-01T00:00:00Z
    const JUNE_FIRST: u64 = 1559347200;

    #[test]
    fn parse_imf_fixdate() {
        assert_eq!(
            UNIX_EPOCH + Duration::from_secs(JUNE_FIRST),
            parse("Sat, 01 Jun 2019 00:00:00 GMT", Format::HttpDate).unwrap()
        );
    }

    #[test]
    fn parse_rfc2822_with_offset() {
        assert_eq!(
            UNIX_EPOCH + Duration::from_secs(JUNE_FIRST),
            parse("Sat, 01 Jun 2019 02:00:00 +0200", Format::HttpDate).unwrap()
        );
    }

    #[test]
    fn iso8601_basic_round_trips_through_headers() {
        let time = UNIX_EPOCH + Duration::from_secs(JUNE_FIRST + 30);
        let formatted = format(time, Format::Iso8601Basic);
        assert_eq!("20190601T000030Z", formatted);
        assert_eq!(time, parse(&formatted, Format::Iso8601Basic).unwrap());
    }

    #[test]
    fn format_truncates_subseconds() {
        let time = UNIX_EPOCH + Duration::from_millis(JUNE_FIRST * 1000 + 999);
        assert_eq!(
            "Sat, 01 Jun 2019 00:00:00 GMT",
            format(time, Format::HttpDate)
        );
    }

    #[test]
    fn garbage_is_rejected() {
        let err = parse("yesterday", Format::HttpDate).expect_err("not a date");
        assert_eq!("`yesterday` is not a valid http-date timestamp", err.to_string());
        assert!(parse("2019-06-01", Format::Iso8601Basic).is_err());
    }
}
