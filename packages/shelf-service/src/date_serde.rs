//! `YYYY-MM-DD` calendar dates.

use serde::{Deserialize, Deserializer, Serializer};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn serialize<S>(value: &Date, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	serializer.collect_str(value)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = String::deserialize(deserializer)?;

	parse(&raw).map_err(serde::de::Error::custom)
}

pub fn parse(raw: &str) -> Result<Date, time::error::Parse> {
	Date::parse(raw.trim(), ISO_DATE)
}

#[cfg(test)]
mod tests {
	use time::macros::date;

	use super::*;

	#[test]
	fn parses_iso_dates() {
		assert_eq!(parse("2021-06-10").expect("parse failed"), date!(2021 - 06 - 10));
		assert!(parse("10.06.2021").is_err());
	}

	#[test]
	fn display_matches_parse_format() {
		let value = date!(2020 - 01 - 02);

		assert_eq!(parse(&value.to_string()).expect("parse failed"), value);
	}
}
