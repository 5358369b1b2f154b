//! Recognition and projection of "time structs": nested struct nodes whose
//! members spell out a calendar date/time (`year`, `mon`/`month`, `day`,
//! `hour`, `min`/`minute`, `sec`/`second`), mapped to [`chrono::NaiveDateTime`].
//!
//! A struct qualifies if every member name is one of the recognized keys,
//! `year` and `day` are present, and either `mon` or `month` is present.
//! `hour`/`min`/`sec` are optional and default to zero, matching the
//! container format's calendar-header timestamps.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::error::{RuError, Result};
use crate::schema::Node;

const MONTH_KEYS: [&str; 2] = ["mon", "month"];
const MINUTE_KEYS: [&str; 2] = ["min", "minute"];
const SECOND_KEYS: [&str; 2] = ["sec", "second"];

fn is_recognized_key(name: &str) -> bool {
	matches!(
		name,
		"year" | "mon" | "month" | "day" | "hour" | "min" | "minute" | "sec" | "second"
	)
}

/// Whether `node` is a struct that matches the time-struct shape.
pub fn is_time_struct(node: &Node) -> bool {
	let Ok(members) = node.members() else {
		return false;
	};
	for m in members {
		if !m.name.is_empty() && !is_recognized_key(&m.name) {
			return false;
		}
	}
	let has = |name: &str| members.iter().any(|m| m.name == name);
	has("year") && has("day") && (has("mon") || has("month"))
}

fn first_present<'a>(node: &'a Node, keys: &[&str]) -> Option<&'a Node> {
	keys.iter().find_map(|k| node.member(k).ok())
}

/// Extracts `(year, month, day, hour, minute, second)` from a time struct.
/// Absent `hour`/`min`/`sec` members read as zero.
pub fn get_time_tuple(node: &Node) -> Result<(i32, u32, u32, u32, u32, u32)> {
	if !is_time_struct(node) {
		return Err(RuError::TypeMismatch {
			field: node.name.clone(),
			expected: "time struct",
			found: "non-time struct",
		});
	}
	let year = node.member("year")?.as_int()? as i32;
	let month = first_present(node, &MONTH_KEYS)
		.expect("is_time_struct guarantees mon or month is present")
		.as_int()? as u32;
	let day = node.member("day")?.as_int()? as u32;
	let hour = node.member("hour").ok().map(Node::as_int).transpose()?.unwrap_or(0) as u32;
	let minute = first_present(node, &MINUTE_KEYS).map(Node::as_int).transpose()?.unwrap_or(0) as u32;
	let second = first_present(node, &SECOND_KEYS).map(Node::as_int).transpose()?.unwrap_or(0) as u32;
	Ok((year, month, day, hour, minute, second))
}

/// Projects a time struct to a [`NaiveDateTime`]; fails if the fields do not
/// form a valid calendar date/time (e.g. `month = 13`, a `year` outside the
/// range `chrono` supports, or `year < 1`, which the proleptic calendar this
/// type represents does not admit).
pub fn get_time(node: &Node) -> Result<NaiveDateTime> {
	let (year, month, day, hour, minute, second) = get_time_tuple(node)?;
	if year < 1 {
		return Err(RuError::InvalidDateTime {
			struct_name: node.name.clone(),
			reason: format!("year {year} is out of range (must be >= 1)").into(),
		});
	}
	let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| RuError::InvalidDateTime {
		struct_name: node.name.clone(),
		reason: format!("{year:04}-{month:02}-{day:02} is not a valid calendar date").into(),
	})?;
	date.and_hms_opt(hour, minute, second)
		.ok_or_else(|| RuError::InvalidDateTime {
			struct_name: node.name.clone(),
			reason: format!("{hour:02}:{minute:02}:{second:02} is not a valid time of day").into(),
		})
}

/// Writes a [`NaiveDateTime`] back into a time struct's members. Members
/// absent from the struct (commonly `hour`/`min`/`sec` in date-only structs)
/// are silently skipped.
pub fn set_time(node: &mut Node, value: NaiveDateTime) -> Result<()> {
	if !is_time_struct(node) {
		return Err(RuError::TypeMismatch {
			field: node.name.clone(),
			expected: "time struct",
			found: "non-time struct",
		});
	}
	node.member_mut("year")?.set_int(value.year() as i64)?;
	if let Ok(m) = node.member_mut("mon") {
		m.set_int(value.month() as i64)?;
	} else if let Ok(m) = node.member_mut("month") {
		m.set_int(value.month() as i64)?;
	}
	node.member_mut("day")?.set_int(value.day() as i64)?;
	if let Ok(m) = node.member_mut("hour") {
		m.set_int(value.hour() as i64)?;
	}
	if let Ok(m) = node.member_mut("min") {
		m.set_int(value.minute() as i64)?;
	} else if let Ok(m) = node.member_mut("minute") {
		m.set_int(value.minute() as i64)?;
	}
	if let Ok(m) = node.member_mut("sec") {
		m.set_int(value.second() as i64)?;
	} else if let Ok(m) = node.member_mut("second") {
		m.set_int(value.second() as i64)?;
	}
	Ok(())
}

/// Formats a time-struct value the way the container header formats
/// `created`/`announced`: `"YYYY/MM/DD HH:MM:SS GMT"`.
pub fn format_time_tuple(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> String {
	format!("{year:04}/{month:02}/{day:02} {hour:02}:{minute:02}:{second:02} GMT")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schema::{Node, ScalarKind};

	fn time_struct(with_time_of_day: bool) -> Node {
		let mut members = vec![
			Node::new_scalar("year", ScalarKind::Uint16),
			Node::new_scalar("mon", ScalarKind::Uint8),
			Node::new_scalar("day", ScalarKind::Uint8),
		];
		if with_time_of_day {
			members.push(Node::new_scalar("hour", ScalarKind::Uint8));
			members.push(Node::new_scalar("min", ScalarKind::Uint8));
			members.push(Node::new_scalar("sec", ScalarKind::Uint8));
		}
		Node::new_struct("ts", members).unwrap()
	}

	#[test]
	fn recognizes_date_only_struct() {
		let node = time_struct(false);
		assert!(is_time_struct(&node));
	}

	#[test]
	fn recognizes_full_datetime_struct() {
		let node = time_struct(true);
		assert!(is_time_struct(&node));
	}

	#[test]
	fn rejects_struct_with_unrelated_member() {
		let node = Node::new_struct(
			"ts",
			vec![Node::new_scalar("year", ScalarKind::Uint16), Node::new_scalar("flavor", ScalarKind::Uint8)],
		)
		.unwrap();
		assert!(!is_time_struct(&node));
	}

	#[test]
	fn get_time_defaults_absent_time_of_day_to_zero() {
		let mut node = time_struct(false);
		node.member_mut("year").unwrap().set_int(2024).unwrap();
		node.member_mut("mon").unwrap().set_int(3).unwrap();
		node.member_mut("day").unwrap().set_int(14).unwrap();
		let dt = get_time(&node).unwrap();
		assert_eq!(dt.hour(), 0);
		assert_eq!(dt.minute(), 0);
	}

	#[test]
	fn get_time_rejects_invalid_calendar_date() {
		let mut node = time_struct(false);
		node.member_mut("year").unwrap().set_int(2024).unwrap();
		node.member_mut("mon").unwrap().set_int(13).unwrap();
		node.member_mut("day").unwrap().set_int(1).unwrap();
		let err = get_time(&node).unwrap_err();
		assert!(matches!(err, RuError::InvalidDateTime { .. }));
	}

	#[test]
	fn get_time_rejects_year_zero() {
		let mut node = time_struct(false);
		node.member_mut("year").unwrap().set_int(0).unwrap();
		node.member_mut("mon").unwrap().set_int(1).unwrap();
		node.member_mut("day").unwrap().set_int(1).unwrap();
		let err = get_time(&node).unwrap_err();
		assert!(matches!(err, RuError::InvalidDateTime { .. }));
		// the raw tuple accessor stays infallible for the same input
		assert_eq!(get_time_tuple(&node).unwrap().0, 0);
	}

	#[test]
	fn set_time_round_trips() {
		let mut node = time_struct(true);
		let dt = NaiveDate::from_ymd_opt(2023, 11, 5)
			.unwrap()
			.and_hms_opt(9, 30, 1)
			.unwrap();
		set_time(&mut node, dt).unwrap();
		assert_eq!(get_time(&node).unwrap(), dt);
	}
}
