//! Serde helpers for the `HH:MM` time-of-day wire format
//!
//! The API exchanges times as `"19:30"`. A time that carries seconds is
//! written as `"19:30:45"` instead so nothing is lost on a round trip.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serializer};

pub const TIME_FORMAT: &str = "%H:%M";

const TIME_FORMAT_SECONDS: &str = "%H:%M:%S%.f";

/// 解析时间字符串 (HH:MM 或 HH:MM:SS)
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, TIME_FORMAT_SECONDS))
        .ok()
}

pub fn format_time(time: &NaiveTime) -> String {
    if time.second() == 0 && time.nanosecond() == 0 {
        time.format(TIME_FORMAT).to_string()
    } else {
        time.format(TIME_FORMAT_SECONDS).to_string()
    }
}

pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_time(time))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_time(&raw).ok_or_else(|| serde::de::Error::custom(format!("Invalid time: {}", raw)))
}

/// Same format for `Option<NaiveTime>` fields
pub mod option {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.serialize_some(&super::format_time(t)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) => super::parse_time(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("Invalid time: {}", s))),
        }
    }
}
