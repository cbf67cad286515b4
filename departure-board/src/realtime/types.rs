//! Wire types for realtime feeds.
//!
//! GTFS-Realtime TripUpdates arrive in their JSON encoding. Producers differ
//! on field casing (`trip_update` vs `tripUpdate`) and on whether 64-bit
//! timestamps are numbers or strings, so both are accepted.

use serde::{Deserialize, Deserializer};

/// Top-level GTFS-Realtime feed message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedMessage {
    #[serde(default)]
    pub entity: Vec<FeedEntity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedEntity {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "tripUpdate")]
    pub trip_update: Option<TripUpdateDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TripUpdateDto {
    #[serde(default)]
    pub trip: TripDescriptor,
    #[serde(default, alias = "stopTimeUpdate")]
    pub stop_time_update: Vec<StopTimeUpdateDto>,
    /// Trip-level aggregate delay in seconds.
    #[serde(default)]
    pub delay: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripDescriptor {
    #[serde(default, alias = "tripId")]
    pub trip_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StopTimeUpdateDto {
    #[serde(default, alias = "stopSequence")]
    pub stop_sequence: Option<u32>,
    #[serde(default, alias = "stopId")]
    pub stop_id: Option<String>,
    #[serde(default)]
    pub arrival: Option<StopTimeEventDto>,
    #[serde(default)]
    pub departure: Option<StopTimeEventDto>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct StopTimeEventDto {
    #[serde(default)]
    pub delay: Option<i32>,
    /// Absolute POSIX time of the predicted event.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub time: Option<i64>,
}

/// One row of a polling delay feed: a trip and how late it is running.
#[derive(Debug, Clone, Deserialize)]
pub struct TripDelayDto {
    #[serde(alias = "trainno")]
    pub trip_id: String,
    #[serde(alias = "late")]
    pub delay_minutes: i32,
}

/// Accept an integer written either as a JSON number or a string.
fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Str(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Str(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}
