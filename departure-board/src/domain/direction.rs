//! Trip direction.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned for a direction value other than 0 or 1.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid direction {0}: must be 0 or 1")]
pub struct InvalidDirection(pub u8);

/// GTFS `direction_id`: one of two opposite travel directions on a route.
///
/// The meaning of each value is agency specific; it only orders and filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Direction {
    Outbound = 0,
    Inbound = 1,
}

impl Direction {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Direction {
    type Error = InvalidDirection;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Direction::Outbound),
            1 => Ok(Direction::Inbound),
            other => Err(InvalidDirection(other)),
        }
    }
}

impl From<Direction> for u8 {
    fn from(value: Direction) -> Self {
        value.as_u8()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_u8() {
        assert_eq!(Direction::try_from(0), Ok(Direction::Outbound));
        assert_eq!(Direction::try_from(1), Ok(Direction::Inbound));
        assert_eq!(Direction::try_from(2), Err(InvalidDirection(2)));
    }

    #[test]
    fn outbound_sorts_first() {
        assert!(Direction::Outbound < Direction::Inbound);
    }

    #[test]
    fn serde_as_number() {
        let d: Direction = serde_json::from_str("1").unwrap();
        assert_eq!(d, Direction::Inbound);
        assert_eq!(serde_json::to_string(&Direction::Outbound).unwrap(), "0");
        assert!(serde_json::from_str::<Direction>("3").is_err());
    }
}
