//! Domain types for the departure board.
//!
//! Value types validate on construction; schedule records are carried as the
//! store returns them and checked when a departure is assembled.

mod clock;
mod delay;
mod departure;
mod direction;
mod error;
mod query;
mod schedule;

pub use clock::{ClockTime, TimeError};
pub use delay::{Delay, DelaySource, RealtimeUpdate};
pub use departure::{DedupKey, DepartureEvent};
pub use direction::{Direction, InvalidDirection};
pub use error::RecordError;
pub use query::{Query, ResolvedQuery};
pub use schedule::{Calendar, RouteRef, StopRef, StopTime, Trip};
