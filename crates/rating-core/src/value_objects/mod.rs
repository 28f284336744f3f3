//! Value objects

mod actor;
mod snowflake;
mod stars;

pub use actor::ActorId;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
pub use stars::{RatingCurve, Stars};
