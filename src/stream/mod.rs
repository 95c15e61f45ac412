//! Stream combinators for sounding subscriptions

mod throttle;

pub use throttle::{Throttle, ThrottleExt};
