//! Speed estimation over a trailing window of fixes.

mod window;

pub use window::{SpeedSample, SpeedWindowCache, SpeedWindowError, DEFAULT_WINDOW_PERIOD};
