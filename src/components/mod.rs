pub mod tz_badge;
