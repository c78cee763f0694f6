use std::ops::{Add, AddAssign, Sub, SubAssign};

use chrono::{Datelike, Local, Timelike, Weekday};

/// Seconds since local service-day midnight. GTFS times frequently exceed
/// 86_400 (a trip scheduled past midnight keeps counting up), so this is a
/// plain counter rather than a wall-clock time of day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Time(u32);

impl From<u32> for Time {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Sub<Time> for Time {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        Duration(self.0.saturating_sub(rhs.0))
    }
}

impl Add<Duration> for Time {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign<Duration> for Time {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs.0
    }
}

impl Time {
    /// Current time-of-day and weekday, derived from the host wall clock.
    pub fn now_local() -> (Self, Weekday) {
        let now = Local::now();
        (Self(now.num_seconds_from_midnight()), now.weekday())
    }

    pub const fn from_seconds(secs: u32) -> Self {
        Self(secs)
    }

    pub const fn as_seconds(&self) -> u32 {
        self.0
    }

    pub fn to_hms_string(&self) -> String {
        let h = self.0 / 3600;
        let m = (self.0 % 3600) / 60;
        let s = self.0 % 60;
        format!("{:02}:{:02}:{:02}", h, m, s)
    }

    pub fn from_hms(time: &str) -> Option<Self> {
        const HOUR_TO_SEC: u32 = 60 * 60;
        const MINUTE_TO_SEC: u32 = 60;
        let mut split = time.trim().split(':');
        let hours: u32 = split.next()?.parse().ok()?;
        let minutes: u32 = split.next()?.parse().ok()?;
        let seconds: u32 = split.next()?.parse().ok()?;
        if split.next().is_some() {
            return None;
        }
        Some(Self(hours * HOUR_TO_SEC + minutes * MINUTE_TO_SEC + seconds))
    }
}

/// A span of seconds. Separate type from [`Time`] so "5 minutes" and
/// "departs at 00:05:00" can't be confused at the type level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration(u32);

impl From<u32> for Duration {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Duration {
    pub const fn from_seconds(secs: u32) -> Self {
        Self(secs)
    }

    pub const fn from_minutes(minutes: u32) -> Self {
        Self(minutes * 60)
    }

    pub const fn as_seconds(&self) -> u32 {
        self.0
    }

    pub const fn as_minutes_floor(&self) -> u32 {
        self.0 / 60
    }

    pub const fn as_minutes_ceil(&self) -> u32 {
        self.0.div_ceil(60)
    }
}

impl Sub for Duration {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Duration {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_unparse_midnight() {
        let time = "00:00:00";
        let stime = Time::from_hms(time).unwrap();
        assert_eq!(time, stime.to_hms_string())
    }

    #[test]
    fn parse_unparse_noon() {
        let time = "12:00:00";
        let stime = Time::from_hms(time).unwrap();
        assert_eq!(time, stime.to_hms_string())
    }

    #[test]
    fn parses_times_past_midnight() {
        assert_eq!(Time::from_hms("25:30:00").unwrap().as_seconds(), 91800);
    }

    #[test]
    fn valid_time_seconds() {
        assert_eq!(Time::from_hms("00:01:30").unwrap().as_seconds(), 90);
        assert_eq!(Time::from_hms("01:01:30").unwrap().as_seconds(), 3690);
    }

    #[test]
    fn invalid_time_rejected() {
        assert!(Time::from_hms("00:00:0a").is_none());
        assert!(Time::from_hms("00:00").is_none());
    }

    #[test]
    fn duration_ceil_rounds_up() {
        assert_eq!(Duration::from_seconds(61).as_minutes_ceil(), 2);
        assert_eq!(Duration::from_seconds(60).as_minutes_ceil(), 1);
    }
}
