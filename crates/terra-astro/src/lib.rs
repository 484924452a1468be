//! Sun geometry from wall-clock time.
//!
//! Computes the solar declination and hour angle that drive the globe's
//! day/night terminator and the position of the sun marker. Both values are
//! recomputed every frame from the current local time and the configured
//! timezone offset; the configured longitude is applied separately as a
//! static rotation at render time.

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike};

/// Earth's axial tilt in degrees. Bounds the declination.
pub const AXIAL_TILT_DEG: f32 = 23.44;

/// Degrees of rotation per hour of hour angle (360° / 24 h).
pub const DEGREES_PER_HOUR: f32 = 15.0;

/// A wall-clock instant decomposed in the system's local calendar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalInstant {
    /// Day of the year, 0-based (January 1st = 0).
    pub day_of_year: u32,
    /// Hour of the day in local time, 0–23.
    pub hour: u32,
    /// Minute of the hour, 0–59.
    pub minute: u32,
    /// Hours currently added by daylight saving time (usually 0.0 or 1.0).
    pub dst_offset_hours: f32,
}

impl LocalInstant {
    /// Decompose the current system time.
    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    /// Decompose an arbitrary local datetime.
    pub fn from_datetime(datetime: &DateTime<Local>) -> Self {
        Self {
            day_of_year: datetime.ordinal0(),
            hour: datetime.hour(),
            minute: datetime.minute(),
            dst_offset_hours: dst_offset_hours(datetime),
        }
    }

    /// Build an instant from raw parts. Intended for tests and simulations.
    pub fn from_parts(day_of_year: u32, hour: u32, minute: u32, dst_offset_hours: f32) -> Self {
        Self {
            day_of_year,
            hour,
            minute,
            dst_offset_hours,
        }
    }
}

/// Hours added by daylight saving time at `datetime`.
///
/// Derived by comparing the current UTC offset against the year's standard
/// offset. The standard offset is the smaller of the January and July
/// offsets, which holds in both hemispheres.
fn dst_offset_hours(datetime: &DateTime<Local>) -> f32 {
    let year = datetime.year();
    let jan = Local.with_ymd_and_hms(year, 1, 1, 12, 0, 0).single();
    let jul = Local.with_ymd_and_hms(year, 7, 1, 12, 0, 0).single();
    let (Some(jan), Some(jul)) = (jan, jul) else {
        return 0.0;
    };

    let standard = jan
        .offset()
        .local_minus_utc()
        .min(jul.offset().local_minus_utc());
    let current = datetime.offset().local_minus_utc();
    (current - standard) as f32 / 3600.0
}

/// Sun position relative to the globe for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolarPosition {
    /// Angular offset of the sun from the celestial equator, in degrees.
    /// Always within ±[`AXIAL_TILT_DEG`].
    pub declination_deg: f32,
    /// Angular position relative to local solar noon, in hours. Multiply by
    /// [`DEGREES_PER_HOUR`] when rotating; the value is not normalized, so
    /// consumers apply rotation modulo 360° themselves.
    pub hour_angle_hours: f32,
}

/// Compute the sun's position for the given instant and configured timezone.
///
/// The declination uses the flat-cosine approximation
/// `23.44° × cos(2π/365 × (day_of_year + 10))`. The "+10" aligns the cosine
/// peak with the solstice offset from 0-based day-of-year indexing; leap-year
/// drift and orbital eccentricity are ignored. The hour angle is
/// `hour − (tz + dst) + minute/60`, with hour and minute taken from the
/// local calendar decomposition.
pub fn solar_position(instant: &LocalInstant, timezone_offset_hours: f32) -> SolarPosition {
    let declination_deg = AXIAL_TILT_DEG
        * ((std::f32::consts::TAU / 365.0) * (instant.day_of_year as f32 + 10.0)).cos();
    let hour_angle_hours = instant.hour as f32
        - (timezone_offset_hours + instant.dst_offset_hours)
        + instant.minute as f32 / 60.0;

    SolarPosition {
        declination_deg,
        hour_angle_hours,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declination_for_day(day: u32) -> f32 {
        solar_position(&LocalInstant::from_parts(day, 12, 0, 0.0), 0.0).declination_deg
    }

    #[test]
    fn test_declination_stays_within_axial_tilt() {
        for day in 0..365 {
            let dec = declination_for_day(day);
            assert!(
                dec.abs() <= AXIAL_TILT_DEG + 1e-4,
                "Day {day}: declination {dec} exceeds axial tilt bound"
            );
        }
    }

    #[test]
    fn test_declination_peak_matches_offset_constant() {
        // The shifted cosine peaks where day + 10 wraps a full period,
        // i.e. near day 355.
        let mut best_day = 0;
        let mut best = f32::MIN;
        for day in 0..365 {
            let dec = declination_for_day(day);
            if dec > best {
                best = dec;
                best_day = day;
            }
        }

        assert!(
            (best - AXIAL_TILT_DEG).abs() < 0.01,
            "Peak declination {best} should be close to +{AXIAL_TILT_DEG}"
        );
        assert!(
            (best_day as i32 - 355).abs() <= 1,
            "Peak should land near day 355, got day {best_day}"
        );
    }

    #[test]
    fn test_hour_angle_is_linear_in_local_time() {
        let tz = 2.0;
        let dst = 1.0;
        for hour in 0..24 {
            for minute in [0, 15, 30, 59] {
                let instant = LocalInstant::from_parts(100, hour, minute, dst);
                let got = solar_position(&instant, tz).hour_angle_hours;
                let expected = hour as f32 - (tz + dst) + minute as f32 / 60.0;
                assert!(
                    (got - expected).abs() < 1e-5,
                    "hour={hour} minute={minute}: got {got}, expected {expected}"
                );
            }
        }
    }

    #[test]
    fn test_hour_angle_continuity_across_an_hour() {
        let before = solar_position(&LocalInstant::from_parts(40, 9, 59, 0.0), 0.0);
        let after = solar_position(&LocalInstant::from_parts(40, 10, 0, 0.0), 0.0);
        let step = after.hour_angle_hours - before.hour_angle_hours;
        assert!(
            (step - 1.0 / 60.0).abs() < 1e-5,
            "Minute rollover should advance the hour angle by 1/60 h, got {step}"
        );
    }

    #[test]
    fn test_summer_solstice_scenario() {
        // lat=48, lon=2, tz=1, no DST, local noon on day-of-year 172.
        let instant = LocalInstant::from_parts(172, 12, 0, 0.0);
        let solar = solar_position(&instant, 1.0);

        assert!(
            (solar.hour_angle_hours - 11.0).abs() < 1e-5,
            "Noon with tz=1 should give hour angle 11, got {}",
            solar.hour_angle_hours
        );

        // Assert against the same formula, not an ephemeris.
        let expected = AXIAL_TILT_DEG * ((std::f32::consts::TAU / 365.0) * 182.0).cos();
        assert!(
            (solar.declination_deg - expected).abs() < 1e-4,
            "Declination {} should match the formula value {expected}",
            solar.declination_deg
        );
        assert!(
            solar.declination_deg.abs() > AXIAL_TILT_DEG - 0.01,
            "Solstice declination should sit near the formula's extreme"
        );
    }

    #[test]
    fn test_dst_shifts_hour_angle_back() {
        let without = solar_position(&LocalInstant::from_parts(200, 14, 0, 0.0), 1.0);
        let with = solar_position(&LocalInstant::from_parts(200, 14, 0, 1.0), 1.0);
        assert!(
            (without.hour_angle_hours - with.hour_angle_hours - 1.0).abs() < 1e-5,
            "One hour of DST should reduce the hour angle by exactly one hour"
        );
    }

    #[test]
    fn test_now_produces_plausible_fields() {
        let instant = LocalInstant::now();
        assert!(instant.day_of_year < 366);
        assert!(instant.hour < 24);
        assert!(instant.minute < 60);
        assert!(
            instant.dst_offset_hours.abs() <= 2.0,
            "DST offset should be a small number of hours, got {}",
            instant.dst_offset_hours
        );
    }
}
