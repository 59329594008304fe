//! Day/night classification from the NOAA solar-position approximation.

use std::f64::consts::PI;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use serde::Serialize;

/// Apparent sunrise/sunset: the sun's upper limb on the horizon after refraction.
const HORIZON_ELEVATION_DEG: f64 = -0.833;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SunTimes {
    Regular {
        sunrise: DateTime<Utc>,
        sunset: DateTime<Utc>,
    },
    PolarDay,
    PolarNight,
}

struct SolarTerms {
    equation_of_time_min: f64,
    declination_rad: f64,
}

fn solar_terms(day_of_year: u32, hour_utc: f64, days_in_year: f64) -> SolarTerms {
    let gamma = 2.0 * PI / days_in_year * (day_of_year as f64 - 1.0 + (hour_utc - 12.0) / 24.0);
    let equation_of_time_min = 229.18
        * (0.000075 + 0.001868 * gamma.cos()
            - 0.032077 * gamma.sin()
            - 0.014615 * (2.0 * gamma).cos()
            - 0.040849 * (2.0 * gamma).sin());
    let declination_rad = 0.006918 - 0.399912 * gamma.cos() + 0.070257 * gamma.sin()
        - 0.006758 * (2.0 * gamma).cos()
        + 0.000907 * (2.0 * gamma).sin()
        - 0.002697 * (3.0 * gamma).cos()
        + 0.00148 * (3.0 * gamma).sin();

    SolarTerms {
        equation_of_time_min,
        declination_rad,
    }
}

fn days_in_year(year: i32) -> f64 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366.0
    } else {
        365.0
    }
}

/// Sun elevation above the horizon in degrees.
pub fn solar_elevation_deg(timestamp: DateTime<Utc>, lat: f64, lon: f64) -> f64 {
    let minutes = timestamp.hour() as f64 * 60.0
        + timestamp.minute() as f64
        + timestamp.second() as f64 / 60.0;
    let terms = solar_terms(
        timestamp.ordinal(),
        minutes / 60.0,
        days_in_year(timestamp.year()),
    );

    let true_solar_time = minutes + terms.equation_of_time_min + 4.0 * lon;
    let hour_angle = (true_solar_time / 4.0 - 180.0).to_radians();
    let lat_rad = lat.to_radians();

    let cos_zenith = lat_rad.sin() * terms.declination_rad.sin()
        + lat_rad.cos() * terms.declination_rad.cos() * hour_angle.cos();
    90.0 - cos_zenith.clamp(-1.0, 1.0).acos().to_degrees()
}

pub fn is_night(timestamp: DateTime<Utc>, lat: f64, lon: f64) -> bool {
    solar_elevation_deg(timestamp, lat, lon) < HORIZON_ELEVATION_DEG
}

/// Sunrise and sunset around solar noon of `date` at the given longitude.
pub fn sun_times(date: NaiveDate, lat: f64, lon: f64) -> SunTimes {
    let terms = solar_terms(date.ordinal(), 12.0, days_in_year(date.year()));
    let lat_rad = lat.to_radians();
    let cos_hour_angle = (90.0 - HORIZON_ELEVATION_DEG).to_radians().cos()
        / (lat_rad.cos() * terms.declination_rad.cos())
        - lat_rad.tan() * terms.declination_rad.tan();

    if cos_hour_angle < -1.0 {
        return SunTimes::PolarDay;
    }
    if cos_hour_angle > 1.0 {
        return SunTimes::PolarNight;
    }

    let hour_angle_deg = cos_hour_angle.acos().to_degrees();
    let sunrise_min = 720.0 - 4.0 * (lon + hour_angle_deg) - terms.equation_of_time_min;
    let sunset_min = 720.0 - 4.0 * (lon - hour_angle_deg) - terms.equation_of_time_min;
    let midnight = date.and_time(chrono::NaiveTime::MIN).and_utc();

    SunTimes::Regular {
        sunrise: midnight + Duration::seconds((sunrise_min * 60.0).round() as i64),
        sunset: midnight + Duration::seconds((sunset_min * 60.0).round() as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const HUNTINGTON_LAT: f64 = 33.655;
    const HUNTINGTON_LON: f64 = -118.0;

    #[test]
    fn midday_is_day_and_midnight_is_night() {
        // 13:00 and 01:00 PDT
        let afternoon = Utc.with_ymd_and_hms(2026, 6, 21, 20, 0, 0).unwrap();
        let small_hours = Utc.with_ymd_and_hms(2026, 6, 21, 8, 0, 0).unwrap();
        assert!(!is_night(afternoon, HUNTINGTON_LAT, HUNTINGTON_LON));
        assert!(is_night(small_hours, HUNTINGTON_LAT, HUNTINGTON_LON));
    }

    #[test]
    fn summer_sunrise_lands_near_five_forty_local() {
        let date = NaiveDate::from_ymd_opt(2026, 6, 21).unwrap();
        match sun_times(date, HUNTINGTON_LAT, HUNTINGTON_LON) {
            SunTimes::Regular { sunrise, sunset } => {
                let earliest = Utc.with_ymd_and_hms(2026, 6, 21, 12, 20, 0).unwrap();
                let latest = Utc.with_ymd_and_hms(2026, 6, 21, 13, 5, 0).unwrap();
                assert!(sunrise > earliest && sunrise < latest, "sunrise {sunrise}");
                let day_length = sunset - sunrise;
                assert!(day_length > Duration::hours(14) && day_length < Duration::hours(15));
            }
            other => panic!("expected regular sun times, got {other:?}"),
        }
    }

    #[test]
    fn sun_times_agree_with_is_night() {
        let date = NaiveDate::from_ymd_opt(2026, 12, 1).unwrap();
        let SunTimes::Regular { sunrise, sunset } = sun_times(date, HUNTINGTON_LAT, HUNTINGTON_LON)
        else {
            panic!("expected regular sun times");
        };
        assert!(is_night(sunrise - Duration::minutes(10), HUNTINGTON_LAT, HUNTINGTON_LON));
        assert!(!is_night(sunrise + Duration::minutes(10), HUNTINGTON_LAT, HUNTINGTON_LON));
        assert!(!is_night(sunset - Duration::minutes(10), HUNTINGTON_LAT, HUNTINGTON_LON));
        assert!(is_night(sunset + Duration::minutes(10), HUNTINGTON_LAT, HUNTINGTON_LON));
    }

    #[test]
    fn high_latitude_summer_has_no_sunset() {
        let date = NaiveDate::from_ymd_opt(2026, 6, 21).unwrap();
        assert_eq!(sun_times(date, 80.0, 15.0), SunTimes::PolarDay);
        let date = NaiveDate::from_ymd_opt(2026, 12, 21).unwrap();
        assert_eq!(sun_times(date, 80.0, 15.0), SunTimes::PolarNight);
    }
}
