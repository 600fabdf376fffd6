//! Coordinates for gym locations and the "near me" search. Distances are
//! computed by PostGIS, see `db::gyms::near`.

/// Search radius of the proximity query, in metres.
pub const NEAR_RADIUS_M: f64 = 10_000.0;

/// Maximum number of gyms the proximity query returns.
pub const NEAR_LIMIT: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub lng: f64,
    pub lat: f64,
}

impl Point {
    pub fn new(lng: f64, lat: f64) -> Result<Self, String> {
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err("Longitude must be between -180 and 180".to_string());
        }
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err("Latitude must be between -90 and 90".to_string());
        }
        Ok(Self { lng, lat })
    }

    /// Parse the raw form/query strings.
    pub fn parse(lng: &str, lat: &str) -> Result<Self, String> {
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| "You must supply coordinates!".to_string())?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| "You must supply coordinates!".to_string())?;
        Self::new(lng, lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lng: f64, lat: f64) -> Point {
        Point::new(lng, lat).unwrap()
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        assert!(Point::new(181.0, 0.0).is_err());
        assert!(Point::new(0.0, -90.5).is_err());
        assert!(Point::new(f64::NAN, 0.0).is_err());
        assert!(Point::parse("abc", "1").is_err());
        assert_eq!(Point::parse(" -79.4 ", "43.7").unwrap(), p(-79.4, 43.7));
    }
}
