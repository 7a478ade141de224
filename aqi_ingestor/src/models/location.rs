use serde::{Deserialize, Serialize};

/// Latitude/longitude of the monitored site, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `true` when both coordinates are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl Default for GeoPoint {
    /// Monitoring site the pipeline was first deployed for (Punjab, PK).
    fn default() -> Self {
        Self::new(30.746, 73.331)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_site_is_valid() {
        assert!(GeoPoint::default().is_valid());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let res = serde_json::from_str::<GeoPoint>(r#"{"lat": 1.0, "lon": 2.0, "lng": 3.0}"#);
        assert!(res.is_err());
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -180.5).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }
}
