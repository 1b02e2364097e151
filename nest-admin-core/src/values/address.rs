use super::check_length;
use crate::{Combine, Failure, Outcome, ValidationErrors};
use serde::{Deserialize, Serialize};

const MICRO: f64 = 1_000_000.0;

/// Geographic position stored at six decimal places.
///
/// Both axes are kept as integer micro-degrees, so two coordinates that
/// round to the same sixth decimal are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Coordinates {
    lat_e6: i64,
    lon_e6: i64,
}

impl Coordinates {
    pub fn create(latitude: f64, longitude: f64) -> Outcome<Self> {
        let mut errors = ValidationErrors::new();
        errors.ensure(
            latitude.is_finite() && (-90.0..=90.0).contains(&latitude),
            "Coordinates.LatitudeOutOfRange",
            "Latitude must be between -90 and 90",
        );
        errors.ensure(
            longitude.is_finite() && (-180.0..=180.0).contains(&longitude),
            "Coordinates.LongitudeOutOfRange",
            "Longitude must be between -180 and 180",
        );
        errors.finish(|| Self {
            lat_e6: (latitude * MICRO).round() as i64,
            lon_e6: (longitude * MICRO).round() as i64,
        })
    }

    /// Rebuild from stored micro-degrees
    pub fn from_micro_degrees(lat_e6: i64, lon_e6: i64) -> Outcome<Self> {
        if lat_e6.abs() > 90_000_000 || lon_e6.abs() > 180_000_000 {
            return Err(Failure::validation(
                "Coordinates.OutOfRange",
                format!("({lat_e6}, {lon_e6}) micro-degrees is outside the globe"),
            ));
        }
        Ok(Self { lat_e6, lon_e6 })
    }

    pub fn latitude(&self) -> f64 {
        self.lat_e6 as f64 / MICRO
    }

    pub fn longitude(&self) -> f64 {
        self.lon_e6 as f64 / MICRO
    }

    pub fn lat_e6(&self) -> i64 {
        self.lat_e6
    }

    pub fn lon_e6(&self) -> i64 {
        self.lon_e6
    }
}

/// Raw address input, as received from a caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressFields {
    pub address_line: String,
    pub municipality: String,
    pub city: String,
    pub province: String,
    pub region: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Partial address update; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressPatch {
    pub address_line: Option<String>,
    pub municipality: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl AddressPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Postal address with its position
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Address {
    address_line: String,
    municipality: String,
    city: String,
    province: String,
    region: String,
    country: String,
    coordinates: Coordinates,
}

fn address_part(errors: &mut ValidationErrors, code: &str, label: &str, value: &str) -> String {
    let value = value.trim();
    check_length(errors, code, label, value, 1, 100);
    value.to_string()
}

impl Address {
    pub fn create(fields: AddressFields) -> Outcome<Self> {
        let mut errors = ValidationErrors::new();
        let address_line = address_part(&mut errors, "Address.AddressLine", "Address line", &fields.address_line);
        let municipality = address_part(&mut errors, "Address.Municipality", "Municipality", &fields.municipality);
        let city = address_part(&mut errors, "Address.City", "City", &fields.city);
        let province = address_part(&mut errors, "Address.Province", "Province", &fields.province);
        let region = address_part(&mut errors, "Address.Region", "Region", &fields.region);
        let country = address_part(&mut errors, "Address.Country", "Country", &fields.country);
        let text = errors.finish(|| (address_line, municipality, city, province, region, country));

        let ((address_line, municipality, city, province, region, country), coordinates) =
            (text, Coordinates::create(fields.latitude, fields.longitude)).combine()?;

        Ok(Self {
            address_line,
            municipality,
            city,
            province,
            region,
            country,
            coordinates,
        })
    }

    /// Current values as raw input
    pub fn to_fields(&self) -> AddressFields {
        AddressFields {
            address_line: self.address_line.clone(),
            municipality: self.municipality.clone(),
            city: self.city.clone(),
            province: self.province.clone(),
            region: self.region.clone(),
            country: self.country.clone(),
            latitude: self.coordinates.latitude(),
            longitude: self.coordinates.longitude(),
        }
    }

    /// Apply a partial update and validate the result
    pub fn with_patch(&self, patch: AddressPatch) -> Outcome<Self> {
        let current = self.to_fields();
        Self::create(AddressFields {
            address_line: patch.address_line.unwrap_or(current.address_line),
            municipality: patch.municipality.unwrap_or(current.municipality),
            city: patch.city.unwrap_or(current.city),
            province: patch.province.unwrap_or(current.province),
            region: patch.region.unwrap_or(current.region),
            country: patch.country.unwrap_or(current.country),
            latitude: patch.latitude.unwrap_or(current.latitude),
            longitude: patch.longitude.unwrap_or(current.longitude),
        })
    }

    pub fn with_coordinates(&self, latitude: f64, longitude: f64) -> Outcome<Self> {
        self.with_patch(AddressPatch {
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..AddressPatch::default()
        })
    }

    pub fn address_line(&self) -> &str {
        &self.address_line
    }

    pub fn municipality(&self) -> &str {
        &self.municipality
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn province(&self) -> &str {
        &self.province
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fields() -> AddressFields {
        AddressFields {
            address_line: "12 Rizal Street".into(),
            municipality: "San Juan".into(),
            city: "Manila".into(),
            province: "Metro Manila".into(),
            region: "NCR".into(),
            country: "Philippines".into(),
            latitude: 14.599512,
            longitude: 120.984222,
        }
    }

    #[test]
    fn test_coordinates_fixed_precision() {
        let a = Coordinates::create(10.0000001, 20.0).unwrap();
        let b = Coordinates::create(10.0, 19.9999999).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.lat_e6(), 10_000_000);
        assert_ne!(a, Coordinates::create(10.000001, 20.0).unwrap());
    }

    #[test]
    fn test_coordinates_range() {
        let failure = Coordinates::create(91.0, f64::NAN).unwrap_err();
        assert_eq!(failure.errors().len(), 2);
        assert!(Coordinates::create(-90.0, 180.0).is_ok());
        assert!(Coordinates::from_micro_degrees(90_000_001, 0).is_err());
    }

    #[test]
    fn test_address_collects_all_errors() {
        let fields = AddressFields {
            city: "  ".into(),
            country: String::new(),
            latitude: 120.0,
            ..sample_fields()
        };
        let failure = Address::create(fields).unwrap_err();
        assert!(failure.has_code("Address.City.Required"));
        assert!(failure.has_code("Address.Country.Required"));
        assert!(failure.has_code("Coordinates.LatitudeOutOfRange"));
        assert_eq!(failure.errors().len(), 3);
    }

    #[test]
    fn test_with_patch_keeps_unchanged_fields() {
        let address = Address::create(sample_fields()).unwrap();
        let moved = address.with_coordinates(10.0, 20.0).unwrap();
        assert_eq!(moved.city(), "Manila");
        assert_eq!(moved.coordinates().lon_e6(), 20_000_000);

        let unchanged = address.with_patch(AddressPatch::default()).unwrap();
        assert_eq!(unchanged, address);
        assert!(address.with_coordinates(0.0, 200.0).is_err());
    }
}
