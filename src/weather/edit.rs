use super::fields;
use crate::edit::{EditProjection, FieldView, MessageSink, ValidationExt, ValidationRule};
use crate::values::SharedFieldValues;

/// Typed, validated properties over a weather station's edit store.
pub struct WeatherStationFields {
    values: SharedFieldValues,
}

impl WeatherStationFields {
    pub fn name(&self) -> String {
        self.values.get_edited(fields::NAME)
    }

    pub fn latitude(&self) -> f64 {
        self.values.get_edited(fields::LATITUDE)
    }

    pub fn longitude(&self) -> f64 {
        self.values.get_edited(fields::LONGITUDE)
    }

    pub fn elevation(&self) -> f64 {
        self.values.get_edited(fields::ELEVATION)
    }
}

impl FieldView for WeatherStationFields {
    fn from_values(values: SharedFieldValues) -> Self {
        Self { values }
    }

    fn values(&self) -> &SharedFieldValues {
        &self.values
    }

    fn load_validation_rules(&self, rules: &mut Vec<ValidationRule<Self>>) {
        rules.push(Box::new(|m: &Self, sink: &MessageSink| {
            m.name()
                .validation(fields::NAME)
                .longer_than(6, Some("Name must be longer than 6 letters"))
                .validate(sink, None)
        }));
        rules.push(Box::new(|m: &Self, sink: &MessageSink| {
            m.latitude()
                .validation(fields::LATITUDE)
                .greater_than_or_equal_to(-90.0, None)
                .less_than_or_equal_to(90.0, None)
                .validate(sink, Some("Latitude should be in the range -90 to 90"))
        }));
        rules.push(Box::new(|m: &Self, sink: &MessageSink| {
            m.longitude()
                .validation(fields::LONGITUDE)
                .greater_than_or_equal_to(-180.0, None)
                .less_than_or_equal_to(180.0, None)
                .validate(sink, Some("Longitude should be in the range -180 to 180"))
        }));
        rules.push(Box::new(|m: &Self, sink: &MessageSink| {
            m.elevation()
                .validation(fields::ELEVATION)
                .greater_than_or_equal_to(-1000.0, None)
                .less_than_or_equal_to(10000.0, None)
                .validate(sink, Some("Elevation should be in the range -1000 to 10000"))
        }));
    }
}

impl EditProjection<WeatherStationFields> {
    pub fn set_name(&self, name: impl Into<String>) -> bool {
        self.set(fields::NAME, name.into())
    }

    pub fn set_latitude(&self, latitude: f64) -> bool {
        self.set(fields::LATITUDE, latitude)
    }

    pub fn set_longitude(&self, longitude: f64) -> bool {
        self.set(fields::LONGITUDE, longitude)
    }

    pub fn set_elevation(&self, elevation: f64) -> bool {
        self.set(fields::ELEVATION, elevation)
    }
}
