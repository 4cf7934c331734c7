use crate::framework::{ColumnMap, DbRecord, RecordInfo, NO_RECORD_ID};
use crate::values::{FieldValue, FieldValueStore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Field and column names.
pub mod fields {
    pub const ID: &str = "ID";
    pub const GUID: &str = "GUID";
    pub const NAME: &str = "Name";
    pub const LATITUDE: &str = "Latitude";
    pub const LONGITUDE: &str = "Longitude";
    pub const ELEVATION: &str = "Elevation";
}

/// Placeholder for coordinates and elevation that have not been entered.
const UNSET: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherStation {
    pub id: i64,
    pub guid: Uuid,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
}

impl Default for WeatherStation {
    fn default() -> Self {
        Self {
            id: NO_RECORD_ID,
            guid: Uuid::nil(),
            name: "No Name".to_string(),
            latitude: UNSET,
            longitude: UNSET,
            elevation: UNSET,
        }
    }
}

impl WeatherStation {
    pub fn new(id: i64, name: &str, latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            id,
            guid: Uuid::new_v4(),
            name: name.to_string(),
            latitude,
            longitude,
            elevation,
        }
    }
}

impl DbRecord for WeatherStation {
    fn id(&self) -> i64 {
        self.id
    }

    fn guid(&self) -> Uuid {
        self.guid
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn record_info() -> RecordInfo {
        RecordInfo {
            record_name: "WeatherStation".into(),
            record_description: "Weather Station".into(),
            record_list_name: "WeatherStations".into(),
            record_list_description: "Weather Stations".into(),
        }
    }

    fn as_properties(&self) -> FieldValueStore {
        FieldValueStore::new()
            .with(fields::ID, self.id)
            .with(fields::GUID, self.guid)
            .with(fields::NAME, self.name.as_str())
            .with(fields::LATITUDE, self.latitude)
            .with(fields::LONGITUDE, self.longitude)
            .with(fields::ELEVATION, self.elevation)
    }

    fn from_properties(values: &FieldValueStore) -> Self {
        let blank = Self::default();
        Self {
            id: values.try_get_edited(fields::ID).unwrap_or(blank.id),
            guid: values.try_get_edited(fields::GUID).unwrap_or(blank.guid),
            name: values.try_get_edited(fields::NAME).unwrap_or(blank.name),
            latitude: values.try_get_edited(fields::LATITUDE).unwrap_or(blank.latitude),
            longitude: values.try_get_edited(fields::LONGITUDE).unwrap_or(blank.longitude),
            elevation: values.try_get_edited(fields::ELEVATION).unwrap_or(blank.elevation),
        }
    }

    fn with_id(self, id: i64) -> Self {
        Self { id, ..self }
    }

    fn columns() -> ColumnMap<Self> {
        ColumnMap::new()
            .column(fields::ID, |s: &Self| FieldValue::from(s.id))
            .column(fields::NAME, |s: &Self| FieldValue::from(s.name.as_str()))
            .column(fields::LATITUDE, |s: &Self| FieldValue::from(s.latitude))
            .column(fields::LONGITUDE, |s: &Self| FieldValue::from(s.longitude))
            .column(fields::ELEVATION, |s: &Self| FieldValue::from(s.elevation))
    }
}

/// Two stations with ids 1 and 2.
pub fn sample_stations() -> Vec<WeatherStation> {
    vec![
        WeatherStation::new(1, "Tiree", 54.2, -1.5, 28.0),
        WeatherStation::new(2, "Ross-on-Wye", 52.2, -1.2, 120.0),
    ]
}

/// `count` stations with ids `1..=count` and names that sort in id order.
pub fn numbered_stations(count: i64) -> Vec<WeatherStation> {
    (1..=count)
        .map(|i| {
            WeatherStation::new(
                i,
                &format!("Station {:04}", i),
                50.0 + (i % 10) as f64,
                -(i % 7) as f64,
                (i * 10) as f64,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_station() {
        let blank = WeatherStation::default();
        assert_eq!(blank.id, NO_RECORD_ID);
        assert_eq!(blank.name, "No Name");
        assert_eq!(blank.elevation, 1000.0);
        assert!(blank.is_new());
    }

    #[test]
    fn test_properties_carry_edits() {
        let station = WeatherStation::new(7, "Lerwick", 60.1, -1.2, 82.0);
        let mut store = station.as_properties();
        assert!(!store.is_dirty());

        store.set(fields::NAME, "Lerwick Airport");
        store.set(fields::ELEVATION, 84.5);
        let edited = WeatherStation::from_properties(&store);
        assert_eq!(edited.name, "Lerwick Airport");
        assert_eq!(edited.elevation, 84.5);
        assert_eq!(edited.id, 7);
        assert_eq!(edited.guid, station.guid);
    }

    #[test]
    fn test_columns_read_fields() {
        let columns = WeatherStation::columns();
        let station = WeatherStation::new(3, "Oban", 56.4, -5.5, 4.0);
        assert_eq!(columns.value(&station, "name"), Some(FieldValue::from("Oban")));
        assert_eq!(columns.value(&station, "Elevation"), Some(FieldValue::from(4.0)));
        assert!(columns.value(&station, "GUID").is_none());
    }
}
