use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::constants;
use crate::domain::{
    Coordinates, MapObject, ObjectDetails, ObjectKind, TechnicalCondition, ZoneLevel,
};

pub mod fields;

use fields::FieldUtils;

// Alias precedence: nested form, then short flat form, then verbose flat form.
const LAT_PATHS: [&[&str]; 3] = [&["coordinates", "lat"], &["lat"], &["latitude"]];
const LNG_PATHS: [&[&str]; 3] = [&["coordinates", "lng"], &["lng"], &["longitude"]];
const CONDITION_PATHS: [&[&str]; 3] = [&["technicalCondition"], &["condition"], &["conditionCategory"]];
const REGION_KEYS: [&str; 2] = ["region", "area"];

/// Why a raw record did not make it onto the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DropReason {
    /// The record is not a JSON object
    NotAnObject,
    /// Latitude or longitude could not be resolved from any alias
    MissingCoordinates,
    /// Coordinates resolved but fall outside the valid WGS84 range
    CoordinatesOutOfRange,
    /// No non-empty display name
    MissingName,
}

/// Recoverable oddities found while normalizing; the record is still kept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum NormalizationWarning {
    /// Condition present but not an integer in 1..=5; replaced with the default
    InvalidCondition { raw: String },
    /// Passport issued after the current year; age clamped to 0
    FuturePassport { year: i32 },
    /// Passport fields present but no year could be read from them
    UnreadablePassport { raw: String },
    /// Region is not one of the known administrative regions
    UnknownRegion { region: String },
}

/// A normalized object together with the warnings raised while building it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub object: MapObject,
    pub warnings: Vec<NormalizationWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedRecord {
    pub kind: ObjectKind,
    /// Position within the source collection
    pub index: usize,
    pub id: Option<String>,
    pub reason: DropReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordWarning {
    pub kind: ObjectKind,
    pub index: usize,
    pub warning: NormalizationWarning,
}

/// Outcome of normalizing a whole collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeReport {
    pub objects: Vec<MapObject>,
    pub dropped: Vec<DroppedRecord>,
    pub warnings: Vec<RecordWarning>,
}

impl NormalizeReport {
    /// Number of records whose condition was replaced with the default
    pub fn coerced_conditions(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w.warning, NormalizationWarning::InvalidCondition { .. }))
            .count()
    }

    /// Appends another report, keeping collection order
    pub fn merge(&mut self, other: NormalizeReport) {
        self.objects.extend(other.objects);
        self.dropped.extend(other.dropped);
        self.warnings.extend(other.warnings);
    }
}

/// Converts raw backend records into canonical map objects
pub trait Normalizer {
    /// Normalize one record, reporting why it was dropped if it was.
    fn normalize_record(&self, raw: &Value, kind: ObjectKind) -> Result<NormalizedRecord, DropReason>;

    /// Normalize one record, discarding the drop reason and warnings.
    fn normalize(&self, raw: &Value, kind: ObjectKind) -> Option<MapObject> {
        self.normalize_record(raw, kind).ok().map(|r| r.object)
    }

    /// Normalize a collection. A bad record never stops the rest.
    fn normalize_batch(&self, records: &[Value], kind: ObjectKind) -> NormalizeReport {
        let mut report = NormalizeReport::default();

        for (index, raw) in records.iter().enumerate() {
            match self.normalize_record(raw, kind) {
                Ok(record) => {
                    report.warnings.extend(record.warnings.into_iter().map(|warning| {
                        debug!(%kind, index, ?warning, "normalization warning");
                        RecordWarning { kind, index, warning }
                    }));
                    report.objects.push(record.object);
                }
                Err(reason) => {
                    let id = FieldUtils::id_field(raw);
                    debug!(%kind, index, ?id, ?reason, "dropping record");
                    report.dropped.push(DroppedRecord { kind, index, id, reason });
                }
            }
        }

        report
    }
}

/// Normalizer for the backend's water body, facility and critical zone payloads.
///
/// Holds the year used to derive passport age so that normalization never reads
/// the clock.
#[derive(Debug, Clone, Copy)]
pub struct DefaultNormalizer {
    pub current_year: i32,
}

impl DefaultNormalizer {
    pub fn new(current_year: i32) -> Self {
        Self { current_year }
    }

    fn extract_coordinates(data: &Value) -> Result<Coordinates, DropReason> {
        let lat = FieldUtils::first_present(data, &LAT_PATHS).and_then(FieldUtils::as_f64_lenient);
        let lng = FieldUtils::first_present(data, &LNG_PATHS).and_then(FieldUtils::as_f64_lenient);

        match (lat, lng) {
            (Some(lat), Some(lng)) => {
                Coordinates::new(lat, lng).ok_or(DropReason::CoordinatesOutOfRange)
            }
            _ => Err(DropReason::MissingCoordinates),
        }
    }

    /// Resolves the technical condition. Critical zones take theirs from the
    /// alert level when it is recognized.
    fn extract_condition(
        data: &Value,
        zone_level: Option<ZoneLevel>,
        warnings: &mut Vec<NormalizationWarning>,
    ) -> TechnicalCondition {
        if let Some(level) = zone_level {
            return level.condition();
        }

        let Some(raw) = FieldUtils::first_present(data, &CONDITION_PATHS) else {
            return TechnicalCondition::DEFAULT;
        };

        FieldUtils::as_i64_lenient(raw)
            .and_then(|value| u8::try_from(value).ok())
            .and_then(TechnicalCondition::new)
            .unwrap_or_else(|| {
                warnings.push(NormalizationWarning::InvalidCondition { raw: raw.to_string() });
                TechnicalCondition::DEFAULT
            })
    }

    /// Returns (passport year, passport date, passport age)
    fn extract_passport(
        &self,
        data: &Value,
        warnings: &mut Vec<NormalizationWarning>,
    ) -> (Option<i32>, Option<chrono::NaiveDate>, u32) {
        let explicit_year = FieldUtils::lookup(data, &["passportYear"]);
        let raw_date = FieldUtils::lookup(data, &["passportDate"]);

        let parsed_date = raw_date
            .and_then(Value::as_str)
            .and_then(FieldUtils::parse_passport_date);
        let passport_date = parsed_date.and_then(|(_, date)| date);

        let year = explicit_year
            .and_then(FieldUtils::as_i64_lenient)
            .and_then(|y| i32::try_from(y).ok())
            .or(parsed_date.map(|(year, _)| year));

        let Some(year) = year else {
            if let Some(raw) = explicit_year.or(raw_date) {
                warnings.push(NormalizationWarning::UnreadablePassport { raw: raw.to_string() });
            }
            return (None, passport_date, 0);
        };

        if year > self.current_year {
            warnings.push(NormalizationWarning::FuturePassport { year });
        }
        let age = u32::try_from(self.current_year.saturating_sub(year)).unwrap_or(0);

        (Some(year), passport_date, age)
    }

    fn extract_details(data: &Value, kind: ObjectKind) -> ObjectDetails {
        match kind {
            ObjectKind::WaterBody => ObjectDetails::WaterBody {
                resource_type: FieldUtils::string_field(data, &["resourceType", "type"]),
                water_type: FieldUtils::string_field(data, &["waterType"]),
                has_fauna: FieldUtils::bool_field(data, "hasFauna"),
            },
            ObjectKind::Facility => ObjectDetails::Facility {
                facility_type: FieldUtils::string_field(data, &["facilityType", "type"]),
            },
            ObjectKind::CriticalZone => ObjectDetails::CriticalZone {
                level: FieldUtils::string_field(data, &["level"]).and_then(|l| ZoneLevel::parse(&l)),
                description: FieldUtils::string_field(data, &["description"]),
            },
        }
    }
}

impl Normalizer for DefaultNormalizer {
    fn normalize_record(&self, raw: &Value, kind: ObjectKind) -> Result<NormalizedRecord, DropReason> {
        if !raw.is_object() {
            return Err(DropReason::NotAnObject);
        }

        let coordinates = Self::extract_coordinates(raw)?;
        let name = FieldUtils::string_field(raw, &["name"]).ok_or(DropReason::MissingName)?;
        let mut warnings = Vec::new();

        let details = Self::extract_details(raw, kind);
        let zone_level = match &details {
            ObjectDetails::CriticalZone { level, .. } => *level,
            _ => None,
        };
        let technical_condition = Self::extract_condition(raw, zone_level, &mut warnings);

        // Zones have no technical passport
        let (passport_year, passport_date, passport_age) = match kind {
            ObjectKind::CriticalZone => (None, None, 0),
            _ => self.extract_passport(raw, &mut warnings),
        };

        let region = FieldUtils::string_field(raw, &REGION_KEYS);
        if let Some(region) = region.as_deref().filter(|r| !constants::is_known_region(r)) {
            warnings.push(NormalizationWarning::UnknownRegion { region: region.to_string() });
        }

        let id = FieldUtils::id_field(raw)
            .unwrap_or_else(|| FieldUtils::fallback_id(kind, &name, &coordinates));

        let object = MapObject {
            id,
            name,
            region,
            coordinates,
            technical_condition,
            passport_year,
            passport_date,
            passport_age,
            priority: None,
            details,
        };

        Ok(NormalizedRecord { object, warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const YEAR: i32 = 2024;

    fn normalizer() -> DefaultNormalizer {
        DefaultNormalizer::new(YEAR)
    }

    #[test]
    fn test_verbose_coordinates_are_copied() {
        let record = json!({
            "id": 12,
            "name": "Озеро Балхаш",
            "region": "Карагандинская область",
            "latitude": 46.8,
            "longitude": 74.9
        });

        let object = normalizer().normalize(&record, ObjectKind::WaterBody).unwrap();
        assert_eq!(object.coordinates, Coordinates { lat: 46.8, lng: 74.9 });
        assert_eq!(object.id, "12");
        assert_eq!(object.kind(), ObjectKind::WaterBody);
    }

    #[test]
    fn test_nested_coordinates_take_precedence() {
        let record = json!({
            "id": "a",
            "name": "Бухтарминская ГЭС",
            "coordinates": { "lat": 49.6, "lng": 83.5 },
            "lat": 1.0,
            "lng": 2.0,
            "latitude": 3.0,
            "longitude": 4.0
        });

        let object = normalizer().normalize(&record, ObjectKind::Facility).unwrap();
        assert_eq!(object.coordinates, Coordinates { lat: 49.6, lng: 83.5 });
    }

    #[test]
    fn test_precedence_is_per_component_and_skips_nulls() {
        // Backend sends empty `coordinates` plus null short aliases when unset
        let record = json!({
            "id": "b",
            "name": "Шардаринское водохранилище",
            "coordinates": { "lat": 41.2 },
            "lat": null,
            "lng": null,
            "longitude": 68.2
        });

        let object = normalizer().normalize(&record, ObjectKind::WaterBody).unwrap();
        assert_eq!(object.coordinates, Coordinates { lat: 41.2, lng: 68.2 });
    }

    #[test]
    fn test_unresolvable_coordinates_are_dropped() {
        let record = json!({ "id": 1, "name": "Без координат", "coordinates": {} });
        assert!(normalizer().normalize(&record, ObjectKind::Facility).is_none());
        assert_eq!(
            normalizer().normalize_record(&record, ObjectKind::Facility).unwrap_err(),
            DropReason::MissingCoordinates
        );
    }

    #[test]
    fn test_out_of_range_coordinates_are_dropped() {
        let record = json!({ "id": 1, "name": "Ошибка", "lat": 143.0, "lng": 51.0 });
        assert_eq!(
            normalizer().normalize_record(&record, ObjectKind::Facility).unwrap_err(),
            DropReason::CoordinatesOutOfRange
        );
    }

    #[test]
    fn test_missing_condition_defaults_to_three() {
        let record = json!({ "id": 1, "name": "Канал", "lat": 43.0, "lng": 77.0 });
        let result = normalizer().normalize_record(&record, ObjectKind::Facility).unwrap();
        assert_eq!(result.object.technical_condition, TechnicalCondition::DEFAULT);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_invalid_condition_is_coerced_with_warning() {
        for bad in [json!(9), json!(0), json!(2.5), json!("плохое"), json!(-1)] {
            let record = json!({ "id": 1, "name": "Шлюз", "lat": 43.0, "lng": 77.0, "condition": bad });
            let result = normalizer().normalize_record(&record, ObjectKind::Facility).unwrap();
            assert_eq!(result.object.technical_condition, TechnicalCondition::DEFAULT);
            assert!(matches!(
                result.warnings.as_slice(),
                [NormalizationWarning::InvalidCondition { .. }]
            ));
        }
    }

    #[test]
    fn test_condition_aliases_and_lenient_values() {
        let record = json!({
            "id": 1, "name": "Плотина", "lat": 43.0, "lng": 77.0,
            "technicalCondition": "4", "condition": 2
        });
        let object = normalizer().normalize(&record, ObjectKind::Facility).unwrap();
        assert_eq!(object.technical_condition.value(), 4);

        let record = json!({ "id": 1, "name": "Плотина", "lat": 43.0, "lng": 77.0, "conditionCategory": 5.0 });
        let object = normalizer().normalize(&record, ObjectKind::Facility).unwrap();
        assert_eq!(object.technical_condition.value(), 5);
    }

    #[test]
    fn test_passport_age_from_year_and_date() {
        let record = json!({ "id": 1, "name": "ГЭС", "lat": 43.0, "lng": 77.0, "passportYear": 2015 });
        let object = normalizer().normalize(&record, ObjectKind::Facility).unwrap();
        assert_eq!(object.passport_year, Some(2015));
        assert_eq!(object.passport_age, 9);

        let record = json!({ "id": 1, "name": "ГЭС", "lat": 43.0, "lng": 77.0, "passportDate": "2017-06-20" });
        let object = normalizer().normalize(&record, ObjectKind::Facility).unwrap();
        assert_eq!(object.passport_year, Some(2017));
        assert_eq!(object.passport_age, 7);
        assert!(object.passport_date.is_some());
    }

    #[test]
    fn test_future_passport_clamps_to_zero() {
        let record = json!({ "id": 1, "name": "ГЭС", "lat": 43.0, "lng": 77.0, "passportYear": 2031 });
        let result = normalizer().normalize_record(&record, ObjectKind::Facility).unwrap();
        assert_eq!(result.object.passport_age, 0);
        assert!(result
            .warnings
            .contains(&NormalizationWarning::FuturePassport { year: 2031 }));
    }

    #[test]
    fn test_missing_passport_means_zero_age() {
        let record = json!({ "id": 1, "name": "ГЭС", "lat": 43.0, "lng": 77.0 });
        let object = normalizer().normalize(&record, ObjectKind::Facility).unwrap();
        assert_eq!(object.passport_year, None);
        assert_eq!(object.passport_age, 0);
    }

    #[test]
    fn test_critical_zone_condition_is_synthesized_from_level() {
        let critical = json!({
            "id": "irtysh-pavlodar", "name": "Иртыш (Павлодар)", "region": "Павлодарская область",
            "level": "critical", "description": "Высокий уровень воды", "lat": 52.3, "lng": 76.9
        });
        let warning = json!({
            "id": "ural-uralsk", "name": "Урал (Уральск)", "level": "warning",
            "condition": 1, "lat": 51.2, "lng": 51.4
        });

        let critical = normalizer().normalize(&critical, ObjectKind::CriticalZone).unwrap();
        let warning = normalizer().normalize(&warning, ObjectKind::CriticalZone).unwrap();

        assert_eq!(critical.technical_condition.value(), 5);
        assert_eq!(warning.technical_condition.value(), 4);
        assert_eq!(critical.passport_age, 0);
        assert!(matches!(
            critical.details,
            ObjectDetails::CriticalZone { level: Some(ZoneLevel::Critical), .. }
        ));
    }

    #[test]
    fn test_critical_zone_with_unknown_level_uses_condition_field() {
        let zone = json!({ "id": "z", "name": "Или", "level": "watch", "condition": 4, "lat": 44.0, "lng": 77.0 });
        let object = normalizer().normalize(&zone, ObjectKind::CriticalZone).unwrap();
        assert_eq!(object.technical_condition.value(), 4);
        assert!(matches!(object.details, ObjectDetails::CriticalZone { level: None, .. }));
    }

    #[test]
    fn test_type_specific_fields_pass_through() {
        let record = json!({
            "id": 3, "name": "Капшагайское водохранилище", "lat": 43.9, "lng": 77.1,
            "type": "Водохранилище", "waterType": "fresh", "hasFauna": true
        });
        let object = normalizer().normalize(&record, ObjectKind::WaterBody).unwrap();
        assert_eq!(
            object.details,
            ObjectDetails::WaterBody {
                resource_type: Some("Водохранилище".to_string()),
                water_type: Some("fresh".to_string()),
                has_fauna: Some(true),
            }
        );

        let record = json!({ "id": 4, "name": "ГЭС", "lat": 43.9, "lng": 77.1, "type": "dam", "facilityType": "hydropower" });
        let object = normalizer().normalize(&record, ObjectKind::Facility).unwrap();
        assert_eq!(
            object.details,
            ObjectDetails::Facility { facility_type: Some("hydropower".to_string()) }
        );
    }

    #[test]
    fn test_region_alias_and_unknown_region_warning() {
        let record = json!({ "id": 1, "name": "ГЭС", "lat": 43.0, "lng": 77.0, "area": "Алматинская область" });
        let result = normalizer().normalize_record(&record, ObjectKind::Facility).unwrap();
        assert_eq!(result.object.region.as_deref(), Some("Алматинская область"));
        assert!(result.warnings.is_empty());

        let record = json!({ "id": 1, "name": "ГЭС", "lat": 43.0, "lng": 77.0, "region": "Атлантида" });
        let result = normalizer().normalize_record(&record, ObjectKind::Facility).unwrap();
        assert_eq!(result.object.region.as_deref(), Some("Атлантида"));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_missing_id_gets_deterministic_fallback() {
        let record = json!({ "name": "Сырдарья (Кызылорда)", "lat": 44.8, "lng": 65.5, "level": "critical" });
        let first = normalizer().normalize(&record, ObjectKind::CriticalZone).unwrap();
        let second = normalizer().normalize(&record, ObjectKind::CriticalZone).unwrap();
        assert!(!first.id.is_empty());
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn test_batch_skips_bad_records_and_keeps_order() {
        let records = vec![
            json!({ "id": 1, "name": "Первый", "lat": 43.0, "lng": 77.0 }),
            json!("not an object"),
            json!({ "id": 3, "lat": 43.0, "lng": 77.0 }),
            json!({ "id": 4, "name": "Без координат" }),
            json!({ "id": 5, "name": "Пятый", "lat": 44.0, "lng": 78.0, "condition": 42 }),
        ];

        let report = normalizer().normalize_batch(&records, ObjectKind::Facility);

        let ids: Vec<&str> = report.objects.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "5"]);

        let reasons: Vec<(usize, DropReason)> =
            report.dropped.iter().map(|d| (d.index, d.reason)).collect();
        assert_eq!(
            reasons,
            vec![
                (1, DropReason::NotAnObject),
                (2, DropReason::MissingName),
                (3, DropReason::MissingCoordinates)
            ]
        );
        assert_eq!(report.coerced_conditions(), 1);
        assert_eq!(report.warnings[0].index, 4);
    }
}
