// Input validation for event actions
//
// Every action validates untrusted input before touching identity or storage.
// A schema reports only the first violated constraint, checked in field order,
// so callers can surface one message next to the offending field.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::ValidationError;
use crate::event::{EventFields, EventQuery, ALL_SPORTS};

// =============================================================================
// Limits and messages
// =============================================================================

/// Maximum event name length, in characters
pub const MAX_EVENT_NAME_CHARS: usize = 100;

/// Maximum description length, in characters
pub const MAX_EVENT_DESCRIPTION_CHARS: usize = 1000;

pub const NAME_REQUIRED: &str = "Event name is required";
pub const NAME_TOO_LONG: &str = "Event name must be less than 100 characters";
pub const SPORT_TYPE_REQUIRED: &str = "Sport type is required";
pub const DATE_TIME_REQUIRED: &str = "Date and time is required";
pub const DATE_TIME_INVALID: &str = "Invalid date and time";
pub const DESCRIPTION_TOO_LONG: &str = "Description must be less than 1000 characters";
pub const VENUES_REQUIRED: &str = "At least one venue is required";
pub const VENUE_EMPTY: &str = "Venue cannot be empty";
pub const INVALID_EVENT_ID: &str = "Invalid event ID";

// =============================================================================
// Schema trait
// =============================================================================

/// A raw input shape that can be checked and coerced into a trusted value
pub trait Schema: Sized {
    type Output;

    fn validate(self) -> Result<Self::Output, ValidationError>;
}

/// Validate a raw input value against its schema
pub fn validate_input<S: Schema>(input: S) -> Result<S::Output, ValidationError> {
    input.validate()
}

/// Decode an untrusted JSON value into a raw input shape without validating it.
/// Shape errors (wrong JSON types) become validation errors.
pub fn parse_input<S: DeserializeOwned>(value: serde_json::Value) -> Result<S, ValidationError> {
    serde_json::from_value(value).map_err(|e| ValidationError::new(format!("Invalid input: {}", e)))
}

/// Decode an untrusted JSON value into a schema and validate it
pub fn decode_input<S>(value: serde_json::Value) -> Result<S::Output, ValidationError>
where
    S: Schema + DeserializeOwned,
{
    parse_input::<S>(value)?.validate()
}

// =============================================================================
// Raw inputs
// =============================================================================

/// Event form input, as submitted by a client.
/// Owner-like fields are not part of the shape and are ignored if sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct EventInput {
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(example = "City Derby"))]
    pub name: Option<String>,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(example = "Soccer"))]
    pub sport_type: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DDTHH:MM` (read as UTC)
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(example = "2025-06-01T18:00"))]
    pub date_time: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub venues: Option<Vec<String>>,
}

/// Update input: the full event form plus the target id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateEventInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub fields: EventInput,
}

/// Input carrying only an event id (delete, get-by-id)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct EventIdInput {
    #[serde(default)]
    pub id: Option<String>,
}

impl EventIdInput {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
        }
    }
}

/// List filter input (mirrors the list view query parameters)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct EventFilterInput {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sport_type: Option<String>,
}

/// Validated update: target id plus replacement fields
#[derive(Debug, Clone, PartialEq)]
pub struct EventUpdate {
    pub id: Uuid,
    pub fields: EventFields,
}

// =============================================================================
// Field rules
// =============================================================================

fn validate_id(raw: Option<&str>) -> Result<Uuid, ValidationError> {
    raw.and_then(|id| Uuid::parse_str(id).ok())
        .ok_or_else(|| ValidationError::new(INVALID_EVENT_ID))
}

fn validate_name(raw: Option<String>) -> Result<String, ValidationError> {
    let name = raw.unwrap_or_default();
    if name.is_empty() {
        return Err(ValidationError::new(NAME_REQUIRED));
    }
    if name.chars().count() > MAX_EVENT_NAME_CHARS {
        return Err(ValidationError::new(NAME_TOO_LONG));
    }
    Ok(name)
}

fn validate_sport_type(raw: Option<String>) -> Result<String, ValidationError> {
    match raw {
        Some(sport_type) if !sport_type.is_empty() => Ok(sport_type),
        _ => Err(ValidationError::new(SPORT_TYPE_REQUIRED)),
    }
}

fn validate_date_time(raw: Option<String>) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw.unwrap_or_default();
    if raw.is_empty() {
        return Err(ValidationError::new(DATE_TIME_REQUIRED));
    }
    parse_date_time(raw.trim()).ok_or_else(|| ValidationError::new(DATE_TIME_INVALID))
}

fn validate_description(raw: Option<String>) -> Result<Option<String>, ValidationError> {
    match raw {
        Some(desc) if desc.chars().count() > MAX_EVENT_DESCRIPTION_CHARS => {
            Err(ValidationError::new(DESCRIPTION_TOO_LONG))
        }
        // An empty description is stored as absent
        Some(desc) if desc.is_empty() => Ok(None),
        other => Ok(other),
    }
}

fn validate_venues(raw: Option<Vec<String>>) -> Result<Vec<String>, ValidationError> {
    let venues = raw.unwrap_or_default();
    if venues.is_empty() {
        return Err(ValidationError::new(VENUES_REQUIRED));
    }
    if venues.iter().any(|v| v.is_empty()) {
        return Err(ValidationError::new(VENUE_EMPTY));
    }
    Ok(venues)
}

/// Parse a caller-supplied timestamp.
///
/// Accepts RFC 3339 (`2025-06-01T18:00:00Z`, any offset) and the offset-less
/// `datetime-local` forms (`2025-06-01T18:00`, `2025-06-01T18:00:00`), which
/// are read as UTC.
pub fn parse_date_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

// =============================================================================
// Schemas
// =============================================================================

impl Schema for EventInput {
    type Output = EventFields;

    fn validate(self) -> Result<EventFields, ValidationError> {
        Ok(EventFields {
            name: validate_name(self.name)?,
            sport_type: validate_sport_type(self.sport_type)?,
            date_time: validate_date_time(self.date_time)?,
            description: validate_description(self.description)?,
            venues: validate_venues(self.venues)?,
        })
    }
}

impl Schema for UpdateEventInput {
    type Output = EventUpdate;

    fn validate(self) -> Result<EventUpdate, ValidationError> {
        let id = validate_id(self.id.as_deref())?;
        let fields = self.fields.validate()?;
        Ok(EventUpdate { id, fields })
    }
}

impl Schema for EventIdInput {
    type Output = Uuid;

    fn validate(self) -> Result<Uuid, ValidationError> {
        validate_id(self.id.as_deref())
    }
}

impl Schema for EventFilterInput {
    type Output = EventQuery;

    fn validate(self) -> Result<EventQuery, ValidationError> {
        let search = self.search.filter(|s| !s.is_empty());
        let sport_type = self
            .sport_type
            .filter(|s| !s.is_empty() && s != ALL_SPORTS);
        Ok(EventQuery { search, sport_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn valid_input() -> EventInput {
        EventInput {
            name: Some("Championship Final".to_string()),
            sport_type: Some("Basketball".to_string()),
            date_time: Some("2025-06-01T18:30".to_string()),
            description: Some("Season closer".to_string()),
            venues: Some(vec!["Arena One".to_string(), "Fan Zone".to_string()]),
        }
    }

    fn message<T: std::fmt::Debug>(result: Result<T, ValidationError>) -> String {
        result.unwrap_err().0
    }

    #[test]
    fn test_valid_event_input() {
        let fields = validate_input(valid_input()).unwrap();
        assert_eq!(fields.name, "Championship Final");
        assert_eq!(fields.sport_type, "Basketball");
        assert_eq!(
            fields.date_time,
            Utc.with_ymd_and_hms(2025, 6, 1, 18, 30, 0).unwrap()
        );
        assert_eq!(fields.description.as_deref(), Some("Season closer"));
        assert_eq!(fields.venues.len(), 2);
    }

    #[test]
    fn test_name_rules() {
        let mut input = valid_input();
        input.name = Some(String::new());
        assert_eq!(message(validate_input(input)), NAME_REQUIRED);

        let mut input = valid_input();
        input.name = None;
        assert_eq!(message(validate_input(input)), NAME_REQUIRED);

        let mut input = valid_input();
        input.name = Some("x".repeat(MAX_EVENT_NAME_CHARS));
        assert!(validate_input(input).is_ok());

        let mut input = valid_input();
        input.name = Some("x".repeat(MAX_EVENT_NAME_CHARS + 1));
        assert_eq!(message(validate_input(input)), NAME_TOO_LONG);
    }

    #[test]
    fn test_name_length_counts_characters() {
        let mut input = valid_input();
        input.name = Some("é".repeat(MAX_EVENT_NAME_CHARS));
        assert!(validate_input(input).is_ok());
    }

    #[test]
    fn test_sport_type_required() {
        let mut input = valid_input();
        input.sport_type = Some(String::new());
        assert_eq!(message(validate_input(input)), SPORT_TYPE_REQUIRED);
    }

    #[test]
    fn test_date_time_rules() {
        let mut input = valid_input();
        input.date_time = Some(String::new());
        assert_eq!(message(validate_input(input)), DATE_TIME_REQUIRED);

        let mut input = valid_input();
        input.date_time = Some("next friday".to_string());
        assert_eq!(message(validate_input(input)), DATE_TIME_INVALID);
    }

    #[test]
    fn test_date_time_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap();
        assert_eq!(parse_date_time("2025-06-01T18:00:00Z"), Some(expected));
        assert_eq!(parse_date_time("2025-06-01T20:00:00+02:00"), Some(expected));
        assert_eq!(parse_date_time("2025-06-01T18:00:00"), Some(expected));
        assert_eq!(parse_date_time("2025-06-01T18:00"), Some(expected));
        assert_eq!(parse_date_time("2025-06-01"), None);
    }

    #[test]
    fn test_description_rules() {
        let mut input = valid_input();
        input.description = Some("x".repeat(MAX_EVENT_DESCRIPTION_CHARS + 1));
        assert_eq!(message(validate_input(input)), DESCRIPTION_TOO_LONG);

        let mut input = valid_input();
        input.description = Some(String::new());
        assert_eq!(validate_input(input).unwrap().description, None);

        let mut input = valid_input();
        input.description = None;
        assert_eq!(validate_input(input).unwrap().description, None);
    }

    #[test]
    fn test_venue_rules() {
        let mut input = valid_input();
        input.venues = Some(vec![]);
        assert_eq!(message(validate_input(input)), VENUES_REQUIRED);

        let mut input = valid_input();
        input.venues = None;
        assert_eq!(message(validate_input(input)), VENUES_REQUIRED);

        let mut input = valid_input();
        input.venues = Some(vec!["Arena".to_string(), String::new()]);
        assert_eq!(message(validate_input(input)), VENUE_EMPTY);
    }

    #[test]
    fn test_first_violation_wins() {
        let input = EventInput {
            name: Some(String::new()),
            sport_type: None,
            date_time: None,
            description: None,
            venues: Some(vec![]),
        };
        assert_eq!(message(validate_input(input)), NAME_REQUIRED);

        let input = EventInput {
            sport_type: None,
            venues: Some(vec![]),
            ..valid_input()
        };
        assert_eq!(message(validate_input(input)), SPORT_TYPE_REQUIRED);
    }

    #[test]
    fn test_validation_is_deterministic() {
        let input = EventInput {
            venues: Some(vec![]),
            ..valid_input()
        };
        let first = validate_input(input.clone());
        let second = validate_input(input);
        assert_eq!(first, second);
    }

    #[test]
    fn test_update_requires_valid_id() {
        let input = UpdateEventInput {
            id: Some("not-a-uuid".to_string()),
            fields: valid_input(),
        };
        assert_eq!(message(validate_input(input)), INVALID_EVENT_ID);

        let id = Uuid::now_v7();
        let input = UpdateEventInput {
            id: Some(id.to_string()),
            fields: valid_input(),
        };
        assert_eq!(validate_input(input).unwrap().id, id);
    }

    #[test]
    fn test_id_checked_before_fields() {
        let input = UpdateEventInput {
            id: None,
            fields: EventInput::default(),
        };
        assert_eq!(message(validate_input(input)), INVALID_EVENT_ID);
    }

    #[test]
    fn test_filter_normalization() {
        let query = validate_input(EventFilterInput {
            search: Some(String::new()),
            sport_type: Some("all".to_string()),
        })
        .unwrap();
        assert_eq!(query, EventQuery::default());

        let query = validate_input(EventFilterInput {
            search: Some("cup".to_string()),
            sport_type: Some("Golf".to_string()),
        })
        .unwrap();
        assert_eq!(query.search.as_deref(), Some("cup"));
        assert_eq!(query.sport_type.as_deref(), Some("Golf"));
    }

    #[test]
    fn test_decode_ignores_owner_fields() {
        let value = json!({
            "name": "Derby",
            "sport_type": "Soccer",
            "date_time": "2025-06-01T18:00:00Z",
            "venues": ["North Stand"],
            "user_id": Uuid::now_v7().to_string(),
        });
        let fields = decode_input::<EventInput>(value).unwrap();
        assert_eq!(fields.name, "Derby");
    }

    #[test]
    fn test_decode_shape_error() {
        let value = json!({"name": "Derby", "venues": "North Stand"});
        let err = decode_input::<EventInput>(value).unwrap_err();
        assert!(err.0.starts_with("Invalid input:"));
    }

    #[test]
    fn test_decode_update_flattens_fields() {
        let id = Uuid::now_v7();
        let value = json!({
            "id": id.to_string(),
            "name": "Derby",
            "sport_type": "Soccer",
            "date_time": "2025-06-01T18:00",
            "venues": ["North Stand"],
        });
        let update = decode_input::<UpdateEventInput>(value).unwrap();
        assert_eq!(update.id, id);
        assert_eq!(update.fields.venues, vec!["North Stand".to_string()]);
    }
}
