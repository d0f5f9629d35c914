//! The contact record and its identifier clock.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::Error;

/// Keys `additional_info` may not carry, as they would shadow the record's
/// own fields once flattened.
pub const RESERVED_FIELDS: [&str; 4] = ["id", "phoneNumber", "name", "createdAt"];

/// Free-form metadata flattened onto a record.
pub type AdditionalInfo = Map<String, Value>;

/// One contact entry.
///
/// Serializes as a flat JSON object: `id`, `phoneNumber`, `name`, then the
/// additional info keys in insertion order, then `createdAt`.
///
/// Decoding never rejects an object. Unknown keys land in `additional_info`.
/// A reserved field holding something other than a string is kept there too,
/// verbatim, and is written back in place of the typed field, which stays
/// empty. A missing reserved field decodes as an empty string.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub phone_number: String,
    pub name: String,
    pub additional_info: AdditionalInfo,
    pub created_at: String,
}

impl Record {
    /// Builds a record, rejecting additional info that collides with a
    /// reserved field.
    pub fn new(
        id: impl Into<String>,
        phone_number: impl Into<String>,
        name: impl Into<String>,
        additional_info: AdditionalInfo,
        created_at: DateTime<Utc>,
    ) -> Result<Self, Error> {
        if let Some(key) = additional_info
            .keys()
            .find(|key| RESERVED_FIELDS.contains(&key.as_str()))
        {
            return Err(Error::ReservedField(key.clone()));
        }

        Ok(Self {
            id: id.into(),
            phone_number: phone_number.into(),
            name: name.into(),
            additional_info,
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }

    /// Parses `created_at`. Stored documents are not validated, so this is
    /// `None` for a timestamp that is not RFC 3339.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }

    pub fn info(&self, key: &str) -> Option<&Value> {
        self.additional_info.get(key)
    }

    /// Phone numbers match case-sensitively, names case-insensitively.
    pub fn matches(&self, query: &str) -> bool {
        self.phone_number.contains(query)
            || self.name.to_lowercase().contains(&query.to_lowercase())
    }

    fn from_fields(fields: Map<String, Value>) -> Self {
        let mut record = Self {
            id: String::new(),
            phone_number: String::new(),
            name: String::new(),
            additional_info: AdditionalInfo::new(),
            created_at: String::new(),
        };

        for (key, value) in fields {
            let slot = match key.as_str() {
                "id" => &mut record.id,
                "phoneNumber" => &mut record.phone_number,
                "name" => &mut record.name,
                "createdAt" => &mut record.created_at,
                _ => {
                    record.additional_info.insert(key, value);
                    continue;
                }
            };
            match value {
                Value::String(text) => *slot = text,
                other => {
                    record.additional_info.insert(key, other);
                }
            }
        }

        record
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let own = |key: &str| !self.additional_info.contains_key(key);

        let mut map = serializer.serialize_map(None)?;
        if own("id") {
            map.serialize_entry("id", &self.id)?;
        }
        if own("phoneNumber") {
            map.serialize_entry("phoneNumber", &self.phone_number)?;
        }
        if own("name") {
            map.serialize_entry("name", &self.name)?;
        }
        for (key, value) in &self.additional_info {
            map.serialize_entry(key, value)?;
        }
        if own("createdAt") {
            map.serialize_entry("createdAt", &self.created_at)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_fields(fields))
    }
}

/// Issues millisecond timestamp ids, never repeating within one clock.
#[derive(Debug, Default)]
pub(crate) struct IdClock {
    last: AtomicI64,
}

impl IdClock {
    pub fn next_id(&self) -> String {
        self.next_after(Utc::now().timestamp_millis()).to_string()
    }

    fn next_after(&self, now: i64) -> i64 {
        let mut issued = now;
        let _ = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                issued = now.max(last + 1);
                Some(issued)
            });
        issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn serializes_flat_in_field_order() {
        let mut info = AdditionalInfo::new();
        info.insert("type".to_string(), json!("mobile"));
        info.insert("tags".to_string(), json!(["work"]));
        let record = Record::new("1", "+62", "John", info, at(1_714_558_830_123)).unwrap();

        let text = serde_json::to_string(&record).unwrap();
        let expected = json!({
            "id": "1",
            "phoneNumber": "+62",
            "name": "John",
            "type": "mobile",
            "tags": ["work"],
            "createdAt": "2024-05-01T10:20:30.123Z",
        });
        assert_eq!(text, expected.to_string());
    }

    #[test]
    fn unknown_keys_become_additional_info() {
        let record: Record = serde_json::from_value(json!({
            "id": "7",
            "phoneNumber": "123",
            "name": "Ann",
            "createdAt": "not a date",
            "type": "office",
        }))
        .unwrap();

        assert_eq!(record.info("type"), Some(&json!("office")));
        assert_eq!(record.additional_info.len(), 1);
        assert!(record.created_at().is_none());
    }

    #[test]
    fn non_string_reserved_values_are_kept_verbatim() {
        let stored = json!({
            "id": "2",
            "phoneNumber": "+2",
            "name": 5,
            "type": "home",
            "createdAt": "2024-05-01T10:20:30.123Z",
        });

        let record: Record = serde_json::from_value(stored.clone()).unwrap();
        assert_eq!(record.id, "2");
        assert_eq!(record.name, "");
        assert_eq!(record.info("name"), Some(&json!(5)));
        assert_eq!(serde_json::to_string(&record).unwrap(), stored.to_string());

        let stored = json!({"id": 7, "phoneNumber": "+7", "name": null, "createdAt": 0});
        let record: Record = serde_json::from_value(stored.clone()).unwrap();
        assert_eq!(record.additional_info.len(), 3);
        assert_eq!(serde_json::to_value(&record).unwrap(), stored);
    }

    #[test]
    fn missing_reserved_values_decode_empty() {
        let record: Record = serde_json::from_value(json!({"phoneNumber": "+1"})).unwrap();

        assert_eq!(record.phone_number, "+1");
        assert_eq!(record.name, "");
        assert_eq!(record.created_at, "");
        assert!(record.additional_info.is_empty());
        assert!(!record.matches("x"));
    }

    #[test]
    fn rejects_reserved_keys() {
        let mut info = AdditionalInfo::new();
        info.insert("createdAt".to_string(), json!("yesterday"));
        let err = Record::new("1", "1", "a", info, Utc::now()).unwrap_err();
        assert!(matches!(err, Error::ReservedField(key) if key == "createdAt"));
    }

    #[test]
    fn matching_rules() {
        let record = Record::new(
            "1",
            "+6281234567890",
            "John Doe",
            AdditionalInfo::new(),
            Utc::now(),
        )
        .unwrap();
        assert!(record.matches("john"));
        assert!(record.matches("DOE"));
        assert!(record.matches("812345"));
        assert!(record.matches(""));
        assert!(!record.matches("jane"));
    }

    #[test]
    fn id_clock_never_repeats() {
        let clock = IdClock::default();
        assert_eq!(clock.next_after(1_000), 1_000);
        assert_eq!(clock.next_after(1_000), 1_001);
        assert_eq!(clock.next_after(999), 1_002);
        assert_eq!(clock.next_after(5_000), 5_000);
    }
}
