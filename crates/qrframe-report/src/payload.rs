use serde::{ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Key of the identifier in device info records.
pub const DEVICE_ID_KEY: &str = "device_id";

/// Device info parsed from the decoded text of a QR code.
///
/// Both variants serialize as a JSON object. Equality compares that JSON object, so a
/// structured record holding only a string `device_id` equals the identifier with the
/// same value.
#[derive(Debug, Clone)]
pub enum DeviceInfo {
    /// The payload was a JSON object, kept verbatim.
    Structured(Map<String, Value>),
    /// The payload was anything else; serialized as `{"device_id": <text>}`.
    Identifier(String),
}

impl DeviceInfo {
    /// Parses the decoded text of a QR code.
    ///
    /// Text that parses as a JSON object becomes [`DeviceInfo::Structured`] with every key
    /// and value unchanged. Any other text (invalid JSON, a scalar, an array, the empty
    /// string) becomes [`DeviceInfo::Identifier`] holding the text verbatim. Never fails.
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Self::Structured(map),
            _ => Self::Identifier(text.to_string()),
        }
    }

    /// Returns the record as a JSON object.
    pub fn to_map(&self) -> Map<String, Value> {
        match self {
            Self::Structured(map) => map.clone(),
            Self::Identifier(id) => {
                let mut map = Map::with_capacity(1);
                map.insert(DEVICE_ID_KEY.to_string(), Value::String(id.clone()));
                map
            }
        }
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Self::Structured(map) => map.get(key).cloned(),
            Self::Identifier(id) if key == DEVICE_ID_KEY => Some(Value::String(id.clone())),
            Self::Identifier(_) => None,
        }
    }

    /// Whether the payload was a JSON object.
    #[inline]
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    fn from_map(map: Map<String, Value>) -> Self {
        if map.len() == 1 {
            if let Some(Value::String(id)) = map.get(DEVICE_ID_KEY) {
                return Self::Identifier(id.clone());
            }
        }
        Self::Structured(map)
    }
}

/// Parses the decoded text of a QR code, see [`DeviceInfo::parse`].
pub fn parse(text: &str) -> DeviceInfo {
    DeviceInfo::parse(text)
}

impl PartialEq for DeviceInfo {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Identifier(a), Self::Identifier(b)) => a == b,
            _ => self.to_map() == other.to_map(),
        }
    }
}

impl Serialize for DeviceInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Structured(map) => map.serialize(serializer),
            Self::Identifier(id) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(DEVICE_ID_KEY, id)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for DeviceInfo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::deserialize(deserializer).map(Self::from_map)
    }
}
