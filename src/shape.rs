//! Output shape selection for decoded responses.
//!
//! Every operation decodes through [`decode`], which either deserializes the
//! body into a typed model or keeps it as a generic JSON mapping.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::TrackerError;

/// How decoded responses are exposed to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputShape {
    /// Typed structs with field access.
    #[default]
    Struct,
    /// Generic key/value mappings (`serde_json::Value`).
    Map,
}

impl std::str::FromStr for OutputShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "struct" | "object" => Ok(Self::Struct),
            "map" | "array" => Ok(Self::Map),
            other => Err(format!("unknown output shape {other:?}; expected struct or map")),
        }
    }
}

/// A decoded response in the shape the client was configured with.
#[derive(Debug, Clone, PartialEq)]
pub enum Shaped<T> {
    Struct(T),
    Map(JsonValue),
}

impl<T> Shaped<T> {
    pub fn is_struct(&self) -> bool {
        matches!(self, Self::Struct(_))
    }

    pub fn as_struct(&self) -> Option<&T> {
        match self {
            Self::Struct(value) => Some(value),
            Self::Map(_) => None,
        }
    }

    pub fn into_struct(self) -> Option<T> {
        match self {
            Self::Struct(value) => Some(value),
            Self::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&JsonValue> {
        match self {
            Self::Map(value) => Some(value),
            Self::Struct(_) => None,
        }
    }

    pub fn into_map(self) -> Option<JsonValue> {
        match self {
            Self::Map(value) => Some(value),
            Self::Struct(_) => None,
        }
    }
}

/// Decode a JSON response body into the requested shape.
pub fn decode<T: DeserializeOwned>(shape: OutputShape, body: &str) -> Result<Shaped<T>, TrackerError> {
    match shape {
        OutputShape::Struct => serde_json::from_str(body)
            .map(Shaped::Struct)
            .map_err(TrackerError::Decode),
        OutputShape::Map => serde_json::from_str(body)
            .map(Shaped::Map)
            .map_err(TrackerError::Decode),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::{Story, Task};

    const BODY: &str = r#"{"id": 7, "kind": "story", "name": "Write docs", "labels": []}"#;

    #[test]
    fn struct_shape_gives_field_access() {
        let shaped: Shaped<Story> = decode(OutputShape::Struct, BODY).unwrap();
        let story = shaped.as_struct().expect("struct shape");
        assert_eq!(story.id, Some(7));
        assert_eq!(story.name.as_deref(), Some("Write docs"));
    }

    #[test]
    fn map_shape_keeps_keys_and_values() {
        let shaped: Shaped<Story> = decode(OutputShape::Map, BODY).unwrap();
        let map = shaped.into_map().expect("map shape");
        assert_eq!(
            map,
            json!({"id": 7, "kind": "story", "name": "Write docs", "labels": []})
        );
    }

    fn assert_round_trip<T: DeserializeOwned + serde::Serialize>(body: &str) {
        let structured: Shaped<T> = decode(OutputShape::Struct, body).unwrap();
        let mapped: Shaped<T> = decode(OutputShape::Map, body).unwrap();
        let from_struct = serde_json::to_value(structured.into_struct().unwrap()).unwrap();
        assert_eq!(from_struct, mapped.into_map().unwrap());
    }

    #[test]
    fn both_shapes_carry_identical_content() {
        assert_round_trip::<Story>(BODY);
        assert_round_trip::<Story>(r#"{"id": 556, "estimate": 2, "name": "X"}"#);
        assert_round_trip::<Story>(r#"{"id": 557, "estimate": 0.5}"#);
        assert_round_trip::<Task>(r#"{"id": 3, "kind": "task", "description": "Write tests"}"#);
        assert_round_trip::<Task>(r#"{"id": 4, "complete": true}"#);
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        let err = decode::<Story>(OutputShape::Map, "<html>").unwrap_err();
        assert!(matches!(err, TrackerError::Decode(_)));
    }

    #[test]
    fn parse_shape_names() {
        assert_eq!("struct".parse::<OutputShape>(), Ok(OutputShape::Struct));
        assert_eq!("MAP".parse::<OutputShape>(), Ok(OutputShape::Map));
        assert!("xml".parse::<OutputShape>().is_err());
    }
}
