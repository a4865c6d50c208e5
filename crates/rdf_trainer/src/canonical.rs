//! Canonical JSON serialization for model artifacts.
//!
//! Object keys are sorted recursively and output is pretty-printed with a
//! fixed indent so that identical forests hash identically.

use serde::{ser::Error as SerdeSerError, Serialize};
use serde_json::{ser::PrettyFormatter, Serializer};

/// Serialize a value into canonical JSON.
pub fn canonical_json_string<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    // Without `preserve_order` every object in a `Value` is a BTreeMap, so keys come out sorted
    let value = serde_json::to_value(value)?;
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"  "));
    value.serialize(&mut serializer)?;
    String::from_utf8(buffer).map_err(|err| SerdeSerError::custom(err.to_string()))
}

/// Hex-encoded BLAKE3 digest of a string
pub fn blake3_hex(content: &str) -> String {
    hex::encode(blake3::hash(content.as_bytes()).as_bytes())
}
