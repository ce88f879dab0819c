//! Canonical encoding.
//!
//! Definitions implement `Serialize`/`Deserialize`; the self-describing document form is a
//! [`serde_json::Value`] and the byte form is its JSON text.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::Result;

pub fn to_document<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

pub fn from_document<T: DeserializeOwned>(document: Value) -> Result<T> {
    Ok(serde_json::from_value(document)?)
}

pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, FieldPath};

    #[test]
    fn test_decode_error_is_typed() {
        let err = decode::<FieldPath>(b"42").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_document_and_bytes_agree() -> anyhow::Result<()> {
        let path = FieldPath::parse("a.b")?;
        let document = to_document(&path)?;
        assert_eq!(from_document::<FieldPath>(document)?, path);
        assert_eq!(decode::<FieldPath>(&encode(&path)?)?, path);
        Ok(())
    }
}
