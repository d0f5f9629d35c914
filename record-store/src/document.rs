//! Codec for the persisted document: a pretty-printed JSON array of records.

use crate::record::Record;
use crate::Error;

pub fn encode(records: &[Record]) -> Result<Vec<u8>, Error> {
    Ok(serde_json::to_vec_pretty(records)?)
}

pub fn decode(bytes: &[u8]) -> Result<Vec<Record>, Error> {
    Ok(serde_json::from_slice(bytes)?)
}
