//! JSON adapter: Reading patient records and writing results.
//!
//! Field names are camelCase, enums use their exact string values and
//! timestamps are RFC 3339. Values of the wrong JSON type are rejected here,
//! before validation runs.

use std::io::{Read, Write};

use serde::Serialize;

use crate::domain::PartialPatientInput;
use crate::CardioRiskError;

/// Parse a patient record from a reader.
///
/// # Errors
/// Returns `CardioRiskError::Serialization` if the document is malformed or a
/// field has the wrong type.
pub fn read_patient<R: Read>(reader: R) -> Result<PartialPatientInput, CardioRiskError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Parse a patient record from a string.
///
/// # Errors
/// Returns `CardioRiskError::Serialization` on malformed input.
pub fn parse_patient(json: &str) -> Result<PartialPatientInput, CardioRiskError> {
    Ok(serde_json::from_str(json)?)
}

/// Write `value` as pretty-printed JSON followed by a newline.
///
/// # Errors
/// Returns error if serialization or the write fails.
pub fn write_json<W: Write, T: Serialize>(mut writer: W, value: &T) -> Result<(), CardioRiskError> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
