//! TOML document decoding.

use crate::error::CodecError;
use std::io::Read;
use toml::Table;

/// Read and parse a complete document.
pub fn read_document(reader: &mut dyn Read) -> Result<Table, CodecError> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    parse_fragment(&content)
}

/// Parse a document or synthesized fragment.
pub fn parse_fragment(content: &str) -> Result<Table, CodecError> {
    Ok(toml::from_str(content)?)
}
