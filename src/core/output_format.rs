//! Output format for log records
//!
//! Provides the two wire formats:
//! - Text: `LEVEL message key1=value1 key2=value2\n`
//! - Json: `{"level":"LEVEL","message":"message","key1":"value1","key2":42}\n`
//!
//! Records are written incrementally (`begin_record`, any number of
//! `append_field`, `end_record`) so callers can stream fields from several
//! sources into one buffer without collecting them first.

use super::encoder::{append_json_string, append_level, append_text_escaped, append_value};
use super::error::LoggerError;
use super::field::Field;
use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output format for log records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum OutputFormat {
    /// Human-readable text format (default)
    ///
    /// Example: `INFO Request processed status=200`
    #[default]
    Text,

    /// Single-line JSON object per record
    ///
    /// Example: `{"level":"INFO","message":"Request processed","status":200}`
    Json,
}

impl OutputFormat {
    pub fn to_str(self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }

    /// Start a record: level and message
    pub fn begin_record(self, buf: &mut Vec<u8>, level: LogLevel, message: &str) {
        match self {
            OutputFormat::Text => {
                append_level(buf, level);
                buf.push(b' ');
                append_text_escaped(buf, message);
            }
            OutputFormat::Json => {
                buf.extend_from_slice(b"{\"level\":\"");
                append_level(buf, level);
                buf.extend_from_slice(b"\",\"message\":");
                append_json_string(buf, message);
            }
        }
    }

    /// Append one field after the fields already in the record
    pub fn append_field(self, buf: &mut Vec<u8>, field: &Field<'_>) {
        match self {
            OutputFormat::Text => {
                buf.push(b' ');
                append_text_escaped(buf, field.key);
                buf.push(b'=');
            }
            OutputFormat::Json => {
                buf.push(b',');
                append_json_string(buf, field.key);
                buf.push(b':');
            }
        }
        append_value(buf, &field.value, self);
    }

    /// Close the record and terminate it with a line break
    pub fn end_record(self, buf: &mut Vec<u8>) {
        match self {
            OutputFormat::Text => buf.push(b'\n'),
            OutputFormat::Json => buf.extend_from_slice(b"}\n"),
        }
    }

    /// Append a complete record: explicit fields first, then context fields
    pub fn append_record(
        self,
        buf: &mut Vec<u8>,
        level: LogLevel,
        message: &str,
        fields: &[Field<'_>],
        context_fields: &[Field<'_>],
    ) {
        self.begin_record(buf, level, message);
        for field in fields.iter().chain(context_fields) {
            self.append_field(buf, field);
        }
        self.end_record(buf);
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for OutputFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(LoggerError::config(
                "OutputFormat",
                format!("Invalid output format: '{}'", s),
            )),
        }
    }
}

impl TryFrom<String> for OutputFormat {
    type Error = LoggerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
