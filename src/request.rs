//! Validated requests for the add and read operations
//!
//! Requests can be built from their fields, or parsed from the semicolon-separated forms
//! `input_file;comment;packet_number` and `input_file;packet_number`.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Errors raised when building a request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The input file does not exist
    #[error("file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    /// The packet number is not a positive integer
    #[error("invalid packet number {value:?}: expected a positive integer")]
    InvalidPacketNumber { value: String },

    /// Wrong number of `;`-separated fields
    #[error("expected {expected} fields separated by ';', found {found}")]
    FieldCount { expected: usize, found: usize },
}

fn check_path(path: PathBuf) -> Result<PathBuf, RequestError> {
    if path.exists() {
        Ok(path)
    } else {
        Err(RequestError::FileNotFound { path })
    }
}

fn check_packet_number(packet_number: usize) -> Result<usize, RequestError> {
    if packet_number == 0 {
        return Err(RequestError::InvalidPacketNumber {
            value: packet_number.to_string(),
        });
    }
    Ok(packet_number)
}

fn parse_packet_number(s: &str) -> Result<usize, RequestError> {
    let n = s
        .trim()
        .parse::<usize>()
        .map_err(|_| RequestError::InvalidPacketNumber {
            value: s.to_string(),
        })?;
    check_packet_number(n).map_err(|_| RequestError::InvalidPacketNumber {
        value: s.to_string(),
    })
}

fn split_fields(s: &str, expected: usize) -> Result<Vec<&str>, RequestError> {
    let fields: Vec<&str> = s.trim().split(';').collect();
    if fields.len() != expected {
        return Err(RequestError::FieldCount {
            expected,
            found: fields.len(),
        });
    }
    Ok(fields)
}

/// Request to set the comment of one packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddCommentRequest {
    pub path: PathBuf,
    /// 1-based packet number
    pub packet_number: usize,
    pub comment: String,
}

impl AddCommentRequest {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(
        path: P,
        packet_number: usize,
        comment: S,
    ) -> Result<Self, RequestError> {
        Ok(AddCommentRequest {
            path: check_path(path.into())?,
            packet_number: check_packet_number(packet_number)?,
            comment: comment.into(),
        })
    }
}

/// Parse `input_file;comment;packet_number`
impl FromStr for AddCommentRequest {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = split_fields(s, 3)?;
        let packet_number = parse_packet_number(fields[2])?;
        AddCommentRequest::new(fields[0], packet_number, fields[1])
    }
}

/// Request to read the comment of one packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadCommentRequest {
    pub path: PathBuf,
    /// 1-based packet number
    pub packet_number: usize,
}

impl ReadCommentRequest {
    pub fn new<P: Into<PathBuf>>(path: P, packet_number: usize) -> Result<Self, RequestError> {
        Ok(ReadCommentRequest {
            path: check_path(path.into())?,
            packet_number: check_packet_number(packet_number)?,
        })
    }
}

/// Parse `input_file;packet_number`
impl FromStr for ReadCommentRequest {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = split_fields(s, 2)?;
        let packet_number = parse_packet_number(fields[1])?;
        ReadCommentRequest::new(fields[0], packet_number)
    }
}
