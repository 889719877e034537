//! Adding and reading packet comments on capture files

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::str;

use chrono::Local;
use serde::Serialize;

use crate::capture::{Capture, DEFAULT_BUFFER_CAPACITY};
use crate::error::{Error, Result};
use crate::writer::write_new;

/// `strftime` format of the timestamp in output file names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Settings of an [`Annotator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatorConfig {
    /// Initial capacity of the reader buffer
    pub buffer_capacity: usize,
    /// Marker inserted between the input file name and the timestamp of output files
    pub marker: String,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        AnnotatorConfig {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            marker: "modified".to_string(),
        }
    }
}

/// The comment of a packet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PacketComment {
    pub packet_number: usize,
    /// Comment text, empty if the packet has no comment
    pub comment: String,
}

/// Result of a read request, as reported to users
///
/// Serializes either as `{"packet_number": .., "comment": ..}` or as `{"error": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CommentReport {
    Comment(PacketComment),
    Error { error: String },
}

impl From<Result<PacketComment>> for CommentReport {
    fn from(res: Result<PacketComment>) -> Self {
        match res {
            Ok(c) => CommentReport::Comment(c),
            Err(e) => CommentReport::Error {
                error: e.to_string(),
            },
        }
    }
}

/// Adds comments to packets, and reads them back
///
/// Input files are never modified: edits are written to a new file next to the input.
#[derive(Debug, Clone, Default)]
pub struct Annotator {
    config: AnnotatorConfig,
}

impl Annotator {
    pub fn new(config: AnnotatorConfig) -> Self {
        Annotator { config }
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Set the comment of packet `packet_number` (1-based), and save the result to a new file
    ///
    /// The output file is named `<base>_<marker>_<timestamp><ext>` after the input file, in the
    /// same directory. Returns the path of the output file. On error, no output file is created.
    pub fn add_comment<P: AsRef<Path>>(
        &self,
        path: P,
        packet_number: usize,
        comment: &str,
    ) -> Result<PathBuf> {
        let stamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.add_comment_stamped(path.as_ref(), packet_number, comment, &stamp)
    }

    fn add_comment_stamped(
        &self,
        path: &Path,
        packet_number: usize,
        comment: &str,
        stamp: &str,
    ) -> Result<PathBuf> {
        if comment.len() > usize::from(u16::MAX) {
            return Err(Error::CommentTooLong { len: comment.len() });
        }
        let mut capture = Capture::load_with_capacity(path, self.config.buffer_capacity)?;
        capture.set_comment(packet_number, comment.as_bytes())?;
        let data = capture.to_vec()?;
        let output = available_output_path(path, &self.config.marker, stamp);
        write_new(&output, &data)?;
        Ok(output)
    }

    /// Read the comment of packet `packet_number` (1-based)
    ///
    /// A packet without comment gives an empty string.
    pub fn read_comment<P: AsRef<Path>>(
        &self,
        path: P,
        packet_number: usize,
    ) -> Result<PacketComment> {
        let capture = Capture::load_with_capacity(path, self.config.buffer_capacity)?;
        let comment = match capture.get_comment(packet_number)? {
            Some(raw) => str::from_utf8(raw)
                .map_err(|source| Error::Encoding {
                    packet_number,
                    raw: raw.to_vec(),
                    source,
                })?
                .to_string(),
            None => String::new(),
        };
        Ok(PacketComment {
            packet_number,
            comment,
        })
    }
}

/// Set the comment of a packet, using the default settings. See [`Annotator::add_comment`].
pub fn add_comment<P: AsRef<Path>>(path: P, packet_number: usize, comment: &str) -> Result<PathBuf> {
    Annotator::default().add_comment(path, packet_number, comment)
}

/// Read the comment of a packet, using the default settings. See [`Annotator::read_comment`].
pub fn read_comment<P: AsRef<Path>>(path: P, packet_number: usize) -> Result<PacketComment> {
    Annotator::default().read_comment(path, packet_number)
}

/// Build `<base>_<marker>_<stamp><ext>` from `input`, in the same directory
pub fn output_path(input: &Path, marker: &str, stamp: &str) -> PathBuf {
    let mut name = OsString::from(input.file_stem().unwrap_or_default());
    name.push(format!("_{}_{}", marker, stamp));
    if let Some(ext) = input.extension() {
        name.push(".");
        name.push(ext);
    }
    input.with_file_name(name)
}

// Append a `_<k>` counter to the stamp until the name is free
fn available_output_path(input: &Path, marker: &str, stamp: &str) -> PathBuf {
    let mut candidate = output_path(input, marker, stamp);
    let mut k = 1;
    while candidate.exists() {
        candidate = output_path(input, marker, &format!("{}_{}", stamp, k));
        k += 1;
    }
    candidate
}
