use std::borrow::Cow;
use std::convert::TryFrom;
use std::fmt;

use nom::bytes::streaming::take;
use nom::combinator::complete;
use nom::error::{ErrorKind, ParseError};
use nom::multi::many0;
use nom::{Err, IResult};
use rusticata_macros::{align32, newtype_enum};

use crate::endianness::{PcapBE, PcapEndianness, PcapLE};

#[derive(Clone, Copy, Eq, PartialEq)]
pub struct OptionCode(pub u16);

newtype_enum! {
impl debug OptionCode {
    EndOfOpt = 0,
    Comment = 1,
    ShbHardware = 2,
    ShbOs = 3,
    ShbUserAppl = 4,
    IfTsresol = 9,
    IfTsoffset = 14,
    Custom2988 = 2988,
    Custom2989 = 2989,
    Custom19372 = 19372,
    Custom19373 = 19373,
}
}

/// Errors raised when reading or editing block options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcapNGOptionError {
    /// The block type has no options area
    NotSupported,
    /// The value does not fit in the 16-bit option length field
    InvalidLength(usize),
    /// The block would be longer than its 32-bit length field allows
    BlockTooLong,
}

impl fmt::Display for PcapNGOptionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PcapNGOptionError::NotSupported => write!(f, "block does not support options"),
            PcapNGOptionError::InvalidLength(n) => write!(f, "option value too long ({} bytes)", n),
            PcapNGOptionError::BlockTooLong => write!(f, "block length exceeds 4 GiB"),
        }
    }
}

impl std::error::Error for PcapNGOptionError {}

/// A pcap-ng option
///
/// `value` holds the raw value as found in the file, including the padding to 32 bits, so that
/// decoded options are written back unchanged. Use [`as_bytes`](PcapNGOption::as_bytes) to get
/// the value limited to `len`.
#[derive(Debug, Clone, PartialEq)]
pub struct PcapNGOption<'a> {
    pub code: OptionCode,
    pub len: u16,
    pub value: Cow<'a, [u8]>,
}

impl<'a> PcapNGOption<'a> {
    /// Build an option holding `value`, failing if it is longer than 65535 bytes
    pub fn new(code: OptionCode, value: &[u8]) -> Result<PcapNGOption<'static>, PcapNGOptionError> {
        let len =
            u16::try_from(value.len()).map_err(|_| PcapNGOptionError::InvalidLength(value.len()))?;
        Ok(PcapNGOption {
            code,
            len,
            value: Cow::Owned(value.to_vec()),
        })
    }

    /// The end-of-options marker
    pub fn end_of_options() -> PcapNGOption<'static> {
        PcapNGOption {
            code: OptionCode::EndOfOpt,
            len: 0,
            value: Cow::Borrowed(&[]),
        }
    }

    /// Return a reference to the option value, as raw bytes (not related to the `len` field)
    #[inline]
    pub fn value(&self) -> &[u8] {
        self.value.as_ref()
    }

    /// Return a reference to the option value, using the `len` field to limit it, or None if length is invalid
    pub fn as_bytes(&self) -> Option<&[u8]> {
        let len = usize::from(self.len);
        if len <= self.value.len() {
            Some(&self.value[..len])
        } else {
            None
        }
    }

    /// Copy the option value if borrowed, giving an option with `'static` lifetime
    pub fn into_owned(self) -> PcapNGOption<'static> {
        PcapNGOption {
            code: self.code,
            len: self.len,
            value: Cow::Owned(self.value.into_owned()),
        }
    }
}

// Options after the first end-of-options marker are not part of the list
fn end_of_options_position(options: &[PcapNGOption]) -> Option<usize> {
    options
        .iter()
        .position(|opt| opt.code == OptionCode::EndOfOpt)
}

/// Return the first option with the given code, as bytes limited to its length
///
/// Later options with the same code, and options after the end-of-options marker, are ignored.
pub fn options_get_as_bytes<'o>(options: &'o [PcapNGOption], code: OptionCode) -> Option<&'o [u8]> {
    options
        .iter()
        .take_while(|opt| opt.code != OptionCode::EndOfOpt)
        .find(|opt| opt.code == code)
        .and_then(|opt| opt.as_bytes())
}

/// Replace the value of the first option with the given code, or insert a new option
///
/// A new option is inserted before the end-of-options marker. If the list has no marker, the
/// option is appended and followed by a new marker. Other options, including any found after
/// the marker, are not modified.
pub fn options_set_bytes(
    options: &mut Vec<PcapNGOption>,
    code: OptionCode,
    value: &[u8],
) -> Result<(), PcapNGOptionError> {
    let new = PcapNGOption::new(code, value)?;
    let end = end_of_options_position(options);
    let live = end.unwrap_or(options.len());
    if let Some(opt) = options[..live].iter_mut().find(|opt| opt.code == code) {
        opt.len = new.len;
        opt.value = new.value;
        return Ok(());
    }
    match end {
        Some(idx) => options.insert(idx, new),
        None => {
            options.push(new);
            options.push(PcapNGOption::end_of_options());
        }
    }
    Ok(())
}

/// Total length of the options, once serialized (including padding)
pub(crate) fn options_length(options: &[PcapNGOption]) -> usize {
    options.iter().map(|o| align32!(4 + o.value.len())).sum()
}

/// Parse a pcap-ng Option (little-endian)
#[inline]
pub fn parse_option_le<'i, E: ParseError<&'i [u8]>>(
    i: &'i [u8],
) -> IResult<&'i [u8], PcapNGOption, E> {
    parse_option::<PcapLE, E>(i)
}

/// Parse a pcap-ng Option (big-endian)
#[inline]
pub fn parse_option_be<'i, E: ParseError<&'i [u8]>>(
    i: &'i [u8],
) -> IResult<&'i [u8], PcapNGOption, E> {
    parse_option::<PcapBE, E>(i)
}

pub(crate) fn parse_option<'i, En: PcapEndianness, E: ParseError<&'i [u8]>>(
    i: &'i [u8],
) -> IResult<&'i [u8], PcapNGOption, E> {
    let (i, code) = En::parse_u16(i)?;
    let (i, len) = En::parse_u16(i)?;
    let (i, value) = take(align32!(len as u32))(i)?;
    let option = PcapNGOption {
        code: OptionCode(code),
        len,
        value: Cow::Borrowed(value),
    };
    Ok((i, option))
}

/// Parse the options area of a block
///
/// `len` is the total block length, and `opt_offset` the length of everything else in the block
/// (framing included). The area must be made only of complete options: trailing bytes that do
/// not form an option are an error, since they could not be written back.
pub(crate) fn opt_parse_options<'i, En: PcapEndianness, E: ParseError<&'i [u8]>>(
    i: &'i [u8],
    len: usize,
    opt_offset: usize,
) -> IResult<&'i [u8], Vec<PcapNGOption>, E> {
    if len > opt_offset {
        let (i, area) = take(len - opt_offset)(i)?;
        let (rem, options) = many0(complete(parse_option::<En, E>))(area)?;
        if !rem.is_empty() {
            return Err(Err::Error(E::from_error_kind(rem, ErrorKind::Verify)));
        }
        Ok((i, options))
    } else {
        Ok((i, Vec::new()))
    }
}
