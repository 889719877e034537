use std::borrow::Cow;

use nom::error::ParseError;
use nom::{Err, IResult};

use crate::endianness::{PcapBE, PcapEndianness, PcapLE};
use crate::{opt_parse_options, PcapError, PcapNGOption, SHB_MAGIC};

use super::*;

/// The Section Header Block (SHB) identifies the
/// beginning of a section of the capture capture file.
///
/// The
/// Section Header Block does not contain data but it rather identifies a
/// list of blocks (interfaces, packets) that are logically correlated.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionHeaderBlock<'a> {
    pub block_type: u32,
    pub block_len1: u32,
    /// Byte-order magic, read as little-endian
    pub bom: u32,
    pub major_version: u16,
    pub minor_version: u16,
    pub section_len: i64,
    pub options: Vec<PcapNGOption<'a>>,
    pub block_len2: u32,
}

impl<'a> SectionHeaderBlock<'a> {
    pub fn big_endian(&self) -> bool {
        self.bom != BOM_MAGIC
    }

    /// Return the `shb_userappl` option value, if present
    pub fn user_application(&self) -> Option<Cow<str>> {
        options_get_as_bytes(&self.options, OptionCode::ShbUserAppl).map(String::from_utf8_lossy)
    }

    pub fn into_owned(self) -> SectionHeaderBlock<'static> {
        SectionHeaderBlock {
            block_type: self.block_type,
            block_len1: self.block_len1,
            bom: self.bom,
            major_version: self.major_version,
            minor_version: self.minor_version,
            section_len: self.section_len,
            options: self.options.into_iter().map(PcapNGOption::into_owned).collect(),
            block_len2: self.block_len2,
        }
    }
}

impl<'a, En: PcapEndianness> PcapNGBlockParser<'a, En, SectionHeaderBlock<'a>>
    for SectionHeaderBlock<'a>
{
    const HDR_SZ: usize = 28;
    const MAGIC: u32 = SHB_MAGIC;

    fn inner_parse<E: ParseError<&'a [u8]>>(
        block_type: u32,
        block_len1: u32,
        i: &'a [u8],
        block_len2: u32,
    ) -> IResult<&'a [u8], SectionHeaderBlock<'a>, E> {
        // caller function already tested header type(magic) and length
        // read end of header
        let (i, bom) = nom::number::streaming::le_u32(i)?;
        let (i, major_version) = En::parse_u16(i)?;
        let (i, minor_version) = En::parse_u16(i)?;
        let (i, section_len) = En::parse_i64(i)?;
        let (i, options) = opt_parse_options::<En, E>(i, block_len1 as usize, 28)?;
        let block = SectionHeaderBlock {
            block_type,
            block_len1,
            bom,
            major_version,
            minor_version,
            section_len,
            options,
            block_len2,
        };
        Ok((i, block))
    }
}

/// Parse a Section Header Block (little endian)
pub fn parse_sectionheaderblock_le(
    i: &[u8],
) -> IResult<&[u8], SectionHeaderBlock, PcapError<&[u8]>> {
    ng_block_parser::<SectionHeaderBlock, PcapLE, _, _>()(i)
}

/// Parse a Section Header Block (big endian)
pub fn parse_sectionheaderblock_be(
    i: &[u8],
) -> IResult<&[u8], SectionHeaderBlock, PcapError<&[u8]>> {
    ng_block_parser::<SectionHeaderBlock, PcapBE, _, _>()(i)
}

/// Parse a SectionHeaderBlock (little or big endian)
///
/// The byte order is given by the byte-order magic. Fails with `HeaderNotRecognized` if the block
/// is not a section header, or if the magic is invalid.
pub fn parse_sectionheaderblock(i: &[u8]) -> IResult<&[u8], SectionHeaderBlock, PcapError<&[u8]>> {
    if i.len() < 12 {
        return Err(Err::Incomplete(nom::Needed::new(12 - i.len())));
    }
    let block_type = u32::from_le_bytes([i[0], i[1], i[2], i[3]]);
    if block_type != SHB_MAGIC {
        return Err(Err::Error(PcapError::HeaderNotRecognized));
    }
    let bom = u32::from_le_bytes([i[8], i[9], i[10], i[11]]);
    if bom == BOM_MAGIC {
        parse_sectionheaderblock_le(i)
    } else if bom == BOM_MAGIC.swap_bytes() {
        parse_sectionheaderblock_be(i)
    } else {
        Err(Err::Error(PcapError::HeaderNotRecognized))
    }
}
