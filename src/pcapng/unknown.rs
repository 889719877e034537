use std::borrow::Cow;

use nom::error::ParseError;
use nom::IResult;

use crate::endianness::{PcapBE, PcapEndianness, PcapLE};
use crate::PcapError;

use super::*;

/// Unknown block (magic not recognized, or not modelled)
///
/// The body is kept as opaque bytes, and written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownBlock<'a> {
    /// Block type, in the section byte order
    pub block_type: u32,
    pub block_len1: u32,
    pub data: Cow<'a, [u8]>,
    pub block_len2: u32,
}

impl<'a> UnknownBlock<'a> {
    pub fn into_owned(self) -> UnknownBlock<'static> {
        UnknownBlock {
            block_type: self.block_type,
            block_len1: self.block_len1,
            data: Cow::Owned(self.data.into_owned()),
            block_len2: self.block_len2,
        }
    }
}

impl<'a, En: PcapEndianness> PcapNGBlockParser<'a, En, UnknownBlock<'a>> for UnknownBlock<'a> {
    const HDR_SZ: usize = 12;
    const MAGIC: u32 = 0;

    fn inner_parse<E: ParseError<&'a [u8]>>(
        block_type: u32,
        block_len1: u32,
        i: &'a [u8],
        block_len2: u32,
    ) -> IResult<&'a [u8], UnknownBlock<'a>, E> {
        let block = UnknownBlock {
            block_type: En::native_u32(block_type),
            block_len1,
            data: Cow::Borrowed(i),
            block_len2,
        };
        Ok((&i[i.len()..], block))
    }
}

/// Parse an unknown block (little-endian)
pub fn parse_unknownblock_le(i: &[u8]) -> IResult<&[u8], UnknownBlock, PcapError<&[u8]>> {
    ng_block_parser::<UnknownBlock, PcapLE, _, _>()(i)
}

/// Parse an unknown block (big-endian)
pub fn parse_unknownblock_be(i: &[u8]) -> IResult<&[u8], UnknownBlock, PcapError<&[u8]>> {
    ng_block_parser::<UnknownBlock, PcapBE, _, _>()(i)
}
