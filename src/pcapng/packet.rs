use std::borrow::Cow;

use nom::bytes::streaming::take;
use nom::error::{ErrorKind, ParseError};
use nom::{Err, IResult};
use rusticata_macros::align32;

use crate::endianness::{PcapBE, PcapEndianness, PcapLE};
use crate::{opt_parse_options, PcapError, PcapNGOption, PB_MAGIC};

use super::*;

/// The Packet Block is obsolete, and superseded by the Enhanced Packet Block.
///
/// It is still written by some old capture tools, and counts as a packet. Unlike the Simple
/// Packet Block, it has an options area and can carry a comment.
#[derive(Debug, Clone, PartialEq)]
pub struct PacketBlock<'a> {
    /// Block type (little endian)
    pub block_type: u32,
    pub block_len1: u32,
    pub if_id: u16,
    pub drops_count: u16,
    pub ts_high: u32,
    pub ts_low: u32,
    /// Captured packet length
    pub caplen: u32,
    /// Original packet length
    pub origlen: u32,
    /// Raw data from packet (with padding)
    pub data: Cow<'a, [u8]>,
    pub options: Vec<PcapNGOption<'a>>,
    pub block_len2: u32,
}

impl<'a> PacketBlock<'a> {
    /// Packet data, without padding
    pub fn packet_data(&self) -> &[u8] {
        let caplen = self.caplen as usize;
        if caplen < self.data.len() {
            &self.data[..caplen]
        } else {
            &self.data
        }
    }

    pub fn into_owned(self) -> PacketBlock<'static> {
        PacketBlock {
            block_type: self.block_type,
            block_len1: self.block_len1,
            if_id: self.if_id,
            drops_count: self.drops_count,
            ts_high: self.ts_high,
            ts_low: self.ts_low,
            caplen: self.caplen,
            origlen: self.origlen,
            data: Cow::Owned(self.data.into_owned()),
            options: self.options.into_iter().map(PcapNGOption::into_owned).collect(),
            block_len2: self.block_len2,
        }
    }
}

impl<'a, En: PcapEndianness> PcapNGBlockParser<'a, En, PacketBlock<'a>> for PacketBlock<'a> {
    const HDR_SZ: usize = 32;
    const MAGIC: u32 = PB_MAGIC;

    fn inner_parse<E: ParseError<&'a [u8]>>(
        block_type: u32,
        block_len1: u32,
        i: &'a [u8],
        block_len2: u32,
    ) -> IResult<&'a [u8], PacketBlock<'a>, E> {
        let (i, if_id) = En::parse_u16(i)?;
        let (i, drops_count) = En::parse_u16(i)?;
        let (i, ts_high) = En::parse_u32(i)?;
        let (i, ts_low) = En::parse_u32(i)?;
        let (i, caplen) = En::parse_u32(i)?;
        let (i, origlen) = En::parse_u32(i)?;
        if caplen >= u32::MAX - 4 {
            return Err(Err::Error(E::from_error_kind(i, ErrorKind::Verify)));
        }
        let padded_length = align32!(caplen);
        let (i, data) = take(padded_length)(i)?;
        let current_offset = (32 + padded_length) as usize;
        let (i, options) = opt_parse_options::<En, E>(i, block_len1 as usize, current_offset)?;
        let block = PacketBlock {
            block_type,
            block_len1,
            if_id,
            drops_count,
            ts_high,
            ts_low,
            caplen,
            origlen,
            data: Cow::Borrowed(data),
            options,
            block_len2,
        };
        Ok((i, block))
    }
}

/// Parse a Packet Block (little-endian)
pub fn parse_packetblock_le(i: &[u8]) -> IResult<&[u8], PacketBlock, PcapError<&[u8]>> {
    ng_block_parser::<PacketBlock, PcapLE, _, _>()(i)
}

/// Parse a Packet Block (big-endian)
pub fn parse_packetblock_be(i: &[u8]) -> IResult<&[u8], PacketBlock, PcapError<&[u8]>> {
    ng_block_parser::<PacketBlock, PcapBE, _, _>()(i)
}
