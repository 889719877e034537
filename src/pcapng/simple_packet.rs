use std::borrow::Cow;

use nom::bytes::streaming::take;
use nom::error::ParseError;
use nom::IResult;

use crate::endianness::{PcapBE, PcapEndianness, PcapLE};
use crate::{PcapError, SPB_MAGIC};

use super::*;

/// The Simple Packet Block (SPB) is a lightweight container for storing
/// the packets coming from the network.
///
/// This block has no options area, so it cannot carry a comment.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplePacketBlock<'a> {
    /// Block type (little endian)
    pub block_type: u32,
    pub block_len1: u32,
    /// Original packet length
    pub origlen: u32,
    pub data: Cow<'a, [u8]>,
    pub block_len2: u32,
}

impl<'a> SimplePacketBlock<'a> {
    /// Packet data, without padding
    pub fn packet_data(&self) -> &[u8] {
        let caplen = self.origlen as usize;
        if caplen < self.data.len() {
            &self.data[..caplen]
        } else {
            &self.data
        }
    }

    pub fn into_owned(self) -> SimplePacketBlock<'static> {
        SimplePacketBlock {
            block_type: self.block_type,
            block_len1: self.block_len1,
            origlen: self.origlen,
            data: Cow::Owned(self.data.into_owned()),
            block_len2: self.block_len2,
        }
    }
}

impl<'a, En: PcapEndianness> PcapNGBlockParser<'a, En, SimplePacketBlock<'a>>
    for SimplePacketBlock<'a>
{
    const HDR_SZ: usize = 16;
    const MAGIC: u32 = SPB_MAGIC;

    fn inner_parse<E: ParseError<&'a [u8]>>(
        block_type: u32,
        block_len1: u32,
        i: &'a [u8],
        block_len2: u32,
    ) -> IResult<&'a [u8], SimplePacketBlock<'a>, E> {
        // caller function already tested header type(magic) and length
        // read end of header
        let (i, origlen) = En::parse_u32(i)?;
        let (i, data) = take((block_len1 as usize) - 16)(i)?;
        let block = SimplePacketBlock {
            block_type,
            block_len1,
            origlen,
            data: Cow::Borrowed(data),
            block_len2,
        };
        Ok((i, block))
    }
}

/// Parse a Simple Packet Block (little-endian)
///
/// *Note: this function does not remove padding in the `data` field.
/// Use `packet_data` to get field without padding.*
pub fn parse_simplepacketblock_le(i: &[u8]) -> IResult<&[u8], SimplePacketBlock, PcapError<&[u8]>> {
    ng_block_parser::<SimplePacketBlock, PcapLE, _, _>()(i)
}

/// Parse a Simple Packet Block (big-endian)
///
/// *Note: this function does not remove padding*
pub fn parse_simplepacketblock_be(i: &[u8]) -> IResult<&[u8], SimplePacketBlock, PcapError<&[u8]>> {
    ng_block_parser::<SimplePacketBlock, PcapBE, _, _>()(i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcapng::tests::FRAME_PCAPNG_SPB;

    #[test]
    fn test_parse_spb() {
        let (rem, spb) = parse_simplepacketblock_le(FRAME_PCAPNG_SPB).expect("spb");
        assert!(rem.is_empty());
        assert_eq!(spb.origlen, 5);
        assert_eq!(spb.packet_data(), b"hello");
        assert_eq!(spb.data.len(), 8);
    }
}
