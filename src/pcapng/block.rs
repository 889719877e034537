use nom::bytes::streaming::take;
use nom::combinator::map;
use nom::error::*;
use nom::number::streaming::{be_u32, le_u32};
use nom::{Err, IResult};

use crate::endianness::PcapEndianness;
use crate::serialize::ToVec;
use crate::PcapError;

use super::*;

/// A block from a PcapNG file
#[derive(Debug, Clone, PartialEq)]
pub enum Block<'a> {
    SectionHeader(SectionHeaderBlock<'a>),
    InterfaceDescription(InterfaceDescriptionBlock<'a>),
    EnhancedPacket(EnhancedPacketBlock<'a>),
    SimplePacket(SimplePacketBlock<'a>),
    Packet(PacketBlock<'a>),
    Unknown(UnknownBlock<'a>),
}

impl<'a> Block<'a> {
    /// Returns true if blocks contains a network packet
    pub fn is_data_block(&self) -> bool {
        matches!(
            self,
            &Block::EnhancedPacket(_) | &Block::SimplePacket(_) | &Block::Packet(_)
        )
    }

    /// Return the normalized magic number of the block
    pub fn magic(&self) -> u32 {
        match self {
            Block::SectionHeader(_) => SHB_MAGIC,
            Block::InterfaceDescription(_) => IDB_MAGIC,
            Block::EnhancedPacket(_) => EPB_MAGIC,
            Block::SimplePacket(_) => SPB_MAGIC,
            Block::Packet(_) => PB_MAGIC,
            Block::Unknown(ub) => ub.block_type,
        }
    }

    /// Human-readable name of the block type
    pub fn name(&self) -> &'static str {
        match self {
            Block::SectionHeader(_) => "section header block",
            Block::InterfaceDescription(_) => "interface description block",
            Block::EnhancedPacket(_) => "enhanced packet block",
            Block::SimplePacket(_) => "simple packet block",
            Block::Packet(_) => "packet block",
            Block::Unknown(_) => "unknown block",
        }
    }

    /// Total length of the block, as stored in its header
    pub fn block_len(&self) -> u32 {
        match self {
            Block::SectionHeader(b) => b.block_len1,
            Block::InterfaceDescription(b) => b.block_len1,
            Block::EnhancedPacket(b) => b.block_len1,
            Block::SimplePacket(b) => b.block_len1,
            Block::Packet(b) => b.block_len1,
            Block::Unknown(b) => b.block_len1,
        }
    }

    /// Return the block options, or `None` if this block type has no options area
    pub fn options(&self) -> Option<&[PcapNGOption<'a>]> {
        match self {
            Block::SectionHeader(b) => Some(&b.options),
            Block::InterfaceDescription(b) => Some(&b.options),
            Block::EnhancedPacket(b) => Some(&b.options),
            Block::Packet(b) => Some(&b.options),
            Block::SimplePacket(_) | Block::Unknown(_) => None,
        }
    }

    fn options_mut(&mut self) -> Option<&mut Vec<PcapNGOption<'a>>> {
        match self {
            Block::SectionHeader(b) => Some(&mut b.options),
            Block::InterfaceDescription(b) => Some(&mut b.options),
            Block::EnhancedPacket(b) => Some(&mut b.options),
            Block::Packet(b) => Some(&mut b.options),
            Block::SimplePacket(_) | Block::Unknown(_) => None,
        }
    }

    /// Return the `opt_comment` value, if present
    ///
    /// If the option is present multiple times, the first value is returned.
    pub fn comment(&self) -> Option<&[u8]> {
        self.options()
            .and_then(|options| options_get_as_bytes(options, OptionCode::Comment))
    }

    /// Set the `opt_comment` value, replacing the first existing comment or adding a new one
    ///
    /// Block length fields are updated. Fails if the block type has no options area, if the
    /// comment is longer than 65535 bytes, or if the block length would not fit in 32 bits; the
    /// block is not modified in that case.
    pub fn set_comment(&mut self, comment: &[u8]) -> Result<(), PcapNGOptionError> {
        let options = self
            .options_mut()
            .ok_or(PcapNGOptionError::NotSupported)?;
        let previous = options.clone();
        options_set_bytes(options, OptionCode::Comment, comment)?;
        if self.fix().is_err() {
            if let Some(options) = self.options_mut() {
                *options = previous;
            }
            return Err(PcapNGOptionError::BlockTooLong);
        }
        Ok(())
    }

    /// Copy all borrowed data, giving a block with `'static` lifetime
    pub fn into_owned(self) -> Block<'static> {
        match self {
            Block::SectionHeader(b) => Block::SectionHeader(b.into_owned()),
            Block::InterfaceDescription(b) => Block::InterfaceDescription(b.into_owned()),
            Block::EnhancedPacket(b) => Block::EnhancedPacket(b.into_owned()),
            Block::SimplePacket(b) => Block::SimplePacket(b.into_owned()),
            Block::Packet(b) => Block::Packet(b.into_owned()),
            Block::Unknown(b) => Block::Unknown(b.into_owned()),
        }
    }
}

/// Parse any block, as little-endian
///
/// To find which endianess to use, read the section header
/// using `parse_sectionheaderblock`
pub fn parse_block_le(i: &[u8]) -> IResult<&[u8], Block, PcapError<&[u8]>> {
    match le_u32(i) {
        Ok((_, id)) => match id {
            SHB_MAGIC => map(parse_sectionheaderblock, Block::SectionHeader)(i),
            IDB_MAGIC => map(
                parse_interfacedescriptionblock_le,
                Block::InterfaceDescription,
            )(i),
            PB_MAGIC => map(parse_packetblock_le, Block::Packet)(i),
            SPB_MAGIC => map(parse_simplepacketblock_le, Block::SimplePacket)(i),
            EPB_MAGIC => map(parse_enhancedpacketblock_le, Block::EnhancedPacket)(i),
            _ => map(parse_unknownblock_le, Block::Unknown)(i),
        },
        Err(e) => Err(e),
    }
}

/// Parse any block, as big-endian
///
/// To find which endianess to use, read the section header
/// using `parse_sectionheaderblock`
pub fn parse_block_be(i: &[u8]) -> IResult<&[u8], Block, PcapError<&[u8]>> {
    match be_u32(i) {
        Ok((_, id)) => match id {
            SHB_MAGIC => map(parse_sectionheaderblock, Block::SectionHeader)(i),
            IDB_MAGIC => map(
                parse_interfacedescriptionblock_be,
                Block::InterfaceDescription,
            )(i),
            PB_MAGIC => map(parse_packetblock_be, Block::Packet)(i),
            SPB_MAGIC => map(parse_simplepacketblock_be, Block::SimplePacket)(i),
            EPB_MAGIC => map(parse_enhancedpacketblock_be, Block::EnhancedPacket)(i),
            _ => map(parse_unknownblock_be, Block::Unknown)(i),
        },
        Err(e) => Err(e),
    }
}

pub(crate) trait PcapNGBlockParser<'a, En: PcapEndianness, O: 'a> {
    /// Minimum header size, in bytes
    const HDR_SZ: usize;
    /// Little-endian magic number for this block type
    const MAGIC: u32;

    // caller function must have tested header type(magic) and both lengths
    fn inner_parse<E: ParseError<&'a [u8]>>(
        block_type: u32,
        block_len1: u32,
        i: &'a [u8],
        block_len2: u32,
    ) -> IResult<&'a [u8], O, E>;
}

/// Create a block parser function, given the parameters (block object and endianness)
pub(crate) fn ng_block_parser<'a, P, En, O, E>() -> impl FnMut(&'a [u8]) -> IResult<&'a [u8], O, E>
where
    P: PcapNGBlockParser<'a, En, O>,
    En: PcapEndianness,
    O: 'a,
    E: ParseError<&'a [u8]>,
{
    move |i: &'a [u8]| {
        // read generic block layout
        //
        if i.len() < P::HDR_SZ {
            return Err(Err::Incomplete(nom::Needed::new(P::HDR_SZ - i.len())));
        }
        let (i, block_type) = le_u32(i)?;
        let (i, block_len1) = En::parse_u32(i)?;
        if block_len1 < P::HDR_SZ as u32 || block_len1 % 4 != 0 {
            return Err(Err::Error(E::from_error_kind(i, ErrorKind::Verify)));
        }
        if P::MAGIC != 0 && En::native_u32(block_type) != P::MAGIC {
            return Err(Err::Error(E::from_error_kind(i, ErrorKind::Verify)));
        }
        // 12 is block_type (4) + block_len1 (4) + block_len2 (4)
        let (i, block_content) = take(block_len1 - 12)(i)?;
        let (i, block_len2) = En::parse_u32(i)?;
        if block_len2 != block_len1 {
            return Err(Err::Error(E::from_error_kind(i, ErrorKind::Verify)));
        }
        // call block content parsing function
        // the content is complete: running out of data means the inner lengths are inconsistent
        let (_, b) = P::inner_parse(block_type, block_len1, block_content, block_len2).map_err(
            |e| match e {
                Err::Incomplete(_) => {
                    Err::Error(E::from_error_kind(block_content, ErrorKind::Verify))
                }
                e => e,
            },
        )?;
        // return the remaining bytes from the container, not content
        Ok((i, b))
    }
}
