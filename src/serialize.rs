//! Serialization of pcap-ng blocks
//!
//! Blocks are written in the byte order of their section. Fields are written as they are stored,
//! so a block that was decoded and not modified is written back unchanged. After modifying a
//! block, call [`ToVec::fix`] to update its length fields.

use crate::endianness::{gen_i64, gen_u16, gen_u32};
use crate::error::{Error, Result};
use crate::pcapng::*;
use cookie_factory::bytes::le_u32;
use cookie_factory::combinator::slice;
use cookie_factory::multi::many_ref;
use cookie_factory::sequence::tuple;
use cookie_factory::{gen, GenError, SerializeFn};
use rusticata_macros::align32;
use std::io::Write;

/// Common trait for all serialization functions
pub trait ToVec {
    /// Serialize to bytes representation, using the given section byte order.
    /// Fix all length fields before serializing.
    fn to_vec(&mut self, big_endian: bool) -> std::result::Result<Vec<u8>, GenError> {
        self.fix()?;
        self.to_vec_raw(big_endian)
    }

    /// Recompute the length fields from the block contents
    ///
    /// Fails without modifying the block if its length does not fit in 32 bits.
    fn fix(&mut self) -> std::result::Result<(), GenError> {
        Ok(())
    }

    /// Serialize to bytes representation, using the given section byte order. Do not check values
    fn to_vec_raw(&self, big_endian: bool) -> std::result::Result<Vec<u8>, GenError>;
}

fn padding_for<'a, W: Write + 'a>(unaligned_length: u32) -> impl SerializeFn<W> + 'a {
    let length = align32!(unaligned_length) - unaligned_length;
    slice(if length > 0 {
        &[0, 0, 0, 0][..length as usize]
    } else {
        b""
    })
}

impl<'a> ToVec for PcapNGOption<'a> {
    fn to_vec_raw(&self, big_endian: bool) -> std::result::Result<Vec<u8>, GenError> {
        let mut v = Vec::with_capacity(align32!(4 + self.value.len()));
        gen(pcapngoption(self, big_endian), &mut v)?;
        Ok(v)
    }
}

fn pcapngoption<'a, 'b: 'a, W: Write + 'a>(
    i: &'b PcapNGOption,
    big_endian: bool,
) -> impl SerializeFn<W> + 'a {
    tuple((
        gen_u16(i.code.0, big_endian),
        gen_u16(i.len, big_endian),
        slice(&i.value),
        padding_for(i.value.len() as u32),
    ))
}

fn block_length(
    fixed: usize,
    data_len: usize,
    options: &[PcapNGOption],
) -> std::result::Result<u32, GenError> {
    let length = fixed + align32!(data_len) + options_length(options);
    u32::try_from(length).map_err(|_| GenError::BufferTooBig(length))
}

impl<'a> ToVec for SectionHeaderBlock<'a> {
    fn fix(&mut self) -> std::result::Result<(), GenError> {
        let length = block_length(28, 0, &self.options)?;
        self.block_len1 = length;
        self.block_len2 = length;
        Ok(())
    }

    /// The byte order is given by the byte-order magic, `big_endian` is ignored
    fn to_vec_raw(&self, _big_endian: bool) -> std::result::Result<Vec<u8>, GenError> {
        let be = self.big_endian();
        let mut v = Vec::with_capacity(self.block_len1 as usize);
        gen(
            tuple((
                le_u32(self.block_type),
                gen_u32(self.block_len1, be),
                le_u32(self.bom),
                gen_u16(self.major_version, be),
                gen_u16(self.minor_version, be),
                gen_i64(self.section_len, be),
                many_ref(&self.options, |o| pcapngoption(o, be)),
                gen_u32(self.block_len2, be),
            )),
            &mut v,
        )?;
        Ok(v)
    }
}

impl<'a> ToVec for InterfaceDescriptionBlock<'a> {
    fn fix(&mut self) -> std::result::Result<(), GenError> {
        let length = block_length(20, 0, &self.options)?;
        self.block_len1 = length;
        self.block_len2 = length;
        Ok(())
    }

    fn to_vec_raw(&self, be: bool) -> std::result::Result<Vec<u8>, GenError> {
        let mut v = Vec::with_capacity(self.block_len1 as usize);
        gen(
            tuple((
                le_u32(self.block_type),
                gen_u32(self.block_len1, be),
                gen_u16(self.linktype, be),
                gen_u16(self.reserved, be),
                gen_u32(self.snaplen, be),
                many_ref(&self.options, |o| pcapngoption(o, be)),
                gen_u32(self.block_len2, be),
            )),
            &mut v,
        )?;
        Ok(v)
    }
}

impl<'a> ToVec for EnhancedPacketBlock<'a> {
    fn fix(&mut self) -> std::result::Result<(), GenError> {
        let length = block_length(32, self.data.len(), &self.options)?;
        self.block_len1 = length;
        self.block_len2 = length;
        Ok(())
    }

    fn to_vec_raw(&self, be: bool) -> std::result::Result<Vec<u8>, GenError> {
        let mut v = Vec::with_capacity(self.block_len1 as usize);
        gen(
            tuple((
                le_u32(self.block_type),
                gen_u32(self.block_len1, be),
                gen_u32(self.if_id, be),
                gen_u32(self.ts_high, be),
                gen_u32(self.ts_low, be),
                gen_u32(self.caplen, be),
                gen_u32(self.origlen, be),
                slice(&self.data),
                padding_for(self.data.len() as u32),
                many_ref(&self.options, |o| pcapngoption(o, be)),
                gen_u32(self.block_len2, be),
            )),
            &mut v,
        )?;
        Ok(v)
    }
}

impl<'a> ToVec for PacketBlock<'a> {
    fn fix(&mut self) -> std::result::Result<(), GenError> {
        let length = block_length(32, self.data.len(), &self.options)?;
        self.block_len1 = length;
        self.block_len2 = length;
        Ok(())
    }

    fn to_vec_raw(&self, be: bool) -> std::result::Result<Vec<u8>, GenError> {
        let mut v = Vec::with_capacity(self.block_len1 as usize);
        gen(
            tuple((
                le_u32(self.block_type),
                gen_u32(self.block_len1, be),
                gen_u16(self.if_id, be),
                gen_u16(self.drops_count, be),
                gen_u32(self.ts_high, be),
                gen_u32(self.ts_low, be),
                gen_u32(self.caplen, be),
                gen_u32(self.origlen, be),
                slice(&self.data),
                padding_for(self.data.len() as u32),
                many_ref(&self.options, |o| pcapngoption(o, be)),
                gen_u32(self.block_len2, be),
            )),
            &mut v,
        )?;
        Ok(v)
    }
}

impl<'a> ToVec for SimplePacketBlock<'a> {
    fn fix(&mut self) -> std::result::Result<(), GenError> {
        let length = block_length(16, self.data.len(), &[])?;
        self.block_len1 = length;
        self.block_len2 = length;
        Ok(())
    }

    fn to_vec_raw(&self, be: bool) -> std::result::Result<Vec<u8>, GenError> {
        let mut v = Vec::with_capacity(self.block_len1 as usize);
        gen(
            tuple((
                le_u32(self.block_type),
                gen_u32(self.block_len1, be),
                gen_u32(self.origlen, be),
                slice(&self.data),
                padding_for(self.data.len() as u32),
                gen_u32(self.block_len2, be),
            )),
            &mut v,
        )?;
        Ok(v)
    }
}

impl<'a> ToVec for UnknownBlock<'a> {
    fn fix(&mut self) -> std::result::Result<(), GenError> {
        // do not touch type, it is unknown
        let length = block_length(12, self.data.len(), &[])?;
        self.block_len1 = length;
        self.block_len2 = length;
        Ok(())
    }

    fn to_vec_raw(&self, be: bool) -> std::result::Result<Vec<u8>, GenError> {
        let mut v = Vec::with_capacity(self.block_len1 as usize);
        gen(
            tuple((
                gen_u32(self.block_type, be),
                gen_u32(self.block_len1, be),
                slice(&self.data),
                padding_for(self.data.len() as u32),
                gen_u32(self.block_len2, be),
            )),
            &mut v,
        )?;
        Ok(v)
    }
}

impl<'a> ToVec for Block<'a> {
    fn fix(&mut self) -> std::result::Result<(), GenError> {
        match self {
            Block::SectionHeader(b) => b.fix(),
            Block::InterfaceDescription(b) => b.fix(),
            Block::EnhancedPacket(b) => b.fix(),
            Block::SimplePacket(b) => b.fix(),
            Block::Packet(b) => b.fix(),
            Block::Unknown(b) => b.fix(),
        }
    }

    fn to_vec_raw(&self, big_endian: bool) -> std::result::Result<Vec<u8>, GenError> {
        match self {
            Block::SectionHeader(b) => b.to_vec_raw(big_endian),
            Block::InterfaceDescription(b) => b.to_vec_raw(big_endian),
            Block::EnhancedPacket(b) => b.to_vec_raw(big_endian),
            Block::SimplePacket(b) => b.to_vec_raw(big_endian),
            Block::Packet(b) => b.to_vec_raw(big_endian),
            Block::Unknown(b) => b.to_vec_raw(big_endian),
        }
    }
}

/// Serialize a list of blocks
///
/// Each block is written in the byte order of the last Section Header Block before it. Blocks
/// are written as they are: length fields of modified blocks must have been fixed.
pub fn encode(blocks: &[Block]) -> Result<Vec<u8>> {
    let total = blocks.iter().map(|b| b.block_len() as usize).sum();
    let mut out = Vec::with_capacity(total);
    let mut info = CurrentSectionInfo::default();
    for (index, block) in blocks.iter().enumerate() {
        if let Block::SectionHeader(ref shb) = block {
            info.big_endian = Some(shb.big_endian());
        }
        let v = block
            .to_vec_raw(info.big_endian.unwrap_or(false))
            .map_err(|e| Error::Serialize {
                index,
                reason: format!("{:?}", e),
            })?;
        out.extend_from_slice(&v);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use crate::pcapng::tests::*;
    use crate::pcapng::*;
    use crate::serialize::{block_length, encode, ToVec};

    fn frame_should_not_be_fixed(frame: &[u8], big_endian: bool) {
        let parse = if big_endian {
            parse_block_be
        } else {
            parse_block_le
        };
        let (rem, mut pkt) = parse(frame).expect("packet parsing failed");
        assert!(rem.is_empty());
        assert_eq!(pkt.to_vec(big_endian).unwrap(), frame);
    }

    #[test]
    fn test_blocks_not_fixed() {
        frame_should_not_be_fixed(FRAME_PCAPNG_SHB, false);
        frame_should_not_be_fixed(FRAME_PCAPNG_SHB_BE, true);
        frame_should_not_be_fixed(FRAME_PCAPNG_IDB, false);
        frame_should_not_be_fixed(FRAME_PCAPNG_EPB, false);
        frame_should_not_be_fixed(FRAME_PCAPNG_EPB_WITH_OPTIONS, false);
        frame_should_not_be_fixed(FRAME_PCAPNG_EPB_BE, true);
        frame_should_not_be_fixed(FRAME_PCAPNG_SPB, false);
        frame_should_not_be_fixed(FRAME_PCAPNG_PB, false);
        frame_should_not_be_fixed(FRAME_PCAPNG_CUSTOM, false);
    }

    #[test]
    fn test_block_length_overflow() {
        assert!(matches!(block_length(32, 5, &[]), Ok(40)));
        let options = vec![PcapNGOption::end_of_options()];
        assert!(matches!(block_length(20, 0, &options), Ok(24)));
        assert!(block_length(32, u32::MAX as usize, &[]).is_err());
    }

    #[test]
    fn test_unknown_block_be() {
        let mut frame = FRAME_PCAPNG_CUSTOM.to_vec();
        frame[..4].reverse();
        frame[4..8].reverse();
        frame[16..20].reverse();
        let (_, block) = parse_block_be(&frame).expect("unknown block");
        assert_eq!(block.magic(), CB_MAGIC);
        assert_eq!(block.to_vec_raw(true).unwrap(), frame);
    }

    #[test]
    fn test_serialize_shb_options() {
        let mut shb = SectionHeaderBlock {
            block_type: SHB_MAGIC,
            block_len1: 0,
            bom: BOM_MAGIC,
            major_version: 1,
            minor_version: 0,
            section_len: -1,
            options: vec![
                // Unaligned option length
                PcapNGOption {
                    code: OptionCode::ShbUserAppl,
                    len: 5,
                    value: Cow::Borrowed(b"meows"),
                },
                PcapNGOption::end_of_options(),
            ],
            block_len2: 0,
        };
        let v = shb.to_vec(false).expect("serialize");
        assert_eq!(v.len(), 28 + 12 + 4);
        let (rem, res) = parse_sectionheaderblock_le(&v).expect("parse");
        assert!(rem.is_empty());
        assert_eq!(res.user_application().as_deref(), Some("meows"));
        assert_eq!(res.block_len1, 44);
    }

    #[test]
    fn test_serialize_epb_with_new_comment() {
        let (_, mut block) = parse_block_le(FRAME_PCAPNG_EPB).expect("epb");
        block.set_comment(b"abc").expect("comment");
        let v = block.to_vec_raw(false).expect("serialize");
        assert_eq!(v.len(), FRAME_PCAPNG_EPB.len() + 12);
        // packet data is unchanged
        assert_eq!(&v[8..112], &FRAME_PCAPNG_EPB[8..112]);
        let (rem, epb) = parse_enhancedpacketblock_le(&v).expect("parse");
        assert!(rem.is_empty());
        assert_eq!(
            options_get_as_bytes(&epb.options, OptionCode::Comment),
            Some(&b"abc"[..])
        );
    }

    #[test]
    fn test_serialize_epb_replace_comment() {
        let (_, mut block) = parse_block_le(FRAME_PCAPNG_EPB_WITH_OPTIONS).expect("epb");
        let n_options = block.options().map(|o| o.len());
        block.set_comment(b"a longer comment").expect("comment");
        assert_eq!(block.options().map(|o| o.len()), n_options);
        let v = block.to_vec_raw(false).expect("serialize");
        // the "test009-1" option took 16 bytes, the new one takes 20
        assert_eq!(v.len(), FRAME_PCAPNG_EPB_WITH_OPTIONS.len() + 4);
        let (_, reparsed) = parse_block_le(&v).expect("parse");
        assert_eq!(reparsed.comment(), Some(&b"a longer comment"[..]));
        assert_eq!(reparsed, block);
    }

    #[test]
    fn test_serialize_be_comment() {
        let (_, mut block) = parse_block_be(FRAME_PCAPNG_EPB_BE).expect("epb");
        block.set_comment(b"big").expect("comment");
        let v = block.to_vec_raw(true).expect("serialize");
        assert_eq!(&v[4..8], &[0, 0, 0, 0x34]);
        assert_eq!(&v[36..44], &[0, 1, 0, 3, b'b', b'i', b'g', 0]);
        let (_, reparsed) = parse_block_be(&v).expect("parse");
        assert_eq!(reparsed.comment(), Some(&b"big"[..]));
    }

    #[test]
    fn test_encode_sections() {
        let data = [
            FRAME_PCAPNG_SHB,
            FRAME_PCAPNG_IDB,
            FRAME_PCAPNG_EPB,
            FRAME_PCAPNG_SHB_BE,
            FRAME_PCAPNG_EPB_BE,
        ]
        .concat();
        let blocks = PcapNGSlice::from_slice(&data)
            .expect("slice")
            .collect::<Result<Vec<_>, _>>()
            .expect("blocks");
        assert_eq!(encode(&blocks).expect("encode"), data);
    }
}
