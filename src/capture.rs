//! In-memory view of a capture file, as an ordered list of blocks

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, PcapError, Result};
use crate::pcapng::{Block, PcapNGOptionError, PcapNGReader, PcapNGSlice};
use crate::serialize::encode;

/// Default capacity of the reader buffer. The buffer grows if a block does not fit.
pub const DEFAULT_BUFFER_CAPACITY: usize = 65536;

/// Decode all blocks of a pcap-ng stream loaded into memory
///
/// Blocks borrow from `data`. The first block must be a Section Header Block.
pub fn decode(data: &[u8]) -> Result<Vec<Block>> {
    let format_error = |offset, e: PcapError<&[u8]>| Error::Format {
        offset,
        source: e.to_owned_vec(),
    };
    let mut slice = PcapNGSlice::from_slice(data).map_err(|e| format_error(0, e))?;
    let mut blocks = Vec::new();
    while let Some(block) = slice.next() {
        blocks.push(block.map_err(|e| format_error(slice.offset(), e))?);
    }
    Ok(blocks)
}

/// Return the packet blocks, with their 1-based packet number, in file order
///
/// Enhanced, Simple and (obsolete) Packet blocks are counted as packets.
pub fn packet_blocks<'b, 'a>(blocks: &'b [Block<'a>]) -> Vec<(usize, &'b Block<'a>)> {
    blocks
        .iter()
        .filter(|b| b.is_data_block())
        .enumerate()
        .map(|(idx, b)| (idx + 1, b))
        .collect()
}

/// Return the comment of packet `packet_number` (1-based)
///
/// Returns `Ok(None)` if the packet has no comment, or if its block cannot hold options.
pub fn get_comment<'b>(blocks: &'b [Block], packet_number: usize) -> Result<Option<&'b [u8]>> {
    let block = nth_packet(blocks, packet_number)?;
    Ok(block.comment())
}

fn check_range(packet_number: usize, count: usize) -> Result<()> {
    if packet_number < 1 || packet_number > count {
        return Err(Error::Range {
            requested: packet_number,
            count,
        });
    }
    Ok(())
}

fn nth_packet<'b, 'a>(blocks: &'b [Block<'a>], packet_number: usize) -> Result<&'b Block<'a>> {
    let packets = packet_blocks(blocks);
    check_range(packet_number, packets.len())?;
    Ok(packets[packet_number - 1].1)
}

// Add `delta` to the section length of the last Section Header Block of `preceding`, unless
// it is unspecified (-1)
fn update_section_len(preceding: &mut [Block], delta: i64) {
    let shb = preceding.iter_mut().rev().find_map(|b| match b {
        Block::SectionHeader(shb) => Some(shb),
        _ => None,
    });
    if let Some(shb) = shb {
        if shb.section_len != -1 {
            shb.section_len += delta;
        }
    }
}

/// A capture file loaded into memory
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    blocks: Vec<Block<'static>>,
}

impl Capture {
    /// Load a capture file, using the default buffer capacity
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Capture> {
        Self::load_with_capacity(path, DEFAULT_BUFFER_CAPACITY)
    }

    pub fn load_with_capacity<P: AsRef<Path>>(path: P, capacity: usize) -> Result<Capture> {
        let path = path.as_ref();
        let file = File::open(path).map_err(Error::io_path("open", path))?;
        Self::from_reader(file, capacity).map_err(|e| match e {
            Error::Io { source, .. } => Error::io_path("read", path)(source),
            e => e,
        })
    }

    /// Read all blocks from `reader`
    ///
    /// The reader buffer starts at `capacity` bytes and is doubled when a block does not fit.
    pub fn from_reader<R: Read>(reader: R, capacity: usize) -> Result<Capture> {
        let mut reader = PcapNGReader::new(capacity.max(64), reader);
        let mut blocks = Vec::new();
        loop {
            let offset = reader.consumed();
            match reader.next() {
                Ok((sz, block)) => {
                    blocks.push(block.into_owned());
                    reader.consume(sz);
                }
                Err(PcapError::Eof) => break,
                Err(PcapError::Incomplete(_)) => {
                    reader.refill().map_err(Error::io("read error"))?;
                }
                Err(PcapError::BufferTooSmall) => {
                    let new_size = reader.capacity() * 2;
                    reader.grow(new_size);
                    reader.refill().map_err(Error::io("read error"))?;
                }
                Err(e) => {
                    return Err(Error::Format {
                        offset,
                        source: e.to_owned_vec(),
                    })
                }
            }
        }
        Ok(Capture { blocks })
    }

    /// Build a capture from decoded blocks
    pub fn from_blocks(blocks: Vec<Block<'static>>) -> Capture {
        Capture { blocks }
    }

    pub fn blocks(&self) -> &[Block<'static>] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block<'static>> {
        self.blocks
    }

    /// Number of packet blocks
    pub fn packet_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_data_block()).count()
    }

    pub fn packet_blocks(&self) -> Vec<(usize, &Block<'static>)> {
        packet_blocks(&self.blocks)
    }

    /// Return the comment of packet `packet_number` (1-based), or `None` if it has none
    pub fn get_comment(&self, packet_number: usize) -> Result<Option<&[u8]>> {
        get_comment(&self.blocks, packet_number)
    }

    /// Set the comment of packet `packet_number` (1-based)
    ///
    /// The first comment option of the packet is replaced, or a new one is added. The block
    /// lengths are updated, as is the section length of its Section Header Block when it is
    /// specified. Other blocks are not modified.
    pub fn set_comment(&mut self, packet_number: usize, comment: &[u8]) -> Result<()> {
        let count = self.packet_count();
        check_range(packet_number, count)?;
        let (index, block) = self
            .blocks
            .iter_mut()
            .enumerate()
            .filter(|(_, b)| b.is_data_block())
            .nth(packet_number - 1)
            .ok_or(Error::Range {
                requested: packet_number,
                count,
            })?;
        let name = block.name();
        let old_len = block.block_len();
        block.set_comment(comment).map_err(|e| match e {
            PcapNGOptionError::NotSupported => Error::OptionsNotSupported {
                packet_number,
                block: name,
            },
            PcapNGOptionError::InvalidLength(len) => Error::CommentTooLong { len },
            PcapNGOptionError::BlockTooLong => Error::Serialize {
                index,
                reason: e.to_string(),
            },
        })?;
        let delta = i64::from(block.block_len()) - i64::from(old_len);
        update_section_len(&mut self.blocks[..index], delta);
        Ok(())
    }

    /// Serialize all blocks
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        encode(&self.blocks)
    }
}
