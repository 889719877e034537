//! PCAPNG file format
//!
//! See <https://github.com/pcapng/pcapng> for details.
//!
//! There are two ways of decoding a PCAPNG stream with this module. The first is to use
//! [`PcapNGSlice`] (or [`decode`](crate::decode)) on data already loaded into memory:
//! blocks borrow from the input and no data is copied.
//!
//! The second is to use a [`PcapNGReader`], which reads blocks from any `io::Read` through a
//! circular buffer. Blocks returned by the reader borrow from its buffer, and must be converted
//! with [`Block::into_owned`] to be kept after the next call to `consume`.
//!
//! ## File format and parsing
//!
//! A capture file is organized in blocks. Blocks are organized in sections, each section
//! starting with a Section Header Block (SHB), and followed by blocks (interface description,
//! packets, etc.).
//! A file is usually composed of one section, but can contain multiple sections. When a SHB is
//! encountered, this means a new section starts.
//!
//! Every block is decoded so that it can be written back byte for byte: option values keep their
//! padding, and blocks whose type is not modelled are kept as opaque [`UnknownBlock`]s.
//!
//! ## Endianness
//!
//! The endianness of a block is indicated by the Section Header Block that started the section
//! containing this block. Since a file can contain several sections, a single file can contain
//! both endianness variants.

mod block;
mod capture;
mod enhanced_packet;
mod interface_description;
mod option;
mod packet;
mod reader;
mod section_header;
mod simple_packet;
mod unknown;

pub use block::*;
pub use capture::*;
pub use enhanced_packet::*;
pub use interface_description::*;
pub use option::*;
pub use packet::*;
pub use reader::*;
pub use section_header::*;
pub use simple_packet::*;
pub use unknown::*;

/// Section Header Block magic
pub const SHB_MAGIC: u32 = 0x0A0D_0D0A;
/// Interface Description Block magic
pub const IDB_MAGIC: u32 = 0x0000_0001;
/// Packet Block magic (obsolete)
pub const PB_MAGIC: u32 = 0x0000_0002;
/// Simple Packet Block magic
pub const SPB_MAGIC: u32 = 0x0000_0003;
/// Enhanced Packet Block magic
pub const EPB_MAGIC: u32 = 0x0000_0006;

/// Custom Block magic
pub const CB_MAGIC: u32 = 0x0000_0BAD;

/// Byte Order magic
pub const BOM_MAGIC: u32 = 0x1A2B_3C4D;

/// Byte order of the section being read or written
#[derive(Default)]
pub(crate) struct CurrentSectionInfo {
    /// `None` until the first Section Header Block
    pub(crate) big_endian: Option<bool>,
}
