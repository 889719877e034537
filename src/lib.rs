//! # PCAPNG packet comments
//!
//! This crate adds comments to packets of PCAPNG capture files, and reads them back.
//!
//! Capture files are decoded into an ordered list of blocks, and written back byte for byte:
//! only the comment option of the edited packet changes. Blocks that are not modelled (name
//! resolution, statistics, custom blocks, etc.) are kept as opaque data, and files with several
//! sections of different endianness are supported.
//!
//! Packets are numbered from 1, in file order, counting Enhanced, Simple and (obsolete) Packet
//! blocks. Simple Packet Blocks have no options, so they cannot hold a comment.
//!
//! # Example: annotating a file
//!
//! ```rust,no_run
//! use pcapng_annotate::{add_comment, read_comment};
//!
//! # fn main() -> Result<(), pcapng_annotate::Error> {
//! // the input file is not modified, the result is written to a new file
//! let output = add_comment("capture.pcapng", 3, "retransmission")?;
//! let c = read_comment(&output, 3)?;
//! assert_eq!(c.comment, "retransmission");
//! # Ok(())
//! # }
//! ```
//!
//! # Example: working on blocks
//!
//! The [`Capture`] type gives access to the blocks, and [`pcapng`] contains the block parsers.
//!
//! ```rust,no_run
//! use pcapng_annotate::{save, Capture};
//!
//! # fn main() -> Result<(), pcapng_annotate::Error> {
//! let mut capture = Capture::load("capture.pcapng")?;
//! for (n, block) in capture.packet_blocks() {
//!     println!("packet {}: {} ({} bytes)", n, block.name(), block.block_len());
//! }
//! capture.set_comment(1, b"first packet")?;
//! save("annotated.pcapng", capture.blocks())?;
//! # Ok(())
//! # }
//! ```

mod endianness;
mod error;
pub use error::*;

pub mod pcapng;
pub use pcapng::*;

pub mod serialize;
pub use serialize::{encode, ToVec};

mod annotate;
mod capture;
mod request;
mod writer;
pub use annotate::*;
pub use capture::*;
pub use request::*;
pub use writer::*;
