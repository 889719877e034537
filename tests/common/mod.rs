//! Builders for synthetic pcap-ng files
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const COMMENT: u16 = 1;

/// Writes blocks in one byte order. Padding bytes use `pad`, so that tests can check they are
/// preserved.
pub struct CaptureBuilder {
    big_endian: bool,
    pad: u8,
    out: Vec<u8>,
}

impl CaptureBuilder {
    pub fn le() -> Self {
        CaptureBuilder {
            big_endian: false,
            pad: 0,
            out: Vec::new(),
        }
    }

    pub fn be() -> Self {
        CaptureBuilder {
            big_endian: true,
            ..CaptureBuilder::le()
        }
    }

    /// Use `pad` for all padding bytes
    pub fn with_padding(mut self, pad: u8) -> Self {
        self.pad = pad;
        self
    }

    /// Continue with a new section, in the given byte order
    pub fn switch_endianness(mut self, big_endian: bool) -> Self {
        self.big_endian = big_endian;
        self
    }

    fn u16(&self, v: u16) -> [u8; 2] {
        if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        }
    }

    fn u32(&self, v: u32) -> [u8; 4] {
        if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        }
    }

    fn padded(&self, body: &mut Vec<u8>, data: &[u8]) {
        body.extend_from_slice(data);
        while body.len() % 4 != 0 {
            body.push(self.pad);
        }
    }

    fn options(&self, body: &mut Vec<u8>, options: &[(u16, &[u8])]) {
        if options.is_empty() {
            return;
        }
        for (code, value) in options {
            body.extend_from_slice(&self.u16(*code));
            body.extend_from_slice(&self.u16(value.len() as u16));
            self.padded(body, value);
        }
        body.extend_from_slice(&[0, 0, 0, 0]);
    }

    fn block(mut self, block_type: u32, body: Vec<u8>) -> Self {
        let len = (12 + body.len()) as u32;
        let block_type = self.u32(block_type);
        let len = self.u32(len);
        self.out.extend_from_slice(&block_type);
        self.out.extend_from_slice(&len);
        self.out.extend_from_slice(&body);
        self.out.extend_from_slice(&len);
        self
    }

    /// Section Header Block, with a `shb_userappl` option and an unspecified section length
    pub fn shb(self) -> Self {
        self.shb_with_section_len(-1)
    }

    /// Section Header Block recording `section_len` bytes of following blocks
    pub fn shb_with_section_len(self, section_len: i64) -> Self {
        let mut body = Vec::new();
        body.extend_from_slice(&self.u32(0x1A2B_3C4D));
        body.extend_from_slice(&self.u16(1));
        body.extend_from_slice(&self.u16(0));
        if self.big_endian {
            body.extend_from_slice(&section_len.to_be_bytes());
        } else {
            body.extend_from_slice(&section_len.to_le_bytes());
        }
        self.options(&mut body, &[(4, b"builder")]);
        self.block(0x0A0D_0D0A, body)
    }

    /// Interface Description Block, ethernet
    pub fn idb(self) -> Self {
        let mut body = Vec::new();
        body.extend_from_slice(&self.u16(1));
        body.extend_from_slice(&self.u16(0));
        body.extend_from_slice(&self.u32(65535));
        self.options(&mut body, &[(2, b"eth0"), (9, &[6])]);
        self.block(1, body)
    }

    /// Enhanced Packet Block on interface 0
    pub fn epb(self, data: &[u8], options: &[(u16, &[u8])]) -> Self {
        let mut body = Vec::new();
        body.extend_from_slice(&self.u32(0));
        body.extend_from_slice(&self.u32(0x0005_8a1c));
        body.extend_from_slice(&self.u32(0x1234_5678));
        body.extend_from_slice(&self.u32(data.len() as u32));
        body.extend_from_slice(&self.u32(data.len() as u32));
        self.padded(&mut body, data);
        self.options(&mut body, options);
        self.block(6, body)
    }

    /// Simple Packet Block
    pub fn spb(self, data: &[u8]) -> Self {
        let mut body = Vec::new();
        body.extend_from_slice(&self.u32(data.len() as u32));
        self.padded(&mut body, data);
        self.block(3, body)
    }

    /// Interface Statistics Block, which is kept as an unknown block
    pub fn isb(self) -> Self {
        let mut body = Vec::new();
        body.extend_from_slice(&self.u32(0));
        body.extend_from_slice(&self.u32(0x0005_8a1c));
        body.extend_from_slice(&self.u32(0x1234_9999));
        self.options(&mut body, &[(4, &42u64.to_le_bytes())]);
        self.block(5, body)
    }

    /// Custom Block with the given private enterprise number
    pub fn custom(self, pen: u32, payload: &[u8]) -> Self {
        let mut body = Vec::new();
        body.extend_from_slice(&self.u32(pen));
        self.padded(&mut body, payload);
        self.block(0x0000_0BAD, body)
    }

    pub fn build(self) -> Vec<u8> {
        self.out
    }
}

/// A little-endian file with 4 packets (EPB, SPB, EPB with comment "original", EPB), and some
/// blocks that are not modelled
pub fn sample_capture() -> Vec<u8> {
    CaptureBuilder::le()
        .with_padding(0xAA)
        .shb()
        .idb()
        .epb(b"first packet", &[])
        .custom(32473, b"vendor data")
        .spb(b"simple")
        .epb(b"third", &[(COMMENT, b"original"), (0x0BAC, b"custom option")])
        .isb()
        .epb(b"fourth!", &[(2, b"\x00\x00\x00\x01")])
        .build()
}

pub fn write_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, data).expect("write capture");
    path
}

pub fn dir_len(dir: &Path) -> usize {
    fs::read_dir(dir).expect("read_dir").count()
}
