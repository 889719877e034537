use cookie_factory::bytes::{be_i64, be_u16, be_u32, le_i64, le_u16, le_u32};
use cookie_factory::{SerializeFn, WriteContext};
use nom::error::ParseError;
use nom::number::streaming;
use nom::IResult;
use std::io::Write;

pub(crate) struct PcapBE;
pub(crate) struct PcapLE;

pub(crate) trait PcapEndianness {
    /// Convert a block type read as little-endian to the section byte order
    fn native_u32(n: u32) -> u32;

    fn parse_u16<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u16, E>;
    fn parse_u32<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u32, E>;
    fn parse_i64<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], i64, E>;
}

impl PcapEndianness for PcapBE {
    #[inline]
    fn native_u32(n: u32) -> u32 {
        n.swap_bytes()
    }

    #[inline]
    fn parse_u16<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u16, E> {
        streaming::be_u16(i)
    }

    #[inline]
    fn parse_u32<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u32, E> {
        streaming::be_u32(i)
    }

    #[inline]
    fn parse_i64<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], i64, E> {
        streaming::be_i64(i)
    }
}

impl PcapEndianness for PcapLE {
    #[inline]
    fn native_u32(n: u32) -> u32 {
        n
    }

    #[inline]
    fn parse_u16<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u16, E> {
        streaming::le_u16(i)
    }

    #[inline]
    fn parse_u32<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], u32, E> {
        streaming::le_u32(i)
    }

    #[inline]
    fn parse_i64<'a, E: ParseError<&'a [u8]>>(i: &'a [u8]) -> IResult<&'a [u8], i64, E> {
        streaming::le_i64(i)
    }
}

// Writers follow the byte order of the current section, chosen at runtime.

pub(crate) fn gen_u16<W: Write>(v: u16, big_endian: bool) -> impl SerializeFn<W> {
    move |out: WriteContext<W>| {
        if big_endian {
            be_u16(v)(out)
        } else {
            le_u16(v)(out)
        }
    }
}

pub(crate) fn gen_u32<W: Write>(v: u32, big_endian: bool) -> impl SerializeFn<W> {
    move |out: WriteContext<W>| {
        if big_endian {
            be_u32(v)(out)
        } else {
            le_u32(v)(out)
        }
    }
}

pub(crate) fn gen_i64<W: Write>(v: i64, big_endian: bool) -> impl SerializeFn<W> {
    move |out: WriteContext<W>| {
        if big_endian {
            be_i64(v)(out)
        } else {
            le_i64(v)(out)
        }
    }
}
