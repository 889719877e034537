use crate::error::PcapError;
use crate::pcapng::*;
use circular::Buffer;
use nom::combinator::map;
use nom::{IResult, Needed, Offset};
use std::io::{self, Read};

/// Parsing iterator over pcap-ng data (streaming version)
///
/// ## Pcap-NG Reader
///
/// This reader is a streaming parser based on a circular buffer.
/// It creates an abstraction over any input providing the `Read` trait, and takes care
/// of managing the circular buffer to provide an iterator-like interface.
///
/// The first call to `next` must return a Section Header Block (SHB), marking the start of a
/// new section. Any other first block fails with `HeaderNotRecognized`, as does an empty input.
///
/// The size of the circular buffer has to be big enough for at least one complete block. If it is
/// not, `next` returns `BufferTooSmall` and the buffer can be enlarged with `grow`.
///
/// Blocks borrow from the reader buffer: they must be used (or converted with
/// [`Block::into_owned`]) before calling `consume`.
///
/// ## Example
///
/// ```rust
/// use pcapng_annotate::pcapng::*;
/// use pcapng_annotate::PcapError;
///
/// # let data: &[u8] = &[
/// #     0x0a, 0x0d, 0x0d, 0x0a, 0x1c, 0x00, 0x00, 0x00, 0x4d, 0x3c, 0x2b, 0x1a, 0x01, 0x00,
/// #     0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x1c, 0x00, 0x00, 0x00,
/// # ];
/// let mut reader = PcapNGReader::new(65536, data);
/// let mut num_blocks = 0;
/// loop {
///     match reader.next() {
///         Ok((offset, block)) => {
///             num_blocks += 1;
///             if let Block::SectionHeader(ref shb) = block {
///                 assert!(!shb.big_endian());
///             }
///             reader.consume(offset);
///         }
///         Err(PcapError::Eof) => break,
///         Err(PcapError::Incomplete(_)) => {
///             reader.refill().expect("Could not refill reader");
///         }
///         Err(e) => panic!("error while reading: {:?}", e),
///     }
/// }
/// assert_eq!(num_blocks, 1);
/// ```
pub struct PcapNGReader<R>
where
    R: Read,
{
    info: CurrentSectionInfo,
    reader: R,
    buffer: Buffer,
    consumed: usize,
    reader_exhausted: bool,
}

impl<R> PcapNGReader<R>
where
    R: Read,
{
    /// Creates a new `PcapNGReader<R>` with the provided buffer capacity.
    ///
    /// No data is read before the first call to `refill`.
    pub fn new(capacity: usize, reader: R) -> PcapNGReader<R> {
        let buffer = Buffer::with_capacity(capacity);
        Self::from_buffer(buffer, reader)
    }

    /// Creates a new `PcapNGReader<R>` using the provided `Buffer`.
    pub fn from_buffer(buffer: Buffer, reader: R) -> PcapNGReader<R> {
        PcapNGReader {
            info: CurrentSectionInfo::default(),
            reader,
            buffer,
            consumed: 0,
            reader_exhausted: false,
        }
    }

    /// Get the next block, and the number of bytes it uses in the buffer
    ///
    /// `Incomplete` means that more data is needed: call `refill` and try again.
    pub fn next(&mut self) -> Result<(usize, Block), PcapError<&[u8]>> {
        // Return EOF if
        // 1) all bytes have been read
        // 2) no more data is available
        if self.buffer.available_data() == 0 && self.reader_exhausted {
            if self.info.big_endian.is_none() {
                return Err(PcapError::HeaderNotRecognized);
            }
            return Err(PcapError::Eof);
        }
        let data = self.buffer.data();
        let parse = match self.info.big_endian {
            None => parse_first_block,
            Some(true) => parse_block_be,
            Some(false) => parse_block_le,
        };
        match parse(data) {
            Ok((rem, b)) => {
                let offset = data.offset(rem);
                if let Block::SectionHeader(ref shb) = b {
                    self.info.big_endian = Some(shb.big_endian());
                }
                Ok((offset, b))
            }
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(e),
            Err(nom::Err::Incomplete(n)) => {
                if self.reader_exhausted {
                    // expected more bytes but reader is EOF, truncated pcap?
                    Err(PcapError::UnexpectedEof)
                } else {
                    match n {
                        Needed::Size(n) => {
                            if self.buffer.available_data() + usize::from(n)
                                > self.buffer.capacity()
                            {
                                Err(PcapError::BufferTooSmall)
                            } else {
                                Err(PcapError::Incomplete(n.into()))
                            }
                        }
                        Needed::Unknown => Err(PcapError::Incomplete(0)),
                    }
                }
            }
        }
    }

    /// Mark `offset` bytes of the buffer as used
    pub fn consume(&mut self, offset: usize) {
        self.consumed += offset;
        self.buffer.consume(offset);
    }

    /// Total number of bytes consumed, which is the offset of the next block in the stream
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Shift the buffer and read more data from the underlying reader
    pub fn refill(&mut self) -> io::Result<()> {
        self.buffer.shift();
        let space = self.buffer.space();
        // check if available space is empty, so we can distinguish
        // a read() returning 0 because of EOF or because we requested 0
        if space.is_empty() {
            return Ok(());
        }
        let sz = loop {
            match self.reader.read(space) {
                Ok(sz) => break sz,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        self.reader_exhausted = sz == 0;
        self.buffer.fill(sz);
        Ok(())
    }

    /// Current capacity of the buffer
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Enlarge the buffer. Returns false if `new_size` is not larger than the current capacity
    pub fn grow(&mut self, new_size: usize) -> bool {
        self.buffer.grow(new_size)
    }

    pub fn reader_exhausted(&self) -> bool {
        self.reader_exhausted
    }
}

fn parse_first_block(i: &[u8]) -> IResult<&[u8], Block, PcapError<&[u8]>> {
    map(parse_sectionheaderblock, Block::SectionHeader)(i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcapng::tests::*;

    // Read all blocks, refilling as needed. `None` for a block means `BufferTooSmall`
    fn read_all<R: Read>(reader: &mut PcapNGReader<R>) -> Result<Vec<Option<u32>>, PcapError<Vec<u8>>> {
        let mut magics = Vec::new();
        loop {
            match reader.next() {
                Ok((offset, block)) => {
                    magics.push(Some(block.magic()));
                    reader.consume(offset);
                }
                Err(PcapError::Eof) => return Ok(magics),
                Err(PcapError::Incomplete(_)) => reader.refill().expect("refill"),
                Err(PcapError::BufferTooSmall) => {
                    magics.push(None);
                    let sz = reader.capacity() * 2;
                    assert!(reader.grow(sz));
                    reader.refill().expect("refill");
                }
                Err(e) => return Err(e.to_owned_vec()),
            }
        }
    }

    #[test]
    fn test_reader_blocks() {
        let data = [FRAME_PCAPNG_SHB, FRAME_PCAPNG_IDB, FRAME_PCAPNG_EPB].concat();
        let mut reader = PcapNGReader::new(65536, &data[..]);
        let magics = read_all(&mut reader).expect("blocks");
        assert_eq!(magics, vec![Some(SHB_MAGIC), Some(IDB_MAGIC), Some(EPB_MAGIC)]);
        assert_eq!(reader.consumed(), data.len());
    }

    #[test]
    fn test_reader_grows_buffer() {
        let data = [FRAME_PCAPNG_SHB, FRAME_PCAPNG_EPB_WITH_OPTIONS].concat();
        let mut reader = PcapNGReader::new(64, &data[..]);
        let magics = read_all(&mut reader).expect("blocks");
        assert!(magics.contains(&None));
        let magics: Vec<_> = magics.into_iter().flatten().collect();
        assert_eq!(magics, vec![SHB_MAGIC, EPB_MAGIC]);
    }

    #[test]
    fn test_reader_truncated() {
        let data = [FRAME_PCAPNG_SHB, &FRAME_PCAPNG_EPB[..50]].concat();
        let mut reader = PcapNGReader::new(65536, &data[..]);
        assert_eq!(read_all(&mut reader), Err(PcapError::UnexpectedEof));
        assert_eq!(reader.consumed(), FRAME_PCAPNG_SHB.len());
    }

    #[test]
    fn test_reader_first_block() {
        let mut reader = PcapNGReader::new(65536, FRAME_PCAPNG_EPB);
        assert_eq!(read_all(&mut reader), Err(PcapError::HeaderNotRecognized));
        let mut reader = PcapNGReader::new(65536, &b""[..]);
        assert_eq!(read_all(&mut reader), Err(PcapError::HeaderNotRecognized));
    }
}
