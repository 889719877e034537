use crate::error::PcapError;
use crate::pcapng::*;
use nom::Offset;

/// Parsing iterator over pcap-ng data (requires data to be loaded into memory)
///
/// Blocks borrow from the input slice. Iteration stops after the first error.
///
/// ```rust
/// use pcapng_annotate::pcapng::*;
///
/// # let buffer = [
/// #     0x0a, 0x0d, 0x0d, 0x0a, 0x1c, 0x00, 0x00, 0x00, 0x4d, 0x3c, 0x2b, 0x1a, 0x01, 0x00,
/// #     0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x1c, 0x00, 0x00, 0x00,
/// # ];
/// let mut num_blocks = 0;
/// let capture = PcapNGSlice::from_slice(&buffer).expect("parse file");
/// for block in capture {
///     let block = block.expect("valid block");
///     num_blocks += 1;
/// }
/// assert_eq!(num_blocks, 1);
/// ```
pub struct PcapNGSlice<'a> {
    info: CurrentSectionInfo,
    // remaining (unparsed) data
    rem: &'a [u8],
    offset: usize,
}

impl<'a> PcapNGSlice<'a> {
    /// Create the iterator, checking that the data starts with a Section Header Block
    pub fn from_slice(i: &[u8]) -> Result<PcapNGSlice, PcapError<&[u8]>> {
        match parse_sectionheaderblock(i) {
            Ok(_) => (),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => return Err(e),
            Err(nom::Err::Incomplete(_)) if i.is_empty() => {
                return Err(PcapError::HeaderNotRecognized)
            }
            Err(nom::Err::Incomplete(_)) => return Err(PcapError::UnexpectedEof),
        }
        let info = CurrentSectionInfo::default();
        Ok(PcapNGSlice {
            info,
            rem: i,
            offset: 0,
        })
    }

    /// Offset, from the start of the input, of the next block to be parsed
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Iterator for PcapNGSlice. Returns a result so parsing errors are not
/// silently ignored
impl<'a> Iterator for PcapNGSlice<'a> {
    type Item = Result<Block<'a>, PcapError<&'a [u8]>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rem.is_empty() {
            return None;
        }
        let parse = if self.info.big_endian.unwrap_or(false) {
            parse_block_be
        } else {
            parse_block_le
        };
        let r = match parse(self.rem) {
            Ok((rem, b)) => {
                self.offset += self.rem.offset(rem);
                self.rem = rem;
                if let Block::SectionHeader(ref shb) = b {
                    self.info.big_endian = Some(shb.big_endian());
                }
                Ok(b)
            }
            Err(e) => {
                let e = match e {
                    nom::Err::Error(e) | nom::Err::Failure(e) => e,
                    nom::Err::Incomplete(_) => PcapError::UnexpectedEof,
                };
                // `offset` still points to the faulty block
                self.rem = &[];
                return Some(Err(e));
            }
        };
        Some(r)
    }
}
