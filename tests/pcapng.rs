mod common;

use common::*;
use hex_literal::hex;
use pcapng_annotate::pcapng::*;
use pcapng_annotate::*;

#[test]
fn test_pcapng_slice_iter() {
    let data = sample_capture();
    let slice = PcapNGSlice::from_slice(&data).expect("could not create PcapNGSlice");
    let expected_magics = &[
        SHB_MAGIC, IDB_MAGIC, EPB_MAGIC, CB_MAGIC, SPB_MAGIC, EPB_MAGIC, 5, EPB_MAGIC,
    ];
    let mut num_blocks = 0;
    for (block, expected) in slice.zip(expected_magics.iter()) {
        let block = block.expect("block");
        assert_eq!(block.magic(), *expected);
        num_blocks += 1;
    }
    assert_eq!(num_blocks, expected_magics.len());
}

#[test]
fn test_pcapng_reader() {
    let data = sample_capture();
    let mut num_blocks = 0;
    let mut reader = PcapNGReader::new(65536, &data[..]);
    let expected_len = &[12, 6, 5, 7];
    let mut num_packets = 0;
    loop {
        match reader.next() {
            Ok((offset, block)) => {
                match block {
                    Block::EnhancedPacket(ref epb) => {
                        assert_eq!(expected_len[num_packets], epb.origlen);
                        assert_eq!(epb.packet_data().len(), epb.origlen as usize);
                    }
                    Block::SimplePacket(ref spb) => {
                        assert_eq!(expected_len[num_packets], spb.origlen);
                        assert_eq!(spb.packet_data(), b"simple");
                    }
                    _ => (),
                }
                if block.is_data_block() {
                    num_packets += 1;
                }
                num_blocks += 1;
                reader.consume(offset);
            }
            Err(PcapError::Eof) => break,
            Err(PcapError::Incomplete(_)) => {
                reader.refill().unwrap();
            }
            Err(e) => panic!("error while reading: {:?}", e),
        }
    }
    assert_eq!(num_blocks, 8);
    assert_eq!(num_packets, 4);
    assert_eq!(reader.consumed(), data.len());
}

#[test]
fn test_pcapng_reader_be() {
    let data = CaptureBuilder::be()
        .shb()
        .idb()
        .epb(b"0123456789", &[(COMMENT, b"be")])
        .spb(b"abc")
        .build();
    let mut reader = PcapNGReader::new(65536, &data[..]);
    let mut blocks = Vec::new();
    loop {
        match reader.next() {
            Ok((offset, block)) => {
                blocks.push(block.into_owned());
                reader.consume(offset);
            }
            Err(PcapError::Eof) => break,
            Err(PcapError::Incomplete(_)) => {
                reader.refill().unwrap();
            }
            Err(e) => panic!("error while reading: {:?}", e),
        }
    }
    assert_eq!(blocks.len(), 4);
    if let Block::SectionHeader(ref shb) = blocks[0] {
        assert!(shb.big_endian());
        assert_eq!(shb.user_application().as_deref(), Some("builder"));
    } else {
        unreachable!();
    }
    if let Block::InterfaceDescription(ref idb) = blocks[1] {
        assert_eq!(idb.linktype, 1);
        assert_eq!(idb.snaplen, 65535);
    } else {
        unreachable!();
    }
    assert_eq!(blocks[2].comment(), Some(&b"be"[..]));
    assert_eq!(encode(&blocks).expect("encode"), data);
}

#[test]
fn test_pcapng_decryptionsecretsblock_kept_raw() {
    // block 3 from file dtls12-aes128ccm8-dsb.pcapng (wireshark repo)
    let dsb = hex!(
        "
0a 00 00 00 c4 00 00 00 4b 53 4c 54 b0 00 00 00
43 4c 49 45 4e 54 5f 52 41 4e 44 4f 4d 20 35 38
38 65 35 66 39 64 63 37 37 38 63 65 66 32 32 34
30 35 66 34 32 66 39 62 65 61 32 35 39 32 38 62
64 30 33 31 32 63 65 31 34 64 36 34 32 64 30 33
34 64 32 34 66 34 66 61 62 36 37 32 66 63 20 37
30 35 37 66 33 64 37 30 36 63 66 30 36 38 30 61
34 30 65 34 66 32 65 30 37 34 37 63 65 37 38 63
65 39 38 64 61 32 36 32 32 65 62 39 61 39 35 34
33 66 37 66 31 35 34 36 33 37 34 34 31 35 37 32
35 36 61 37 39 36 64 62 35 30 62 62 65 36 35 63
64 62 64 63 32 39 32 61 30 39 33 33 35 62 34 0a
c4 00 00 00"
    );
    let (rem, block) = parse_block_le(&dsb).expect("could not parse DSB");
    assert!(rem.is_empty());
    if let Block::Unknown(ref ub) = block {
        assert_eq!(ub.block_type, 0x0000_000A);
        assert_eq!(ub.data.len(), 0xc4 - 12);
    } else {
        unreachable!();
    }

    // a file with the secrets block before the packet
    let head = CaptureBuilder::le().shb().idb().build();
    let tail = CaptureBuilder::le().epb(b"tls record", &[]).build();
    let data = [&head[..], &dsb[..], &tail[..]].concat();
    let mut capture = Capture::from_reader(&data[..], 256).expect("capture");
    assert_eq!(capture.packet_count(), 1);
    capture.set_comment(1, b"encrypted").expect("set comment");
    let out = capture.to_vec().expect("encode");
    assert_eq!(&out[..head.len() + dsb.len()], &data[..head.len() + dsb.len()]);
    let blocks = decode(&out).expect("decode");
    assert_eq!(get_comment(&blocks, 1).expect("comment"), Some(&b"encrypted"[..]));
}
