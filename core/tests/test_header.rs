// Header record codec: layout, flags, CRC and strict length handling.

#[cfg(test)]
mod tests {
    use backup_container::constants::{HEADER_V1, MAGIC_BKH1};
    use backup_container::headers::{decode_header, encode_header, BackupHeader, HeaderError, HeaderFlags};
    use chrono::{TimeZone, Utc};

    fn fixed_header() -> BackupHeader {
        BackupHeader::at(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap())
    }

    #[test]
    fn round_trip_without_metadata() {
        let h = fixed_header();
        let wire = encode_header(&h).unwrap();
        assert_eq!(wire.len(), h.encoded_len());
        assert_eq!(wire.len(), BackupHeader::PREFIX_LEN + BackupHeader::SUFFIX_LEN);
        assert_eq!(&wire[..4], &MAGIC_BKH1);

        let back = decode_header(&wire).unwrap();
        assert_eq!(back, h);
        assert_eq!(back.version, HEADER_V1);
        assert!(back.flags.is_empty());
        assert_eq!(back.created_at(), Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()));
    }

    #[test]
    fn round_trip_with_metadata() {
        let h = fixed_header().with_metadata(&b"device=phone;v=7"[..]);
        assert!(h.flags.contains(HeaderFlags::HAS_METADATA));

        let back = decode_header(&encode_header(&h).unwrap()).unwrap();
        assert_eq!(back.metadata.as_deref(), Some(&b"device=phone;v=7"[..]));
        assert_eq!(back.metadata_len(), 16);
    }

    #[test]
    fn empty_metadata_clears_the_flag() {
        let h = fixed_header().with_metadata(&b"x"[..]).with_metadata(Vec::new());
        assert!(h.metadata.is_none());
        assert!(!h.flags.contains(HeaderFlags::HAS_METADATA));
    }

    #[test]
    fn any_flipped_byte_is_detected() {
        let wire = encode_header(&fixed_header().with_metadata(&b"meta"[..])).unwrap();
        for i in 0..wire.len() {
            let mut bad = wire.clone();
            bad[i] ^= 0x01;
            assert!(decode_header(&bad).is_err(), "flip at {} went unnoticed", i);
        }
    }

    #[test]
    fn crc_mismatch_is_reported() {
        let mut wire = encode_header(&fixed_header()).unwrap();
        let n = wire.len();
        wire[n - 1] ^= 0xFF;
        assert!(matches!(decode_header(&wire), Err(HeaderError::InvalidCrc32 { .. })));
    }

    #[test]
    fn bad_magic_short_and_trailing_buffers() {
        let wire = encode_header(&fixed_header()).unwrap();

        let mut bad = wire.clone();
        bad[0] = b'X';
        assert!(matches!(decode_header(&bad), Err(HeaderError::InvalidMagic { .. })));

        assert!(matches!(
            decode_header(&wire[..wire.len() - 1]),
            Err(HeaderError::BufferTooShort { .. })
        ));

        let mut long = wire.clone();
        long.push(0);
        assert!(matches!(decode_header(&long), Err(HeaderError::TrailingBytes { extra: 1 })));
    }

    #[test]
    fn invalid_headers_never_encode() {
        let mut h = fixed_header();
        h.version = 9;
        assert!(matches!(encode_header(&h), Err(HeaderError::UnsupportedVersion { have: 9 })));

        let mut h = fixed_header();
        h.flags = HeaderFlags::HAS_METADATA;
        assert!(matches!(encode_header(&h), Err(HeaderError::MetadataFlagMismatch)));

        let h = fixed_header().with_metadata(vec![0u8; 64 * 1024 + 1]);
        assert!(matches!(encode_header(&h), Err(HeaderError::MetadataTooLarge { .. })));
    }

    #[test]
    fn summary_hides_metadata_bytes() {
        let h = fixed_header().with_metadata(&b"secret-ish"[..]);
        let s = h.summary();
        assert!(s.contains("metadata_len: 10"));
        assert!(!s.contains("secret-ish"));
    }
}
