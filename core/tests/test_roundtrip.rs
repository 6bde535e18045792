// End-to-end container behavior: round trips for both profiles and ciphers,
// size quantization, tamper and truncation detection, forward secrecy,
// progress accounting and writer lifecycle.

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use backup_container::config::{expected_container_len, CipherSuite, ContainerConfig};
    use backup_container::crypto::KeyProfile;
    use backup_container::headers::BackupHeader;
    use backup_container::stream::{
        open_input, BackupReader, BackupWriter, EncryptedBackupReader, EncryptedBackupWriter, Frame,
        InputSource, WriteSink, WriterState,
    };
    use backup_container::telemetry::ContainerSummary;
    use backup_container::{BackupError, Result};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    const MASTER: [u8; 32] = [0x42; 32];
    const ACCOUNT: &[u8] = b"acct-7f3c";
    const TOKEN: [u8; 32] = [0x5E; 32];
    const FS_META: &[u8] = b"server-metadata-v1";

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn local() -> KeyProfile {
        KeyProfile::local(&MASTER, ACCOUNT).unwrap()
    }

    fn forward_secret() -> KeyProfile {
        KeyProfile::forward_secret(&MASTER, ACCOUNT, &TOKEN, FS_META).unwrap()
    }

    fn header() -> BackupHeader {
        BackupHeader::at(Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap())
    }

    fn write_container(
        profile: &KeyProfile,
        config: ContainerConfig,
        frames: &[Vec<u8>],
    ) -> (Vec<u8>, ContainerSummary) {
        let mut w = EncryptedBackupWriter::new(WriteSink::new(Vec::new()), profile, config).unwrap();
        w.write_header(&header()).unwrap();
        for f in frames {
            w.write_frame(f).unwrap();
        }
        let summary = w.close().unwrap();
        let bytes = w.into_sink().unwrap().into_inner();
        (bytes, summary)
    }

    fn read_container(
        bytes: &[u8],
        declared: u64,
        profile: &KeyProfile,
        config: ContainerConfig,
    ) -> Result<(BackupHeader, Vec<Frame>)> {
        let reader = EncryptedBackupReader::open(Cursor::new(bytes), declared, profile, config)?;
        let header = reader.header().clone();
        let frames = reader.collect::<Result<Vec<_>>>()?;
        Ok((header, frames))
    }

    fn assert_frames(got: &[Frame], want: &[Vec<u8>]) {
        assert_eq!(got.len(), want.len());
        for (g, w) in got.iter().zip(want) {
            assert_eq!(g.as_bytes(), &w[..]);
        }
    }

    fn mixed_frames() -> Vec<Vec<u8>> {
        vec![
            b"contact:alice".to_vec(),
            Vec::new(),
            vec![0xC3; 50_000],
            (0..20_000u32).map(|i| (i % 253) as u8).collect(),
            b"settings".to_vec(),
        ]
    }

    #[test]
    fn round_trip_both_profiles_and_ciphers() {
        init_tracing();
        for profile in [local(), forward_secret()] {
            for cipher in [CipherSuite::Chacha20Poly1305, CipherSuite::Aes256Gcm] {
                for chunk_size in [16 * 1024, 64 * 1024] {
                    let config = ContainerConfig::default().with_cipher(cipher).with_chunk_size(chunk_size);
                    let frames = mixed_frames();
                    let (bytes, summary) = write_container(&profile, config, &frames);

                    assert_eq!(summary.container_len, bytes.len() as u64);
                    assert_eq!(summary.frames_data, frames.len() as u64);
                    assert_eq!(summary.profile, profile.name());

                    let (h, got) = read_container(&bytes, bytes.len() as u64, &profile, config).unwrap();
                    assert_eq!(h, header());
                    assert_frames(&got, &frames);
                }
            }
        }
    }

    #[test]
    fn empty_backup_round_trips() {
        let (bytes, summary) = write_container(&local(), ContainerConfig::default(), &[]);
        assert_eq!(summary.frames_data, 0);
        assert_eq!(bytes.len() as u64, expected_container_len(summary.bytes_content, &ContainerConfig::default()));

        let mut reader =
            EncryptedBackupReader::open(Cursor::new(&bytes), bytes.len() as u64, &local(), ContainerConfig::default())
                .unwrap();
        assert_eq!(reader.header(), &header());
        assert!(!reader.has_next().unwrap());
        assert!(reader.next().is_none());
        assert_eq!(reader.bytes_read(), bytes.len() as u64);
    }

    #[test]
    fn small_backups_are_indistinguishable_by_size() {
        let config = ContainerConfig::default();
        let sizes: Vec<usize> = (1..=10)
            .map(|n| {
                let frames: Vec<Vec<u8>> = (0..n).map(|i| vec![i as u8; 100]).collect();
                write_container(&local(), config, &frames).0.len()
            })
            .collect();
        assert!(sizes.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(sizes[0] as u64, expected_container_len(1, &config));
    }

    #[test]
    fn container_length_matches_prediction() {
        let config = ContainerConfig::default().with_chunk_size(16 * 1024);
        for n in [0usize, 1, 3, 40] {
            let frames: Vec<Vec<u8>> = (0..n).map(|i| vec![i as u8; 1500]).collect();
            let (bytes, summary) = write_container(&local(), config, &frames);
            assert_eq!(bytes.len() as u64, expected_container_len(summary.bytes_content, &config));
            assert_eq!(summary.padded_len(), backup_container::padding::bucket_size(summary.bytes_content));
        }
    }

    #[test]
    fn same_content_encrypts_differently() {
        let frames = vec![b"identical".to_vec()];
        let (a, _) = write_container(&local(), ContainerConfig::default(), &frames);
        let (b, _) = write_container(&local(), ContainerConfig::default(), &frames);
        assert_eq!(a.len(), b.len());
        assert_ne!(&a[..16], &b[..16]);
        assert_ne!(a, b);
    }

    #[test]
    fn any_flipped_byte_fails_authentication() {
        let config = ContainerConfig::default().with_chunk_size(16 * 1024);
        let frames = vec![vec![0x11; 30_000], b"tail".to_vec()];
        let (bytes, _) = write_container(&local(), config, &frames);
        let len = bytes.len();

        let mut positions: Vec<usize> = (0..len).step_by(997).collect();
        positions.extend([0, 15, 16, 17, 16 + 16_400, len - 33, len - 32, len - 1]);
        for pos in positions {
            let mut bad = bytes.clone();
            bad[pos] ^= 0x04;
            let res = read_container(&bad, len as u64, &local(), config);
            assert!(
                matches!(res, Err(BackupError::AuthenticationFailure(_))),
                "flip at {} gave {:?}",
                pos,
                res.map(|(_, f)| f.len())
            );
        }
    }

    #[test]
    fn forward_secret_needs_the_exact_tuple() {
        let config = ContainerConfig::default();
        let frames = vec![b"secret chat".to_vec()];
        let (bytes, _) = write_container(&forward_secret(), config, &frames);
        let len = bytes.len() as u64;

        let (_, got) = read_container(&bytes, len, &forward_secret(), config).unwrap();
        assert_frames(&got, &frames);

        let wrong = [
            local(),
            KeyProfile::forward_secret(&MASTER, ACCOUNT, &[0x5F; 32], FS_META).unwrap(),
            KeyProfile::forward_secret(&MASTER, ACCOUNT, &TOKEN, b"server-metadata-v2").unwrap(),
            KeyProfile::forward_secret(&MASTER, b"acct-other", &TOKEN, FS_META).unwrap(),
            KeyProfile::forward_secret(&[0x43; 32], ACCOUNT, &TOKEN, FS_META).unwrap(),
        ];
        for profile in wrong {
            assert!(matches!(
                read_container(&bytes, len, &profile, config),
                Err(BackupError::AuthenticationFailure(_))
            ));
        }
    }

    #[test]
    fn reader_config_must_match_writer() {
        let config = ContainerConfig::default().with_chunk_size(16 * 1024);
        let frames = vec![vec![9u8; 40_000]];
        let (bytes, _) = write_container(&local(), config, &frames);
        let len = bytes.len() as u64;

        let other_cipher = config.with_cipher(CipherSuite::Aes256Gcm);
        assert!(matches!(
            read_container(&bytes, len, &local(), other_cipher),
            Err(BackupError::AuthenticationFailure(_))
        ));
        assert!(read_container(&bytes, len, &local(), config.with_chunk_size(32 * 1024)).is_err());
    }

    #[test]
    fn progress_increases_and_ends_at_stream_length() {
        let config = ContainerConfig::default().with_chunk_size(16 * 1024);
        let frames: Vec<Vec<u8>> = (0..30).map(|i| vec![i as u8; 1200 + i * 37]).collect();
        let (bytes, _) = write_container(&local(), config, &frames);
        let len = bytes.len() as u64;

        let mut reader = EncryptedBackupReader::open(Cursor::new(&bytes), len, &local(), config).unwrap();
        assert_eq!(reader.stream_length(), len);
        let mut last = reader.bytes_read();
        assert!(last > 16);

        let mut seen = 0;
        while reader.has_next().unwrap() {
            let frame = reader.next_frame().unwrap().unwrap();
            assert_eq!(frame.as_bytes(), &frames[seen][..]);
            seen += 1;
            let now = reader.bytes_read();
            assert!(now > last, "progress stalled at frame {}", seen);
            assert!(now <= len);
            last = now;
        }
        assert_eq!(seen, frames.len());
        assert!(reader.is_finished());
        assert_eq!(reader.bytes_read(), len);

        let counters = reader.counters();
        assert_eq!(counters.frames_data, frames.len() as u64);
        assert_eq!(counters.bytes_wire, len);
    }

    #[test]
    fn reader_counters_match_writer_summary() {
        let config = ContainerConfig::default();
        let frames = mixed_frames();
        let (bytes, summary) = write_container(&local(), config, &frames);

        let mut reader =
            EncryptedBackupReader::open(Cursor::new(&bytes), bytes.len() as u64, &local(), config).unwrap();
        while reader.next().is_some() {}
        let counters = reader.counters();
        assert_eq!(counters.bytes_content, summary.bytes_content);
        assert_eq!(counters.bytes_padding, summary.bytes_padding);
        assert_eq!(counters.chunks, summary.chunks);
    }

    #[test]
    fn truncated_tail_with_honest_length() {
        let config = ContainerConfig::default().with_chunk_size(16 * 1024);
        let (bytes, _) = write_container(&local(), config, &[vec![4u8; 50_000]]);

        for cut in [1usize, 32, 33, 100, 16_400 + 32] {
            let short = &bytes[..bytes.len() - cut];
            let res = read_container(short, short.len() as u64, &local(), config);
            assert!(
                matches!(res, Err(BackupError::AuthenticationFailure(_)) | Err(BackupError::Truncated(_))),
                "cut {} accepted",
                cut
            );
        }
    }

    #[test]
    fn truncated_tail_with_lying_length() {
        let config = ContainerConfig::default().with_chunk_size(16 * 1024);
        let (bytes, _) = write_container(&local(), config, &[vec![4u8; 50_000]]);
        let declared = bytes.len() as u64;

        for cut in [1usize, 31, 32, 5_000, 20_000] {
            let short = &bytes[..bytes.len() - cut];
            let res = read_container(short, declared, &local(), config);
            assert!(matches!(res, Err(BackupError::Truncated(_))), "cut {} gave {:?}", cut, res.map(|_| ()));
        }
    }

    #[test]
    fn trailing_bytes_past_declared_length_are_rejected() {
        let (mut bytes, _) = write_container(&local(), ContainerConfig::default(), &[b"x".to_vec()]);
        let declared = bytes.len() as u64;
        bytes.extend_from_slice(b"junk");
        assert!(matches!(
            read_container(&bytes, declared, &local(), ContainerConfig::default()),
            Err(BackupError::MalformedLength(_))
        ));
    }

    #[test]
    fn reader_is_fused_after_an_error() {
        let config = ContainerConfig::default().with_chunk_size(16 * 1024);
        let (mut bytes, _) = write_container(&local(), config, &[vec![1u8; 40_000], b"after".to_vec()]);
        let len = bytes.len();
        bytes[len - 5] ^= 0xFF; // MAC trailer

        let mut reader = EncryptedBackupReader::open(Cursor::new(&bytes), len as u64, &local(), config).unwrap();
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_ok());
        assert!(matches!(reader.next(), Some(Err(BackupError::AuthenticationFailure(_)))));
        assert!(reader.next().is_none());
        assert!(matches!(reader.has_next(), Err(BackupError::Sequencing(_))));
    }

    #[test]
    fn writer_sequencing_rules() {
        let mut w = EncryptedBackupWriter::new(WriteSink::new(Vec::new()), &local(), ContainerConfig::default())
            .unwrap();
        assert_eq!(w.state(), WriterState::Created);
        assert!(matches!(w.write_frame(b"early"), Err(BackupError::Sequencing(_))));
        assert!(matches!(w.close(), Err(BackupError::Sequencing(_))));
        assert!(w.sink().unwrap().get_ref().is_empty());

        w.write_header(&header()).unwrap();
        assert_eq!(w.state(), WriterState::HeaderWritten);
        assert!(matches!(w.write_header(&header()), Err(BackupError::Sequencing(_))));

        w.write_frame(b"ok").unwrap();
        w.close().unwrap();
        assert_eq!(w.state(), WriterState::Finalized);
        assert!(matches!(w.close(), Err(BackupError::Sequencing(_))));
        assert!(matches!(w.write_frame(b"late"), Err(BackupError::Sequencing(_))));
    }

    #[test]
    fn oversized_frame_is_refused_without_poisoning() {
        let config = ContainerConfig::default().with_max_frame_len(1024);
        let mut w = EncryptedBackupWriter::new(WriteSink::new(Vec::new()), &local(), config).unwrap();
        w.write_header(&header()).unwrap();
        assert!(matches!(w.write_frame(&[0u8; 1025]), Err(BackupError::MalformedLength(_))));
        assert_eq!(w.state(), WriterState::HeaderWritten);
        w.write_frame(&[0u8; 1024]).unwrap();
        w.close().unwrap();

        let bytes = w.into_sink().unwrap().into_inner();
        let (_, frames) = read_container(&bytes, bytes.len() as u64, &local(), config).unwrap();
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn dropped_writer_still_produces_a_valid_container() {
        init_tracing();
        let mut out = Vec::new();
        {
            let sink = |b: &[u8]| -> io::Result<()> {
                out.extend_from_slice(b);
                Ok(())
            };
            let mut w = EncryptedBackupWriter::new(sink, &local(), ContainerConfig::default()).unwrap();
            w.write_header(&header()).unwrap();
            w.write_frame(b"abandoned").unwrap();
        }

        let (_, frames) = read_container(&out, out.len() as u64, &local(), ContainerConfig::default()).unwrap();
        assert_frames(&frames, &[b"abandoned".to_vec()]);
    }

    #[test]
    fn sink_failure_poisons_the_writer() {
        let mut budget = 20_000usize;
        let sink = move |b: &[u8]| -> io::Result<()> {
            if b.len() > budget {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "disk full"));
            }
            budget -= b.len();
            Ok(())
        };
        let config = ContainerConfig::default().with_chunk_size(16 * 1024);
        let mut w = EncryptedBackupWriter::new(sink, &local(), config).unwrap();
        w.write_header(&header()).unwrap();

        let err = w.write_frame(&vec![0u8; 100_000]).unwrap_err();
        assert!(matches!(err, BackupError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
        assert_eq!(w.state(), WriterState::Failed);
        assert!(matches!(w.write_frame(b"more"), Err(BackupError::Sequencing(_))));
        assert!(matches!(w.close(), Err(BackupError::Sequencing(_))));
    }

    #[test]
    fn file_backed_round_trip() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let frames = mixed_frames();

        let mut w = EncryptedBackupWriter::new(WriteSink::new(tmp.reopen().unwrap()), &forward_secret(), ContainerConfig::default())
            .unwrap();
        w.write_header(&header().with_metadata(&b"file-export"[..])).unwrap();
        for f in &frames {
            w.write_frame(f).unwrap();
        }
        let summary = w.close().unwrap();
        drop(w);

        let (source, len) = open_input(InputSource::File(tmp.path().to_path_buf())).unwrap();
        assert_eq!(len, summary.container_len);

        let reader = EncryptedBackupReader::open(source, len, &forward_secret(), ContainerConfig::default()).unwrap();
        assert_eq!(reader.header().metadata.as_deref(), Some(&b"file-export"[..]));
        let got = reader.collect::<Result<Vec<_>>>().unwrap();
        assert_frames(&got, &frames);
    }

    #[test]
    fn summary_serializes() {
        let (_, summary) = write_container(&local(), ContainerConfig::default(), &[b"a".to_vec()]);
        let json = summary.to_json().unwrap();
        let back: ContainerSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.container_len, summary.container_len);
        assert_eq!(back.profile, "local");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn arbitrary_frames_round_trip(frames in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..6000), 0..8)) {
            let config = ContainerConfig::default().with_chunk_size(16 * 1024);
            let (bytes, summary) = write_container(&local(), config, &frames);
            prop_assert_eq!(bytes.len() as u64, expected_container_len(summary.bytes_content, &config));

            let (_, got) = read_container(&bytes, bytes.len() as u64, &local(), config).unwrap();
            prop_assert_eq!(got.len(), frames.len());
            for (g, f) in got.iter().zip(&frames) {
                prop_assert_eq!(g.as_bytes(), &f[..]);
            }
        }
    }
}
