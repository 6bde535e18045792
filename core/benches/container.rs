use std::io::Cursor;

use backup_container::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn frames(total: usize, frame_len: usize) -> Vec<Vec<u8>> {
    (0..total / frame_len).map(|i| vec![(i % 251) as u8; frame_len]).collect()
}

fn write(profile: &KeyProfile, config: ContainerConfig, frames: &[Vec<u8>]) -> Vec<u8> {
    let mut w = EncryptedBackupWriter::new(WriteSink::new(Vec::new()), profile, config).unwrap();
    w.write_header(&BackupHeader::new()).unwrap();
    for f in frames {
        w.write_frame(f).unwrap();
    }
    w.close().unwrap();
    w.into_sink().unwrap().into_inner()
}

fn bench_container(c: &mut Criterion) {
    let profile = KeyProfile::local(&[0x42; 32], b"bench-account").unwrap();
    let mut group = c.benchmark_group("container");

    for cipher in [CipherSuite::Chacha20Poly1305, CipherSuite::Aes256Gcm] {
        let config = ContainerConfig::default().with_cipher(cipher);
        let data = frames(4 * 1024 * 1024, 4096);
        group.throughput(Throughput::Bytes((data.len() * 4096) as u64));

        group.bench_with_input(BenchmarkId::new("write", format!("{:?}", cipher)), &data, |b, data| {
            b.iter(|| black_box(write(&profile, config, data)))
        });

        let bytes = write(&profile, config, &data);
        group.bench_with_input(BenchmarkId::new("read", format!("{:?}", cipher)), &bytes, |b, bytes| {
            b.iter(|| {
                let reader =
                    EncryptedBackupReader::open(Cursor::new(bytes), bytes.len() as u64, &profile, config).unwrap();
                black_box(reader.count())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_container);
criterion_main!(benches);
