use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use squadcarve::config;
use squadcarve::format::{DIRECTORY_END, DIRECTORY_OFFSET, DIRECTORY_ENTRY_SIZE, SIGNATURE};
use squadcarve::record::{AGE_OFFSET, OVERALL_RATING_OFFSET, POTENTIAL_OFFSET, RECORD_SIZE};
use squadcarve::parser::SquadParser;

fn player(id: u32) -> Vec<u8> {
    let mut w = vec![0u8; RECORD_SIZE];
    w[0..4].copy_from_slice(&id.to_le_bytes());
    w[19] = 5;
    w[OVERALL_RATING_OFFSET] = 70;
    w[POTENTIAL_OFFSET] = 80;
    w[AGE_OFFSET] = 25;
    w
}

/// Container with `chunks` directory chunks of `per_chunk` records each.
fn squad_container(chunks: usize, per_chunk: usize) -> Vec<u8> {
    let chunk_len = per_chunk * RECORD_SIZE;
    let mut data = vec![0u8; DIRECTORY_END + chunks * chunk_len];
    data[..8].copy_from_slice(&SIGNATURE);
    let mut id = 1u32;
    for slot in 0..chunks {
        let offset = DIRECTORY_END + slot * chunk_len;
        let entry = DIRECTORY_OFFSET + slot * DIRECTORY_ENTRY_SIZE;
        data[entry + 4..entry + 8].copy_from_slice(&(offset as u32).to_le_bytes());
        data[entry + 8..entry + 12].copy_from_slice(&(chunk_len as u32).to_le_bytes());
        for r in 0..per_chunk {
            let at = offset + r * RECORD_SIZE;
            data[at..at + RECORD_SIZE].copy_from_slice(&player(id));
            id += 1;
        }
    }
    data
}

fn bench_throughput(c: &mut Criterion) {
    let loaded = config::load_config(None).expect("config");
    let parser = SquadParser::new(loaded.config.scan);

    let mut group = c.benchmark_group("parse");
    for per_chunk in [32usize, 512] {
        let data = squad_container(48, per_chunk);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("directory", data.len()), &data, |b, data| {
            b.iter(|| parser.parse(data, None));
        });
    }

    // no directory, no plausible windows: every byte goes through the fallback
    for size in [1024 * 1024usize, 4 * 1024 * 1024] {
        let mut data = vec![0u8; size];
        data[..8].copy_from_slice(&SIGNATURE);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("full_scan", size), &data, |b, data| {
            b.iter(|| parser.parse(data, None));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_throughput);
criterion_main!(benches);
