use criterion::{black_box, criterion_group, criterion_main, Criterion};
use packwire::Packer;

fn packer() -> Packer {
    let packer = Packer::default();
    packer.registry().register_list::<u64>();
    packer.registry().register_list::<String>();
    packer.registry().register_collection::<u64>();
    packer
}

fn bench_bulk_vs_element(c: &mut Criterion) {
    let packer = packer();
    let values: Vec<u64> = (0..1024 * 1024).collect();
    let boxed: Box<[u64]> = values.clone().into_boxed_slice();
    let encoded = packer.serialize(&boxed).unwrap();

    c.bench_function("bulk_encode_8mb", |b| b.iter(|| packer.serialize(black_box(&boxed)).unwrap()));
    c.bench_function("element_encode_8mb", |b| b.iter(|| packer.serialize(black_box(&values)).unwrap()));
    c.bench_function("bulk_decode_8mb", |b| {
        b.iter(|| packer.deserialize::<Box<[u64]>>(black_box(&encoded)).unwrap())
    });
    c.bench_function("element_decode_8mb", |b| {
        b.iter(|| packer.deserialize::<Vec<u64>>(black_box(&encoded)).unwrap())
    });
}

fn bench_staged_iterable(c: &mut Criterion) {
    let packer = packer();
    let words: Vec<String> = (0..10_000).map(|i| format!("entry-{i}")).collect();

    c.bench_function("iterable_exact_10k_strings", |b| {
        b.iter(|| packer.serialize_iter::<String, _>(Some(black_box(&words))).unwrap())
    });
    c.bench_function("iterable_staged_10k_strings", |b| {
        b.iter(|| {
            let source = black_box(&words).iter().filter(|w| !w.is_empty());
            packer.serialize_iter::<String, _>(Some(source)).unwrap()
        })
    });
}

fn bench_in_place_decode(c: &mut Criterion) {
    let packer = packer();
    let words: Vec<String> = (0..10_000).map(|i| format!("entry-{i}")).collect();
    let encoded = packer.serialize(&words).unwrap();
    let mut dst = words.clone();

    c.bench_function("list_decode_fresh_10k_strings", |b| {
        b.iter(|| packer.deserialize::<Vec<String>>(black_box(&encoded)).unwrap())
    });
    c.bench_function("list_decode_in_place_10k_strings", |b| {
        b.iter(|| packer.deserialize_into(black_box(&encoded), &mut dst).unwrap())
    });
}

criterion_group!(benches, bench_bulk_vs_element, bench_staged_iterable, bench_in_place_decode);
criterion_main!(benches);
