use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tcal_cache::{CacheEntry, EvictionPolicy, FrameCache};
use tcal_model::FrameHeader;

const ATOM_COUNT: usize = 4096;

fn populate(cache: &FrameCache, index: usize) {
    match cache.find_or_reserve(index) {
        CacheEntry::Reserved(r) => r.populate(
            FrameHeader::empty(ATOM_COUNT),
            vec![0.0; ATOM_COUNT],
            vec![0.0; ATOM_COUNT],
            vec![0.0; ATOM_COUNT],
        ),
        CacheEntry::Hit(_) => unreachable!("fresh cache must miss"),
    }
}

fn bench_hit(c: &mut Criterion) {
    let cache = FrameCache::new(64, EvictionPolicy::Clock);
    populate(&cache, 0);
    c.bench_function("find_or_reserve_hit", |b| {
        b.iter(|| match cache.find_or_reserve(black_box(0)) {
            CacheEntry::Hit(hit) => {
                black_box(hit.x());
            }
            CacheEntry::Reserved(_) => unreachable!("index 0 stays resident"),
        })
    });
}

fn bench_miss(c: &mut Criterion) {
    c.bench_function("find_or_reserve_miss_and_populate", |b| {
        let cache = FrameCache::new(64, EvictionPolicy::Clock);
        let mut index = 0usize;
        b.iter(|| {
            populate(&cache, black_box(index));
            index += 1;
        })
    });
}

fn bench_eviction_churn(c: &mut Criterion) {
    c.bench_function("find_or_reserve_eviction_churn", |b| {
        let cache = FrameCache::new(8, EvictionPolicy::Clock);
        let mut index = 0usize;
        b.iter(|| {
            populate(&cache, black_box(index));
            index += 1;
        })
    });
}

criterion_group!(benches, bench_hit, bench_miss, bench_eviction_churn);
criterion_main!(benches);
