//! # Query Matching Benchmark
//!
//! Compares, over a world of many archetypes:
//! 1. Cold matching - every group outcome computed by scanning
//! 2. Shared-cache matching - a fresh query served by the world cache
//! 3. Local-cache matching - the same query asked again

#![allow(missing_docs)]
#![allow(dead_code)]

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tessera_core::{
    ArchetypeStore, ArchetypeView, Component, ComponentRegistry, ComponentType, ComponentTypeId,
};
use tessera_query::{Bundle, MatchCache, Query, QueryItem};

const COMPONENT_COUNT: u32 = 32;
const ARCHETYPE_COUNT: usize = 4_096;

macro_rules! components {
    ($($name:ident),*) => {
        $(
            #[derive(Clone, Copy, Default, bytemuck::Pod, bytemuck::Zeroable)]
            #[repr(C)]
            struct $name(u32);
            impl Component for $name {}
        )*
    };
}

components!(C0, C1, C2, C3, C4);

/// Deterministic archetype compositions.
fn build_store(count: usize, seed: u64) -> ArchetypeStore {
    let mut store = ArchetypeStore::default();
    let mut state = seed;

    while store.len() < count {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let bits = state;
        let ids = (0..COMPONENT_COUNT)
            .filter(|i| (bits >> i) & 1 == 1)
            .map(ComponentTypeId::new);
        store.get_or_insert(ids.collect());
    }

    store
}

fn registry_types() -> Vec<ComponentType> {
    let mut registry = ComponentRegistry::new();
    vec![
        registry.register::<C0>("C0").unwrap(),
        registry.register::<C1>("C1").unwrap(),
        registry.register::<C2>("C2").unwrap(),
        registry.register::<C3>("C3").unwrap(),
        registry.register::<C4>("C4").unwrap(),
    ]
}

fn query_items(types: &[ComponentType]) -> (Vec<QueryItem>, Vec<QueryItem>, Vec<QueryItem>) {
    let all = vec![types[0].into(), types[1].into()];
    let any = vec![Bundle::new("any", [types[2], types[3]]).into()];
    let none = vec![types[4].into()];
    (all, any, none)
}

fn count_matches(query: &Query, store: &ArchetypeStore) -> usize {
    store.iter().filter(|a| query.matches(*a)).count()
}

fn bench_cold(c: &mut Criterion) {
    let store = build_store(ARCHETYPE_COUNT, 0xDEAD_BEEF);
    let types = registry_types();
    let (all, any, none) = query_items(&types);

    c.bench_function("match_cold_4096_archetypes", |b| {
        b.iter(|| {
            let cache = Arc::new(MatchCache::new());
            let query = Query::all(all.clone()).any(any.clone()).none(none.clone()).build(&cache);
            black_box(count_matches(&query, &store))
        });
    });
}

fn bench_shared_cache(c: &mut Criterion) {
    let store = build_store(ARCHETYPE_COUNT, 0xDEAD_BEEF);
    let types = registry_types();
    let (all, any, none) = query_items(&types);
    let cache = Arc::new(MatchCache::new());

    // Warm the shared cache once.
    let warm = Query::all(all.clone()).any(any.clone()).none(none.clone()).build(&cache);
    black_box(count_matches(&warm, &store));

    c.bench_function("match_shared_cache_4096_archetypes", |b| {
        b.iter(|| {
            let query = Query::all(all.clone()).any(any.clone()).none(none.clone()).build(&cache);
            black_box(count_matches(&query, &store))
        });
    });
}

fn bench_local_cache(c: &mut Criterion) {
    let store = build_store(ARCHETYPE_COUNT, 0xDEAD_BEEF);
    let types = registry_types();
    let (all, any, none) = query_items(&types);
    let cache = Arc::new(MatchCache::new());
    let query = Query::all(all).any(any).none(none).build(&cache);
    black_box(count_matches(&query, &store));

    c.bench_function("match_local_cache_4096_archetypes", |b| {
        b.iter(|| black_box(count_matches(&query, &store)));
    });
}

fn bench_has(c: &mut Criterion) {
    let store = build_store(ARCHETYPE_COUNT, 0xDEAD_BEEF);
    let probe = ComponentTypeId::new(7);

    c.bench_function("archetype_has_4096", |b| {
        b.iter(|| black_box(store.iter().filter(|a| a.has(probe)).count()));
    });
}

criterion_group!(
    benches,
    bench_cold,
    bench_shared_cache,
    bench_local_cache,
    bench_has,
);
criterion_main!(benches);
