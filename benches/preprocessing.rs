use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use housing_prep::preprocessing::{FeatureScaler, HousingPipeline};
use housing_prep::schema::*;
use housing_prep::split::split_stratified;
use polars::prelude::*;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn create_raw_records(n_rows: usize) -> DataFrame {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let fips_codes = [6037.0, 6059.0, 6111.0];

    let total: Vec<f64> = (0..n_rows).map(|_| rng.gen_range(100_000.0..900_000.0)).collect();
    let land: Vec<f64> = total.iter().map(|t| t * 0.4).collect();
    let structure: Vec<Option<f64>> = total
        .iter()
        .zip(&land)
        .enumerate()
        .map(|(i, (t, l))| if i % 5 == 0 { None } else { Some(t - l) })
        .collect();
    let baths: Vec<f64> = (0..n_rows).map(|_| rng.gen_range(1..=4) as f64).collect();
    let calc_baths: Vec<Option<f64>> = baths
        .iter()
        .enumerate()
        .map(|(i, b)| if i % 7 == 0 { None } else { Some(*b) })
        .collect();

    df!(
        PARCEL_ID => (0..n_rows as i64).collect::<Vec<_>>(),
        BATHROOMS => baths,
        BEDROOMS => (0..n_rows).map(|_| rng.gen_range(1..=5) as f64).collect::<Vec<_>>(),
        CALCULATED_BATHROOMS => calc_baths,
        FINISHED_AREA => (0..n_rows).map(|_| rng.gen_range(900.0..3_500.0)).collect::<Vec<f64>>(),
        FIPS => (0..n_rows).map(|i| fips_codes[i % 3]).collect::<Vec<_>>(),
        LATITUDE => (0..n_rows).map(|_| rng.gen_range(33_500_000..34_500_000i64)).collect::<Vec<_>>(),
        LONGITUDE => (0..n_rows).map(|_| rng.gen_range(-119_000_000..-117_500_000i64)).collect::<Vec<_>>(),
        STRUCTURE_VALUE => structure,
        TOTAL_VALUE => total.clone(),
        LAND_VALUE => land,
        TAX_AMOUNT => total.iter().map(|t| t * 0.012).collect::<Vec<_>>(),
        UNIT_COUNT => vec![1.0; n_rows],
        LAND_USE_TYPE_ID => vec![261i64; n_rows],
        LAND_USE_DESC => vec!["Single Family Residential"; n_rows],
    )
    .unwrap()
}

fn bench_prepare(c: &mut Criterion) {
    let mut group = c.benchmark_group("prepare");
    group.sample_size(20);

    for n_rows in [1_000, 10_000, 50_000].iter() {
        let df = create_raw_records(*n_rows);

        group.bench_with_input(BenchmarkId::new("prepare", n_rows), &df, |b, df| {
            let pipeline = HousingPipeline::new();
            b.iter(|| pipeline.prepare(black_box(df)).unwrap())
        });
    }

    group.finish();
}

fn bench_split_and_scale(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_and_scale");

    for n_rows in [1_000, 10_000, 50_000].iter() {
        let prepared = HousingPipeline::new().prepare(&create_raw_records(*n_rows)).unwrap();

        group.bench_with_input(BenchmarkId::new("split", n_rows), &prepared, |b, df| {
            b.iter(|| split_stratified(black_box(df), TOTAL_VALUE, 5, 123).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("fit_scaler", n_rows), &prepared, |b, df| {
            b.iter(|| FeatureScaler::fit(black_box(df), &[FINISHED_AREA, TAX_RATE, BATH_PER_SQFT]).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_prepare, bench_split_and_scale);
criterion_main!(benches);
