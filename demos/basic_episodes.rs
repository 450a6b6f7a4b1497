//! Basic Episode Sampling Example
//!
//! This example demonstrates the two sampling strategies:
//! 1. Building a label index and task store over a feature matrix
//! 2. Drawing block-layout episodes and walking every stored task
//! 3. Drawing interleaved index batches with query slots
//!
//! Run with: cargo run --example basic_episodes

use few_shot_tasks::prelude::*;
use ndarray::Array2;
use rand::prelude::*;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== Basic Episode Sampling Example ===\n");

    let n_classes = 5;
    let per_class = 20;
    let feature_dim = 4;

    // Synthetic data: class c is centred on c
    println!("1. Generating synthetic labeled data...");
    let mut rng = StdRng::seed_from_u64(42);
    let total = n_classes * per_class;
    let features = Array2::from_shape_fn((total, feature_dim), |(i, _)| {
        (i % n_classes) as f64 + rng.gen::<f64>() * 0.1
    });
    let labels: Vec<usize> = (0..total).map(|i| i % n_classes).collect();
    let dataset = ArrayDataset::new(features, labels.clone()).expect("aligned labels");
    println!("   - {} records, {} classes, {} features\n", total, n_classes, feature_dim);

    // Block layout episodes over a random task store
    println!("2. Building a 3-way 5-shot task store with 10 random tasks...");
    let config = TaskConfig::new()
        .with_ways(3)
        .with_shots(5)
        .with_tasks(TaskSource::Count(10));
    let sampler = EpisodeSampler::new(dataset, config, &mut rng).expect("valid configuration");
    println!("   - Stored tasks: {}", sampler.len());

    let episode = sampler.sample_default(&mut rng).expect("enough records per class");
    let (matrix, encoded) = episode.to_arrays().expect("uniform feature length");
    println!("   - Sampled task {:?}", episode.task().labels());
    println!("   - Feature matrix shape: {:?}", matrix.dim());
    println!("   - Encoded labels: {:?}\n", encoded);

    println!("3. Walking every stored task once...");
    for (i, episode) in sampler.traverse(&mut rng).enumerate() {
        let episode = episode.expect("enough records per class");
        println!("   - Task {:>2}: {:?} -> {} examples", i, episode.task().labels(), episode.len());
    }

    // Interleaved index batches
    println!("\n4. Drawing interleaved 3-way 2+3 index batches...");
    let fixed = FixedGroupSampler::new(&labels, FixedGroupConfig::new(3, 3, 2, 3))
        .expect("valid configuration");
    for batch in fixed.batches(&mut rng) {
        let batch = batch.expect("enough records per class");
        let (support, query) = batch.split(fixed.shots()).expect("shots within batch");
        println!("   - Support: {:?}", support.positions());
        println!("     Query:   {:?}", query.positions());
    }

    println!("\n=== Example Complete ===");
}
