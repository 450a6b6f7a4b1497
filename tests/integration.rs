//! Integration tests for few-shot task sampling
//!
//! These tests exercise the public API end to end: indexing, task store
//! construction, episode sampling, traversal and both batch layouts.

use few_shot_tasks::prelude::*;
use ndarray::{Array1, Array2};
use rand::prelude::*;
use std::collections::{HashMap, HashSet};

/// Helper: `n_classes` labels with given per-class counts, shuffled record order
fn create_records(counts: &[usize], seed: u64) -> Vec<(usize, i64)> {
    let mut labels: Vec<i64> = counts
        .iter()
        .enumerate()
        .flat_map(|(class, &n)| std::iter::repeat(class as i64 * 10).take(n))
        .collect();
    labels.shuffle(&mut StdRng::seed_from_u64(seed));
    labels.into_iter().enumerate().collect()
}

#[test]
fn test_label_index_partitions_positions() {
    let records = create_records(&[7, 3, 12, 1], 5);
    let index = LabelIndex::new(records.clone()).unwrap();

    let mut seen = vec![0usize; records.len()];
    for label in index.labels() {
        for &position in index.positions(label).unwrap() {
            seen[position] += 1;
            assert_eq!(records[position].1, *label);
        }
    }
    assert!(seen.iter().all(|&count| count == 1));
    assert_eq!(index.num_labels(), 4);
}

#[test]
fn test_first_appearance_label_order() {
    let records = vec![(0, 5i64), (1, 2), (2, 5), (3, 9), (4, 2)];
    let index = LabelIndex::new(records).unwrap();
    assert_eq!(index.labels(), &[5, 2, 9]);
}

#[test]
fn test_three_class_two_way_enumeration() {
    let records: Vec<(usize, i64)> = (0..9).map(|i| (i, (i % 3) as i64)).collect();
    let sampler = EpisodeSampler::new(
        records,
        TaskConfig::new().with_ways(2),
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap();

    let tasks: Vec<&[i64]> = sampler.store().tasks().iter().map(|t| t.labels()).collect();
    assert_eq!(
        tasks,
        vec![
            &[0, 1][..],
            &[0, 2][..],
            &[1, 0][..],
            &[1, 2][..],
            &[2, 0][..],
            &[2, 1][..],
        ]
    );
}

#[test]
fn test_episode_invariants() {
    let records = create_records(&[15, 15, 15, 15, 15], 11);
    let sampler = EpisodeSampler::new(
        records.clone(),
        TaskConfig::new().with_ways(4).with_shots(3),
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap();
    let mut rng = StdRng::seed_from_u64(99);

    for _ in 0..50 {
        let shots = rng.gen_range(1..=15);
        let episode = sampler.sample(&mut rng, Some(shots), None).unwrap();

        assert_eq!(episode.len(), shots * 4);

        // Contiguous blocks in task order, encoded 0..ways
        let labels = episode.labels();
        for (i, &encoded) in labels.iter().enumerate() {
            assert_eq!(encoded, i / shots);
        }

        // Each block holds records of the task's label at that slot, no repeats
        for class in 0..episode.ways() {
            let original = *episode.decode(class).unwrap();
            let block = episode.class_block(class);
            let distinct: HashSet<usize> = block.iter().map(|(p, _)| *p).collect();
            assert_eq!(distinct.len(), shots);
            assert!(block.iter().all(|(p, _)| records[*p].1 == original));
        }
    }
}

#[test]
fn test_repeated_calls_draw_fresh_subsets() {
    let records = create_records(&[40, 40], 3);
    let sampler = EpisodeSampler::new(
        records,
        TaskConfig::new().with_ways(2).with_shots(5),
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap();
    let mut rng = StdRng::seed_from_u64(8);

    let draws: HashSet<Vec<usize>> = (0..10)
        .map(|_| {
            let episode = sampler.sample_task(&mut rng, &[0, 10]).unwrap();
            episode.features().copied().collect()
        })
        .collect();
    assert!(draws.len() > 1);
}

#[test]
fn test_insufficient_population_never_returns_partial_episode() {
    let records = create_records(&[10, 2], 1);
    let sampler = EpisodeSampler::new(
        records,
        TaskConfig::new().with_ways(2),
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap();
    let mut rng = StdRng::seed_from_u64(4);

    for _ in 0..10 {
        let result = sampler.sample(&mut rng, Some(3), None);
        assert!(matches!(
            result,
            Err(Error::InsufficientPopulation {
                available: 2,
                requested: 3,
                ..
            })
        ));
    }
}

#[test]
fn test_traversal_ends_after_every_task() {
    let records = create_records(&[5, 5, 5, 5], 2);
    let sampler = EpisodeSampler::new(
        records,
        TaskConfig::new().with_ways(2).with_shots(2),
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap();
    assert_eq!(sampler.len(), 12);

    let mut rng = StdRng::seed_from_u64(6);
    let mut traversal = sampler.traverse(&mut rng);
    for i in 0..12 {
        let episode = traversal.next().unwrap().unwrap();
        assert_eq!(episode.task(), sampler.store().get(i).unwrap());
    }
    assert!(traversal.next().is_none());

    // A new traversal starts from the beginning
    let mut rng = StdRng::seed_from_u64(7);
    assert_eq!(sampler.traverse(&mut rng).count(), 12);
}

#[test]
fn test_random_store_distribution_follows_stored_list() {
    let records = create_records(&[5, 5, 5, 5, 5, 5], 2);
    let sampler = EpisodeSampler::new(
        records,
        TaskConfig::new()
            .with_ways(3)
            .with_tasks(TaskSource::Count(4)),
        &mut StdRng::seed_from_u64(12),
    )
    .unwrap();
    let stored: HashSet<&Task<i64>> = sampler.store().tasks().iter().collect();

    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..30 {
        let episode = sampler.sample_default(&mut rng).unwrap();
        assert!(stored.contains(episode.task()));
    }
}

#[test]
fn test_prebuilt_index_and_class_subset() {
    let records = create_records(&[4, 4, 4, 4], 9);
    let index = LabelIndex::new(records).unwrap();
    let sampler = EpisodeSampler::from_index(
        index,
        TaskConfig::new().with_ways(2).with_classes(vec![30, 10]),
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap();

    assert_eq!(sampler.len(), 2);
    assert_eq!(sampler.store().get(0).unwrap().labels(), &[30, 10]);
    assert_eq!(sampler.store().get(1).unwrap().labels(), &[10, 30]);
}

#[test]
fn test_precomputed_mapping_index() {
    let records: Vec<(char, i64)> = vec![('a', 1), ('b', 2), ('c', 1)];
    let mut mapping = HashMap::new();
    mapping.insert(1i64, vec![0, 2]);
    mapping.insert(2i64, vec![1]);

    let index = LabelIndex::with_mapping(records, mapping, vec![1, 2]).unwrap();
    let sampler = EpisodeSampler::from_index(
        index,
        TaskConfig::new().with_ways(2),
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap();

    let episode = sampler
        .sample(&mut StdRng::seed_from_u64(1), Some(1), Some(&[2, 1]))
        .unwrap();
    assert_eq!(episode.get(0), Some(&('b', 0)));
}

#[test]
fn test_array_dataset_episode_matrix() {
    let n_features = 3;
    let features = Array2::from_shape_fn((12, n_features), |(i, j)| (i * n_features + j) as f64);
    let labels: Vec<Vec<u32>> = (0..12).map(|i| vec![(i / 4) as u32]).collect();
    let dataset = ArrayDataset::new(features.clone(), labels).unwrap();

    let sampler = EpisodeSampler::new(
        dataset,
        TaskConfig::new().with_ways(3).with_shots(2),
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap();
    let episode = sampler.sample_default(&mut StdRng::seed_from_u64(2)).unwrap();
    let (matrix, encoded) = episode.to_arrays().unwrap();

    assert_eq!(matrix.dim(), (6, n_features));
    assert_eq!(encoded, vec![0, 0, 1, 1, 2, 2]);
    for (row, (feature, _)) in matrix.rows().into_iter().zip(episode.iter()) {
        assert_eq!(row.to_owned(), *feature);
        let original_row = (feature[0] as usize) / n_features;
        let expected: Array1<f64> = features.row(original_row).to_owned();
        assert_eq!(*feature, expected);
    }
}

#[test]
fn test_fixed_sampler_interleaved_layout() {
    let labels = vec![0, 1, 0, 1];
    let sampler = FixedGroupSampler::new(&labels, FixedGroupConfig::new(1, 2, 1, 1)).unwrap();
    assert_eq!(sampler.layout(), BatchLayout::Interleaved);

    let mut rng = StdRng::seed_from_u64(21);
    let flat = sampler.sample_all(&mut rng).unwrap();
    assert_eq!(flat.len(), 4);

    // position-then-class: [c0 s0, c1 s0, c0 s1, c1 s1]
    assert_eq!(labels[flat[0]], labels[flat[2]]);
    assert_eq!(labels[flat[1]], labels[flat[3]]);
    assert_ne!(labels[flat[0]], labels[flat[1]]);
}

#[test]
fn test_fixed_classes_always_rejected() {
    let labels: Vec<usize> = (0..10).map(|i| i % 2).collect();
    for classes in [vec![], vec![0], vec![0, 1], vec![5]] {
        let config = FixedGroupConfig::new(1, 2, 1, 0).with_fixed_classes(classes);
        assert!(matches!(
            FixedGroupSampler::new(&labels, config),
            Err(Error::Unsupported(_))
        ));
    }
}

#[test]
fn test_layouts_selected_explicitly() {
    let records = create_records(&[6, 6, 6], 4);
    let episodic = EpisodeSampler::new(
        records.clone(),
        TaskConfig::new().with_ways(3).with_shots(2),
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap();
    let labels: Vec<usize> = records.iter().map(|&(_, l)| (l / 10) as usize).collect();
    let fixed = FixedGroupSampler::new(&labels, FixedGroupConfig::new(1, 3, 2, 0)).unwrap();

    let mut rng = StdRng::seed_from_u64(5);
    let block = episodic
        .sample_batch_as(&mut rng, BatchLayout::Block)
        .unwrap();
    let interleaved = fixed
        .sample_batch_as(&mut rng, BatchLayout::Block)
        .unwrap();

    assert_eq!(block.labels(), interleaved.labels());
    assert_eq!(block.labels(), &[0, 0, 1, 1, 2, 2]);

    let as_interleaved = block.into_layout(BatchLayout::Interleaved);
    assert_eq!(as_interleaved.labels(), &[0, 1, 2, 0, 1, 2]);
}

#[test]
fn test_config_driven_store() {
    let config: TaskConfig<i64> =
        TaskConfig::from_toml_str("ways = 2\nshots = 2\ntasks = [[0, 10], [20, 0]]\n").unwrap();
    let records = create_records(&[3, 3, 3], 0);
    let sampler = EpisodeSampler::new(records, config, &mut StdRng::seed_from_u64(0)).unwrap();

    assert_eq!(sampler.len(), 2);
    let mut rng = StdRng::seed_from_u64(1);
    let episodes: Vec<_> = sampler
        .traverse(&mut rng)
        .collect::<Result<Vec<_>>>()
        .unwrap();
    assert_eq!(episodes[1].task().labels(), &[20, 0]);
    assert_eq!(episodes[1].len(), 4);
}
