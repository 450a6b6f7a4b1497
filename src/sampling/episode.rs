//! Episode sampling
//!
//! An episode is drawn in two levels: pick a task (a stored one at random,
//! or one given by the caller), then draw `shots` records per task label
//! without replacement. Labels are remapped to `0..ways` in task order and
//! the examples are laid out as contiguous per-class blocks.

use crate::data::{LabelIndex, LabelOf, RecordCollection};
use crate::error::{Error, Result};
use crate::sampling::batch::{BatchLayout, IndexBatch, IndexSampler};
use crate::sampling::traversal::Traversal;
use crate::tasks::{LabelEncoder, Task, TaskConfig, TaskSpecStore};
use ndarray::{Array1, Array2};
use rand::seq::index;
use rand::Rng;

/// A sampled few-shot instance
///
/// Holds `shots * ways` `(feature, encoded_label)` pairs in per-class blocks
/// following the task's label order, plus the task itself.
#[derive(Debug, Clone)]
pub struct Episode<F, L> {
    examples: Vec<(F, usize)>,
    task: Task<L>,
    shots: usize,
}

impl<F, L> Episode<F, L> {
    /// Number of examples
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Check whether the episode has no examples
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Number of classes
    pub fn ways(&self) -> usize {
        self.task.ways()
    }

    /// Examples per class
    pub fn shots(&self) -> usize {
        self.shots
    }

    /// Task the episode was drawn for
    pub fn task(&self) -> &Task<L> {
        &self.task
    }

    /// Example at `index`
    pub fn get(&self, index: usize) -> Option<&(F, usize)> {
        self.examples.get(index)
    }

    /// Iterate over `(feature, encoded_label)` pairs
    pub fn iter(&self) -> std::slice::Iter<'_, (F, usize)> {
        self.examples.iter()
    }

    /// Features in episode order
    pub fn features(&self) -> impl Iterator<Item = &F> {
        self.examples.iter().map(|(feature, _)| feature)
    }

    /// Encoded labels in episode order
    pub fn labels(&self) -> Vec<usize> {
        self.examples.iter().map(|&(_, label)| label).collect()
    }

    /// Examples of the class encoded as `class`
    pub fn class_block(&self, class: usize) -> &[(F, usize)] {
        if class >= self.ways() {
            return &[];
        }
        let start = class * self.shots;
        &self.examples[start..start + self.shots]
    }

    /// Original label of an encoded class
    pub fn decode(&self, encoded: usize) -> Option<&L> {
        self.task.labels().get(encoded)
    }

    /// Split into examples and task
    pub fn into_parts(self) -> (Vec<(F, usize)>, Task<L>) {
        (self.examples, self.task)
    }
}

impl<L> Episode<Array1<f64>, L> {
    /// Stack features into a matrix with an aligned label vector
    pub fn to_arrays(&self) -> Result<(Array2<f64>, Vec<usize>)> {
        let dim = self.examples.first().map_or(0, |(f, _)| f.len());
        let mut data = Vec::with_capacity(self.examples.len() * dim);

        for (feature, _) in &self.examples {
            if feature.len() != dim {
                return Err(Error::DimensionMismatch {
                    expected: format!("feature length {}", dim),
                    actual: format!("feature length {}", feature.len()),
                });
            }
            data.extend(feature.iter());
        }

        let features = Array2::from_shape_vec((self.examples.len(), dim), data).map_err(|e| {
            Error::DimensionMismatch {
                expected: format!("{}x{}", self.examples.len(), dim),
                actual: e.to_string(),
            }
        })?;

        Ok((features, self.labels()))
    }
}

impl<'a, F, L> IntoIterator for &'a Episode<F, L> {
    type Item = &'a (F, usize);
    type IntoIter = std::slice::Iter<'a, (F, usize)>;

    fn into_iter(self) -> Self::IntoIter {
        self.examples.iter()
    }
}

/// Generator of few-shot episodes over a labeled record collection
#[derive(Debug)]
pub struct EpisodeSampler<C: RecordCollection> {
    index: LabelIndex<C>,
    store: TaskSpecStore<LabelOf<C>>,
}

impl<C: RecordCollection> EpisodeSampler<C> {
    /// Index `collection` and build the task store
    pub fn new<R: Rng + ?Sized>(
        collection: C,
        config: TaskConfig<LabelOf<C>>,
        rng: &mut R,
    ) -> Result<Self> {
        Self::from_index(LabelIndex::new(collection)?, config, rng)
    }

    /// Build the task store over an existing label index
    pub fn from_index<R: Rng + ?Sized>(
        index: LabelIndex<C>,
        config: TaskConfig<LabelOf<C>>,
        rng: &mut R,
    ) -> Result<Self> {
        let store = TaskSpecStore::from_universe(index.labels(), config, rng)?;
        Ok(Self { index, store })
    }

    /// Label index over the collection
    pub fn index(&self) -> &LabelIndex<C> {
        &self.index
    }

    /// Task store
    pub fn store(&self) -> &TaskSpecStore<LabelOf<C>> {
        &self.store
    }

    /// Number of stored tasks (not a bound on the number of episodes)
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check whether no tasks are stored
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Sample an episode
    ///
    /// `shots` overrides the configured default. Without `task`, one stored
    /// task is picked uniformly; an explicit task must use configured
    /// classes without repeats.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        shots: Option<usize>,
        task: Option<&[LabelOf<C>]>,
    ) -> Result<Episode<C::Feature, LabelOf<C>>> {
        let shots = self.resolve_shots(shots)?;
        let task = self.resolve_task(rng, task)?;
        self.sample_with_task(rng, shots, task)
    }

    /// Sample an episode with default shots and a random stored task
    pub fn sample_default<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Episode<C::Feature, LabelOf<C>>> {
        self.sample(rng, None, None)
    }

    /// Sample an episode for a given task with default shots
    pub fn sample_task<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        task: &[LabelOf<C>],
    ) -> Result<Episode<C::Feature, LabelOf<C>>> {
        self.sample(rng, None, Some(task))
    }

    /// Draw record positions for an episode without materializing features
    pub fn sample_indices<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        shots: Option<usize>,
        task: Option<&[LabelOf<C>]>,
    ) -> Result<(Task<LabelOf<C>>, IndexBatch)> {
        let shots = self.resolve_shots(shots)?;
        let task = self.resolve_task(rng, task)?;
        let batch = self.draw(rng, &task, shots)?;
        Ok((task, batch))
    }

    /// Walk the stored tasks in order, one episode per task
    pub fn traverse<'a, R: Rng + ?Sized>(&'a self, rng: &'a mut R) -> Traversal<'a, C, R> {
        Traversal::new(self, rng)
    }

    pub(crate) fn sample_with_task<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        shots: usize,
        task: Task<LabelOf<C>>,
    ) -> Result<Episode<C::Feature, LabelOf<C>>> {
        let encoder = LabelEncoder::new(task.labels())?;
        let batch = self.draw(rng, &task, shots)?;

        let mut examples = Vec::with_capacity(batch.len());
        for (class, label) in task.iter().enumerate() {
            let encoded = encoder
                .encode(label)
                .ok_or_else(|| Error::InvalidTask(format!("{:?}", task.labels())))?;
            for position in batch.class_positions(class) {
                let feature = self
                    .index
                    .feature(position)
                    .ok_or(Error::MissingRecord { position })?;
                examples.push((feature, encoded));
            }
        }

        tracing::debug!(
            "Sampled {}-way {}-shot episode for task {:?}",
            task.ways(),
            shots,
            task.labels()
        );

        Ok(Episode {
            examples,
            task,
            shots,
        })
    }

    pub(crate) fn resolve_shots(&self, shots: Option<usize>) -> Result<usize> {
        let shots = shots.or(self.store.shots()).ok_or(Error::MissingShots)?;
        if shots == 0 {
            return Err(Error::invalid_parameter("shots", "must be at least 1"));
        }
        Ok(shots)
    }

    fn resolve_task<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        task: Option<&[LabelOf<C>]>,
    ) -> Result<Task<LabelOf<C>>> {
        match task {
            Some(labels) => {
                if !self.store.check_task(labels) {
                    return Err(Error::InvalidTask(format!(
                        "{:?} must use configured classes without repeats",
                        labels
                    )));
                }
                Ok(Task::new(labels.to_vec()))
            }
            None => Ok(self.store.choose(rng)?.clone()),
        }
    }

    /// Draw `shots` positions per task label, without replacement, in task order
    fn draw<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        task: &Task<LabelOf<C>>,
        shots: usize,
    ) -> Result<IndexBatch> {
        let mut groups = Vec::with_capacity(task.ways());
        for label in task {
            let population = self.index.positions(label).unwrap_or(&[]);
            if population.len() < shots {
                return Err(Error::insufficient_population(
                    label,
                    population.len(),
                    shots,
                ));
            }
            let drawn: Vec<usize> = index::sample(rng, population.len(), shots)
                .iter()
                .map(|i| population[i])
                .collect();
            groups.push(drawn);
        }
        Ok(IndexBatch::from_groups(&groups, shots, BatchLayout::Block))
    }
}

impl<C: RecordCollection> IndexSampler for EpisodeSampler<C> {
    fn layout(&self) -> BatchLayout {
        BatchLayout::Block
    }

    fn sample_batch<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<IndexBatch> {
        self.sample_indices(rng, None, None).map(|(_, batch)| batch)
    }
}
