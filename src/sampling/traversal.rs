//! Sequential walk over stored tasks
//!
//! Each traversal owns its own cursor, so several passes over one sampler
//! never interfere with each other.

use crate::data::{LabelOf, RecordCollection};
use crate::error::Result;
use crate::sampling::episode::{Episode, EpisodeSampler};
use rand::Rng;

/// Single pass over the stored tasks, one episode per task
pub struct Traversal<'a, C: RecordCollection, R: ?Sized> {
    sampler: &'a EpisodeSampler<C>,
    rng: &'a mut R,
    position: usize,
}

impl<'a, C: RecordCollection, R: Rng + ?Sized> Traversal<'a, C, R> {
    pub(crate) fn new(sampler: &'a EpisodeSampler<C>, rng: &'a mut R) -> Self {
        Self {
            sampler,
            rng,
            position: 0,
        }
    }

    /// Index of the next task to sample
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of stored tasks, fixed for the whole pass
    ///
    /// Tasks still to come are reported by `size_hint`.
    pub fn task_count(&self) -> usize {
        self.sampler.len()
    }
}

impl<'a, C: RecordCollection, R: Rng + ?Sized> Iterator for Traversal<'a, C, R> {
    type Item = Result<Episode<C::Feature, LabelOf<C>>>;

    fn next(&mut self) -> Option<Self::Item> {
        let task = self.sampler.store().get(self.position)?.clone();
        self.position += 1;

        let episode = self
            .sampler
            .resolve_shots(None)
            .and_then(|shots| self.sampler.sample_with_task(self.rng, shots, task));
        Some(episode)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.sampler.len().saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::sampling::EpisodeSampler;
    use crate::tasks::TaskConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn records() -> Vec<(usize, u8)> {
        (0..30).map(|i| (i, (i % 3) as u8)).collect()
    }

    #[test]
    fn test_walks_every_task_in_order() {
        let sampler = EpisodeSampler::new(
            records(),
            TaskConfig::new().with_ways(2).with_shots(2),
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let mut traversal = sampler.traverse(&mut rng);
        assert_eq!(traversal.task_count(), 6);
        assert_eq!(traversal.size_hint(), (6, Some(6)));

        for expected in sampler.store().tasks() {
            let episode = traversal.next().unwrap().unwrap();
            assert_eq!(episode.task(), expected);
            assert_eq!(episode.len(), 4);
        }
        assert_eq!(traversal.position(), 6);
        assert_eq!(traversal.task_count(), 6);
        assert_eq!(traversal.size_hint(), (0, Some(0)));
        assert!(traversal.next().is_none());
        assert!(traversal.next().is_none());
    }

    #[test]
    fn test_independent_traversals() {
        let sampler = EpisodeSampler::new(
            records(),
            TaskConfig::new().with_ways(3),
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap();
        let mut rng_a = StdRng::seed_from_u64(1);
        let mut rng_b = StdRng::seed_from_u64(2);

        let mut first = sampler.traverse(&mut rng_a);
        first.next();
        first.next();

        let second = sampler.traverse(&mut rng_b);
        assert_eq!(second.position(), 0);
        assert_eq!(second.count(), 6);
        assert_eq!(first.position(), 2);
        assert_eq!(first.count(), 4);
    }

    #[test]
    fn test_traversal_needs_default_shots() {
        let sampler = EpisodeSampler::new(
            records(),
            TaskConfig::new().with_ways(2).without_shots(),
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let first = sampler.traverse(&mut rng).next().unwrap();
        assert!(matches!(first, Err(Error::MissingShots)));
    }
}
