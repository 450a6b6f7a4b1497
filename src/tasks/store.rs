//! Task specification store
//!
//! A task is an ordered tuple of `ways` distinct labels. The store resolves
//! its task list once at construction, either by enumerating every ordered
//! permutation of the configured classes, by drawing a fixed number of
//! random tasks, or by taking an explicit list, and validates every entry.

use crate::data::{LabelIndex, LabelSource, RecordCollection};
use crate::error::{Error, Result};
use rand::seq::index;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

/// Ordered set of distinct labels defining one episode's classes
///
/// Order matters: the same labels in a different order form a different
/// task, because the label encoding follows task order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Task<L>(Vec<L>);

impl<L> Task<L> {
    /// Create a task from labels in encoding order
    pub fn new(labels: Vec<L>) -> Self {
        Self(labels)
    }

    /// Number of classes in the task
    pub fn ways(&self) -> usize {
        self.0.len()
    }

    /// Labels in task order
    pub fn labels(&self) -> &[L] {
        &self.0
    }

    /// Iterate over labels in task order
    pub fn iter(&self) -> std::slice::Iter<'_, L> {
        self.0.iter()
    }

    /// Release the label vector
    pub fn into_inner(self) -> Vec<L> {
        self.0
    }
}

impl<L: PartialEq> Task<L> {
    /// Check whether the task contains `label`
    pub fn contains(&self, label: &L) -> bool {
        self.0.contains(label)
    }
}

impl<L> From<Vec<L>> for Task<L> {
    fn from(labels: Vec<L>) -> Self {
        Self(labels)
    }
}

impl<L> AsRef<[L]> for Task<L> {
    fn as_ref(&self) -> &[L] {
        &self.0
    }
}

impl<'a, L> IntoIterator for &'a Task<L> {
    type Item = &'a L;
    type IntoIter = std::slice::Iter<'a, L>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Where the store's tasks come from
///
/// In a configuration file the `tasks` key is either absent (every ordered
/// permutation), an integer (that many random tasks) or a list of label
/// lists (used verbatim). Any other value fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskSource<L> {
    /// Every ordered permutation of `ways` classes
    All,
    /// This many tasks drawn uniformly at random, repeats allowed
    Count(usize),
    /// Explicit task list
    Explicit(Vec<Vec<L>>),
}

impl<L> TaskSource<L> {
    /// Check whether this is the enumerate-everything source
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl<L> Default for TaskSource<L> {
    fn default() -> Self {
        Self::All
    }
}

fn default_ways() -> usize {
    2
}

fn default_shots() -> Option<usize> {
    Some(1)
}

/// Configuration of a task store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "L: Deserialize<'de>"))]
pub struct TaskConfig<L> {
    /// Number of classes per task (N-way)
    #[serde(default = "default_ways")]
    pub ways: usize,
    /// Default examples per class (K-shot); may be overridden per sample
    #[serde(default = "default_shots", skip_serializing_if = "Option::is_none")]
    pub shots: Option<usize>,
    /// Classes eligible for sampling; all dataset labels when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<L>>,
    /// Task source
    #[serde(default, skip_serializing_if = "TaskSource::is_all")]
    pub tasks: TaskSource<L>,
}

impl<L> Default for TaskConfig<L> {
    fn default() -> Self {
        Self {
            ways: default_ways(),
            shots: default_shots(),
            classes: None,
            tasks: TaskSource::All,
        }
    }
}

impl<L> TaskConfig<L> {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the number of ways
    pub fn with_ways(mut self, ways: usize) -> Self {
        self.ways = ways;
        self
    }

    /// Builder: set the default number of shots
    pub fn with_shots(mut self, shots: usize) -> Self {
        self.shots = Some(shots);
        self
    }

    /// Builder: require shots to be passed on every sample call
    pub fn without_shots(mut self) -> Self {
        self.shots = None;
        self
    }

    /// Builder: restrict sampling to a subset of classes
    pub fn with_classes(mut self, classes: Vec<L>) -> Self {
        self.classes = Some(classes);
        self
    }

    /// Builder: set the task source
    pub fn with_tasks(mut self, tasks: TaskSource<L>) -> Self {
        self.tasks = tasks;
        self
    }
}

impl<L: DeserializeOwned> TaskConfig<L> {
    /// Parse a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Validated, fixed list of tasks plus the sampling defaults
#[derive(Debug, Clone)]
pub struct TaskSpecStore<L> {
    ways: usize,
    shots: Option<usize>,
    classes: Vec<L>,
    tasks: Vec<Task<L>>,
}

impl<L: Clone + Eq + Hash + Debug> TaskSpecStore<L> {
    /// Build a store over the label universe of `index`
    pub fn new<C, R>(index: &LabelIndex<C>, config: TaskConfig<L>, rng: &mut R) -> Result<Self>
    where
        C: RecordCollection,
        C::Target: LabelSource<Label = L>,
        R: Rng + ?Sized,
    {
        Self::from_universe(index.labels(), config, rng)
    }

    /// Build a store over an explicit label universe
    pub fn from_universe<R: Rng + ?Sized>(
        universe: &[L],
        config: TaskConfig<L>,
        rng: &mut R,
    ) -> Result<Self> {
        let TaskConfig {
            ways,
            shots,
            classes,
            tasks,
        } = config;

        if ways == 0 {
            return Err(Error::invalid_parameter("ways", "must be at least 1"));
        }

        let classes = classes.unwrap_or_else(|| universe.to_vec());
        if ways > classes.len() {
            return Err(Error::TooManyWays {
                ways,
                available: classes.len(),
            });
        }

        let known: HashSet<&L> = universe.iter().collect();
        let unknown: Vec<&L> = classes.iter().filter(|c| !known.contains(c)).collect();
        if !unknown.is_empty() {
            return Err(Error::UnknownClasses(format!("{:?}", unknown)));
        }

        let mut seen = HashSet::with_capacity(classes.len());
        if let Some(duplicate) = classes.iter().find(|c| !seen.insert(*c)) {
            return Err(Error::DuplicateLabel(format!("{:?}", duplicate)));
        }

        let (mode, tasks) = match tasks {
            TaskSource::All => ("permutations", permutations(&classes, ways)),
            TaskSource::Count(n) => {
                if n == 0 {
                    tracing::warn!("Task count is 0; the store will hold no tasks");
                }
                ("random", generate_n_tasks(&classes, ways, n, rng))
            }
            TaskSource::Explicit(tasks) => ("explicit", tasks.into_iter().map(Task::new).collect()),
        };

        let store = Self {
            ways,
            shots,
            classes,
            tasks,
        };
        store.check_tasks()?;

        tracing::info!(
            "Built task store: {} {} tasks, {}-way over {} classes",
            store.tasks.len(),
            mode,
            ways,
            store.classes.len()
        );

        Ok(store)
    }

    /// Check that `task` uses only configured classes, each at most once
    pub fn check_task(&self, task: &[L]) -> bool {
        let mut seen = HashSet::with_capacity(task.len());
        task.iter()
            .all(|label| self.classes.contains(label) && seen.insert(label))
    }

    fn check_tasks(&self) -> Result<()> {
        let invalid: Vec<&Task<L>> = self
            .tasks
            .iter()
            .filter(|task| task.ways() != self.ways || !self.check_task(task.labels()))
            .collect();

        if invalid.is_empty() {
            Ok(())
        } else {
            let listed: Vec<&[L]> = invalid.iter().map(|task| task.labels()).collect();
            Err(Error::InvalidTasks(format!("{:?}", listed)))
        }
    }

    /// Pick one stored task uniformly at random
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&Task<L>> {
        if self.tasks.is_empty() {
            return Err(Error::NoTasks);
        }
        Ok(&self.tasks[rng.gen_range(0..self.tasks.len())])
    }
}

impl<L> TaskSpecStore<L> {
    /// Number of stored tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Check whether the store holds no tasks
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Task at `position`
    pub fn get(&self, position: usize) -> Option<&Task<L>> {
        self.tasks.get(position)
    }

    /// All stored tasks in order
    pub fn tasks(&self) -> &[Task<L>] {
        &self.tasks
    }

    /// Number of classes per task
    pub fn ways(&self) -> usize {
        self.ways
    }

    /// Default shots, if configured
    pub fn shots(&self) -> Option<usize> {
        self.shots
    }

    /// Classes eligible for sampling
    pub fn classes(&self) -> &[L] {
        &self.classes
    }
}

/// Ordered `k`-permutations of `items`, in lexicographic order of position
fn permutations<L: Clone>(items: &[L], k: usize) -> Vec<Task<L>> {
    fn walk<L: Clone>(
        items: &[L],
        k: usize,
        used: &mut [bool],
        current: &mut Vec<L>,
        out: &mut Vec<Task<L>>,
    ) {
        if current.len() == k {
            out.push(Task::new(current.clone()));
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            current.push(items[i].clone());
            walk(items, k, used, current, out);
            current.pop();
            used[i] = false;
        }
    }

    let mut out = Vec::new();
    let mut used = vec![false; items.len()];
    let mut current = Vec::with_capacity(k);
    walk(items, k, &mut used, &mut current, &mut out);
    out
}

/// `n` independent draws of `ways` distinct classes; repeats across draws are kept
fn generate_n_tasks<L: Clone, R: Rng + ?Sized>(
    classes: &[L],
    ways: usize,
    n: usize,
    rng: &mut R,
) -> Vec<Task<L>> {
    (0..n)
        .map(|_| {
            let picked = index::sample(rng, classes.len(), ways);
            Task::new(picked.iter().map(|i| classes[i].clone()).collect())
        })
        .collect()
}
