//! Ordering tiers of processors and their classification.

use std::{collections::HashSet, sync::Arc};

use crate::{
    descriptor::Capability,
    errors::RegistryError,
    processors::{ProcessorKind, LOWEST_PRECEDENCE},
    registry::ComponentRegistry,
    types::Instance,
};

/// Tier of a processor, with the order value read from the live processor
///
/// Priority runs before Ordered, Ordered before Unordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingTier {
    Priority(i32),
    Ordered(i32),
    Unordered,
}
impl OrderingTier {
    pub fn rank(&self) -> u8 {
        match self {
            OrderingTier::Priority(_) => 0,
            OrderingTier::Ordered(_) => 1,
            OrderingTier::Unordered => 2,
        }
    }

    pub fn order(&self) -> i32 {
        match self {
            OrderingTier::Priority(order) | OrderingTier::Ordered(order) => *order,
            OrderingTier::Unordered => LOWEST_PRECEDENCE,
        }
    }
}

/// Tier as known from the capability table, before the order value is available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierClass {
    Priority,
    Ordered,
    Unordered,
}
impl TierClass {
    fn of(registry: &ComponentRegistry, name: &str) -> TierClass {
        if registry.is_type_match(name, Capability::PriorityOrdered) {
            TierClass::Priority
        } else if registry.is_type_match(name, Capability::Ordered) {
            TierClass::Ordered
        } else {
            TierClass::Unordered
        }
    }

    fn with_order(self, order: i32) -> OrderingTier {
        match self {
            TierClass::Priority => OrderingTier::Priority(order),
            TierClass::Ordered => OrderingTier::Ordered(order),
            TierClass::Unordered => OrderingTier::Unordered,
        }
    }
}

/// Identifiers of processors which already ran
#[derive(Debug, Default, Clone)]
pub struct ProcessedSet(HashSet<String>);
impl ProcessedSet {
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Returns false if the name was already processed
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.0.insert(name.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A processor known by name only, not instantiated yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredProcessor {
    pub name: String,
    pub discovery: usize,
}
impl DeferredProcessor {
    pub fn resolve<K: ProcessorKind>(
        self,
        registry: &mut ComponentRegistry,
        class: TierClass,
    ) -> Result<ProcessorHandle<K>, RegistryError> {
        let (instance, processor) = registry.resolve_processor::<K>(&self.name)?;
        let tier = class.with_order(K::order(&processor));
        Ok(ProcessorHandle {
            name: self.name,
            discovery: self.discovery,
            tier,
            processor,
            instance,
        })
    }
}

/// A resolved processor with its tier
pub struct ProcessorHandle<K: ProcessorKind> {
    pub name: String,
    /// Position in the scan which discovered the processor
    pub discovery: usize,
    pub tier: OrderingTier,
    pub processor: Arc<K::Processor>,
    pub instance: Instance,
}
impl<K: ProcessorKind> Clone for ProcessorHandle<K> {
    fn clone(&self) -> Self {
        ProcessorHandle {
            name: self.name.clone(),
            discovery: self.discovery,
            tier: self.tier,
            processor: self.processor.clone(),
            instance: self.instance.clone(),
        }
    }
}
impl<K: ProcessorKind> std::fmt::Debug for ProcessorHandle<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorHandle")
            .field("name", &self.name)
            .field("discovery", &self.discovery)
            .field("tier", &self.tier)
            .finish()
    }
}
impl<K: ProcessorKind> ProcessorHandle<K> {
    /// Comparator key: tier rank, then order value, then discovery order
    pub fn sort_key(&self) -> (u8, i32, usize) {
        (self.tier.rank(), self.tier.order(), self.discovery)
    }
}

/// Stable sort by [`ProcessorHandle::sort_key`]
pub fn sort_processors<K: ProcessorKind>(processors: &mut [ProcessorHandle<K>]) {
    processors.sort_by_key(ProcessorHandle::sort_key);
}

/// Resolves deferred processors of one tier, keeping discovery order
pub fn resolve_tier<K: ProcessorKind>(
    registry: &mut ComponentRegistry,
    deferred: Vec<DeferredProcessor>,
    class: TierClass,
) -> Result<Vec<ProcessorHandle<K>>, RegistryError> {
    deferred
        .into_iter()
        .map(|processor| processor.resolve::<K>(registry, class))
        .collect()
}

/// Candidates split by tier
///
/// Priority processors are resolved already, the others are names only.
pub struct Classified<K: ProcessorKind> {
    pub priority: Vec<ProcessorHandle<K>>,
    pub ordered: Vec<DeferredProcessor>,
    pub unordered: Vec<DeferredProcessor>,
}
impl<K: ProcessorKind> Classified<K> {
    pub fn len(&self) -> usize {
        self.priority.len() + self.ordered.len() + self.unordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All classified names, in discovery order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<(usize, &str)> = self
            .priority
            .iter()
            .map(|handle| (handle.discovery, handle.name.as_str()))
            .chain(
                self.ordered
                    .iter()
                    .chain(&self.unordered)
                    .map(|deferred| (deferred.discovery, deferred.name.as_str())),
            )
            .collect();
        names.sort_by_key(|(discovery, _)| *discovery);
        names.into_iter().map(|(_, name)| name.to_string()).collect()
    }

    /// Resolves the remaining tiers and returns the whole batch sorted
    pub fn into_sorted_batch(
        self,
        registry: &mut ComponentRegistry,
    ) -> Result<Vec<ProcessorHandle<K>>, RegistryError> {
        let mut batch = self.priority;
        batch.extend(resolve_tier::<K>(registry, self.ordered, TierClass::Ordered)?);
        batch.extend(resolve_tier::<K>(
            registry,
            self.unordered,
            TierClass::Unordered,
        )?);
        sort_processors(&mut batch);
        Ok(batch)
    }
}

/// Partitions the candidates into ordering tiers
///
/// Candidates in `processed` are skipped. Only priority candidates are instantiated,
/// reading their order value needs a live processor. The others are classified from
/// the capability table alone.
pub fn classify<K: ProcessorKind>(
    registry: &mut ComponentRegistry,
    candidates: &[String],
    processed: &ProcessedSet,
) -> Result<Classified<K>, RegistryError> {
    let mut classified = Classified {
        priority: Vec::new(),
        ordered: Vec::new(),
        unordered: Vec::new(),
    };

    for (discovery, name) in candidates.iter().enumerate() {
        if processed.contains(name) {
            continue;
        }

        let deferred = DeferredProcessor {
            name: name.clone(),
            discovery,
        };
        match TierClass::of(registry, name) {
            TierClass::Priority => classified
                .priority
                .push(deferred.resolve::<K>(registry, TierClass::Priority)?),
            TierClass::Ordered => classified.ordered.push(deferred),
            TierClass::Unordered => classified.unordered.push(deferred),
        }
    }

    tracing::debug!(
        "Classified {} candidates: {} priority, {} ordered, {} unordered",
        classified.len(),
        classified.priority.len(),
        classified.ordered.len(),
        classified.unordered.len()
    );
    Ok(classified)
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;
    use crate::{
        descriptor::ComponentDescriptor,
        processors::{FactoryPostProcessor, FactoryProcessors, HIGHEST_PRECEDENCE},
        types::DynError,
    };

    struct Ranked(i32);
    impl FactoryPostProcessor for Ranked {
        fn post_process_factory(&self, _: &mut ComponentRegistry) -> Result<(), DynError> {
            Ok(())
        }

        fn order(&self) -> i32 {
            self.0
        }
    }

    fn ranked(order: i32, created: &Arc<AtomicUsize>) -> ComponentDescriptor {
        let created = created.clone();
        ComponentDescriptor::factory_processor(move |_| {
            created.fetch_add(1, Ordering::SeqCst);
            Ok(Ranked(order))
        })
    }

    fn names<K: ProcessorKind>(handles: &[ProcessorHandle<K>]) -> Vec<&str> {
        handles.iter().map(|handle| handle.name.as_str()).collect()
    }

    #[test]
    fn tiers_compare_by_rank_then_order() {
        assert!(OrderingTier::Priority(100).rank() < OrderingTier::Ordered(-100).rank());
        assert!(OrderingTier::Ordered(i32::MAX).rank() < OrderingTier::Unordered.rank());
        assert_eq!(OrderingTier::Unordered.order(), LOWEST_PRECEDENCE);
        assert_eq!(OrderingTier::Ordered(5).order(), 5);
    }

    #[test]
    fn only_priority_candidates_are_instantiated() {
        let created = Arc::new(AtomicUsize::new(0));
        let mut registry = ComponentRegistry::new();
        registry.register_descriptor("plain", ranked(0, &created)).unwrap();
        registry
            .register_descriptor("ordered", ranked(5, &created).ordered())
            .unwrap();
        registry
            .register_descriptor("priority", ranked(1, &created).priority_ordered())
            .unwrap();
        let candidates = registry.names_for_capability(Capability::FactoryProcessor, true);

        let classified =
            classify::<FactoryProcessors>(&mut registry, &candidates, &ProcessedSet::default())
                .unwrap();

        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert_eq!(names(&classified.priority), vec!["priority"]);
        assert_eq!(classified.priority[0].tier, OrderingTier::Priority(1));
        assert_eq!(classified.ordered[0].name, "ordered");
        assert_eq!(classified.unordered[0].name, "plain");
        assert_eq!(classified.names(), vec!["plain", "ordered", "priority"]);
    }

    #[test]
    fn processed_candidates_are_skipped() {
        let created = Arc::new(AtomicUsize::new(0));
        let mut registry = ComponentRegistry::new();
        registry
            .register_descriptor("done", ranked(0, &created).priority_ordered())
            .unwrap();
        registry.register_descriptor("new", ranked(0, &created)).unwrap();
        let mut processed = ProcessedSet::default();
        processed.insert("done");

        let candidates = registry.names_for_capability(Capability::FactoryProcessor, true);
        let classified =
            classify::<FactoryProcessors>(&mut registry, &candidates, &processed).unwrap();

        assert_eq!(classified.len(), 1);
        assert_eq!(classified.names(), vec!["new"]);
        assert_eq!(created.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn batch_sorts_by_tier_order_and_discovery() {
        let created = Arc::new(AtomicUsize::new(0));
        let mut registry = ComponentRegistry::new();
        registry.register_descriptor("p3", ranked(-50, &created)).unwrap();
        registry
            .register_descriptor("p1", ranked(5, &created).ordered())
            .unwrap();
        registry
            .register_descriptor("p2", ranked(1, &created).priority_ordered())
            .unwrap();
        registry
            .register_descriptor("p1-tie", ranked(5, &created).ordered())
            .unwrap();
        registry
            .register_descriptor("p0", ranked(-1, &created).ordered())
            .unwrap();
        registry
            .register_descriptor("first", ranked(HIGHEST_PRECEDENCE, &created).ordered())
            .unwrap();
        let candidates = registry.names_for_capability(Capability::FactoryProcessor, true);

        let batch =
            classify::<FactoryProcessors>(&mut registry, &candidates, &ProcessedSet::default())
                .unwrap()
                .into_sorted_batch(&mut registry)
                .unwrap();

        // Unordered ignores the order value of the live processor
        assert_eq!(names(&batch), vec!["p2", "first", "p0", "p1", "p1-tie", "p3"]);
        assert_eq!(batch[5].tier, OrderingTier::Unordered);
    }
}
