//! Best-effort structural sharing: the lock-free node interning cache.

use std::fmt;

use arc_swap::ArcSwapOption;
use triomphe::Arc;

use crate::green::{GreenTree, NodeKind as _};
use crate::hash;

/// Default slot count, large enough that real-world construction mostly
/// collides on purpose (structural repeats) rather than by accident.
const DEFAULT_CAPACITY: usize = 1 << 16;

/// Hash of a node's kind, per-node data, and child identities, as computed
/// and verified by [`NodeCache`]. Opaque: the only way to obtain one is a
/// probe, and the only thing to do with it is pass it to
/// [`add`](NodeCache::add).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CacheHash(u32);

/// One admitted entry: the hash it was filed under plus the node itself.
/// Entries are immutable and only ever replaced wholesale.
struct Entry<G> {
    hash: CacheHash,
    node: Arc<G>,
}

/// Direct-mapped, fixed-size, lock-free cache that collapses structurally
/// identical subtrees onto one allocation.
///
/// Every lookup re-verifies the stored hash and shape before trusting a
/// slot, so the cache can afford to be sloppy everywhere else: collisions
/// overwrite, races lose silently, and the worst outcome of any
/// interleaving is a redundant allocation. A hit is always structurally the
/// node asked for.
///
/// One cache serves one tree family; construct it once and pass it by
/// reference to the family's constructors. It holds opportunistic,
/// overwritable references only and must never double as an ownership root.
pub struct NodeCache<G> {
    slots: Box<[ArcSwapOption<Entry<G>>]>,
    mask: u32,
}

impl<G: GreenTree> NodeCache<G> {
    /// Creates a cache with the default slot count.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a cache with `capacity` slots, rounded up to a power of two.
    ///
    /// # Panics
    ///
    /// Panics when `capacity` is zero or exceeds the 32-bit hash space.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "a node cache needs at least one slot");
        assert!(capacity <= 1 << 31, "cache capacity exceeds the 32-bit hash space");
        let capacity = capacity.next_power_of_two();
        let slots: Box<[_]> = (0..capacity).map(|_| ArcSwapOption::empty()).collect();
        Self { slots, mask: (capacity - 1) as u32 }
    }

    /// Returns the number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Looks for a node with `kind` and exactly `children` in its slots.
    ///
    /// Returns the resident node on a hit, plus the hash the caller hands
    /// to [`add`](Self::add) after building the node on a miss. A `None`
    /// hash means the node must not be cached (some present child is not
    /// cacheable); there is nothing worth probing for then either, so the
    /// lookup is skipped altogether.
    ///
    /// `children` must list every slot of the prospective node, absent ones
    /// included, and the node must be fully determined by kind and children
    /// (a [`data_hash`](GreenTree::data_hash) of zero). Childless and
    /// data-carrying nodes go through [`try_get_leaf`](Self::try_get_leaf)
    /// instead. Never allocates, never blocks.
    pub fn try_get<const N: usize>(
        &self,
        kind: G::Kind,
        children: [Option<&Arc<G>>; N],
    ) -> (Option<Arc<G>>, Option<CacheHash>) {
        const { assert!(N >= 1 && N <= 3, "nodes hold at most three slots") };
        if children.iter().copied().flatten().any(|child| !child.is_cacheable()) {
            return (None, None);
        }
        let seed = hash::combine1(u32::from(kind.raw()), 0);
        let hash = CacheHash(hash::combine_values(
            children.iter().copied().flatten().map(identity_hash),
            seed,
        ));
        let found = self.lookup(hash, |node| {
            node.kind() == kind
                && node.slot_count() == N
                && (0..N).all(|index| match (node.slot(index), children[index]) {
                    (None, None) => true,
                    (Some(resident), Some(fresh)) => Arc::ptr_eq(resident, fresh),
                    _ => false,
                })
        });
        (found, Some(hash))
    }

    /// Looks for a childless node with `kind` and the per-node data summed
    /// up by `data_hash`, confirmed by `matches`.
    ///
    /// The data fingerprint takes the place of child identities for leaves;
    /// without it, every leaf of one kind would fight over a single slot.
    /// `data_hash` must equal the prospective node's
    /// [`data_hash`](GreenTree::data_hash), and `matches` must accept
    /// exactly the nodes equal to the one about to be built.
    pub fn try_get_leaf(
        &self,
        kind: G::Kind,
        data_hash: u32,
        matches: impl FnOnce(&G) -> bool,
    ) -> (Option<Arc<G>>, CacheHash) {
        let hash = CacheHash(hash::combine1(u32::from(kind.raw()), data_hash));
        let found = self
            .lookup(hash, |node| node.kind() == kind && node.slot_count() == 0 && matches(node));
        (found, hash)
    }

    /// Offers a freshly built node for admission under `hash`, as returned
    /// by the probe that preceded the allocation.
    ///
    /// Admission is refused silently unless the node is cacheable and every
    /// present child is currently resident in its own slot. Canonicalize
    /// bottom-up: admit children before parents, or the parents never
    /// dedup.
    pub fn add(&self, node: &Arc<G>, hash: CacheHash) {
        if !node.is_cacheable() || !self.children_resident(node) {
            return;
        }
        debug_assert_eq!(
            Self::hash_of(node),
            Some(hash),
            "node offered under a hash its contents do not produce",
        );
        let entry = Entry { hash, node: node.clone() };
        self.slots[self.slot_index(hash)].store(Some(std::sync::Arc::new(entry)));
    }

    /// Returns whether `node` is the current occupant of its own slot.
    ///
    /// Best-effort like everything here: the answer can go stale the moment
    /// a colliding admission lands. Equivalent-but-distinct instances are
    /// never confused for one another.
    pub fn contains(&self, node: &Arc<G>) -> bool {
        let Some(hash) = Self::hash_of(node) else {
            return false;
        };
        let guard = self.slots[self.slot_index(hash)].load();
        guard.as_ref().is_some_and(|entry| Arc::ptr_eq(&entry.node, node))
    }

    /// Loads the slot for `hash` and returns its node if the stored hash
    /// matches and `verify` accepts it.
    fn lookup(&self, hash: CacheHash, verify: impl FnOnce(&G) -> bool) -> Option<Arc<G>> {
        let guard = self.slots[self.slot_index(hash)].load();
        let entry = guard.as_ref()?;
        if entry.hash == hash && verify(&entry.node) { Some(entry.node.clone()) } else { None }
    }

    fn children_resident(&self, node: &G) -> bool {
        node.children().all(|child| self.contains(child))
    }

    /// Recomputes the hash `node` files under, or `None` when the node must
    /// not be cached.
    fn hash_of(node: &G) -> Option<CacheHash> {
        if !node.is_cacheable() {
            return None;
        }
        let seed = hash::combine1(u32::from(node.kind().raw()), node.data_hash());
        Some(CacheHash(hash::combine_values(node.children().map(identity_hash), seed)))
    }

    #[inline]
    fn slot_index(&self, hash: CacheHash) -> usize {
        (hash.0 & self.mask) as usize
    }
}

impl<G: GreenTree> Default for NodeCache<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: GreenTree> fmt::Debug for NodeCache<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeCache").field("capacity", &self.capacity()).finish_non_exhaustive()
    }
}

/// Identity hash of a shared green allocation: its address folded to 32
/// bits. Stable for the allocation's lifetime, unrelated to its contents.
fn identity_hash<G>(node: &Arc<G>) -> u32 {
    let ptr: *const G = &**node;
    let addr = ptr as usize as u64;
    ((addr >> 32) ^ addr) as u32
}
