//! Recursive, concurrent expansion of a block tree.
//!
//! Sibling subtrees are fetched concurrently; the [`BlockSource`] gate bounds
//! how many listings are actually in flight. Results are attached by position,
//! so the assembled tree preserves server order no matter which fetch
//! finishes first.

use crate::client::BlockSource;
use crate::types::{Block, Fetched};
use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Counters collected while expanding a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Child listings requested, the root listing included.
    pub listings: u64,
    /// Blocks returned across all listings.
    pub blocks: u64,
    /// Listings that ended early.
    pub truncated: u64,
}

#[derive(Default)]
struct Counters {
    listings: AtomicU64,
    blocks: AtomicU64,
    truncated: AtomicU64,
}

/// Builds a fully expanded tree below a root id.
pub struct TreeFetcher<S> {
    source: S,
    counters: Counters,
}

impl<S: BlockSource> TreeFetcher<S> {
    /// Wrap a source; counters start at zero.
    pub fn new(source: S) -> Self {
        Self {
            source,
            counters: Counters::default(),
        }
    }

    /// The underlying source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Snapshot of the counters accumulated so far.
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            listings: self.counters.listings.load(Ordering::Relaxed),
            blocks: self.counters.blocks.load(Ordering::Relaxed),
            truncated: self.counters.truncated.load(Ordering::Relaxed),
        }
    }

    /// Fetch the children of `root_id` and, recursively, every expandable descendant.
    ///
    /// The returned status describes the root listing only. Deeper failures are
    /// recorded on the affected block as [`ChildrenState::Truncated`](crate::ChildrenState)
    /// and never abort sibling subtrees. Child pages are not descended into.
    pub async fn fetch_tree(&self, root_id: &str) -> Fetched<Block> {
        self.expand(root_id).await
    }

    fn expand<'a>(&'a self, block_id: &'a str) -> BoxFuture<'a, Fetched<Block>> {
        async move {
            let mut listing = self.source.list_children(block_id).await;
            self.record(block_id, &listing);

            let subtrees = join_all(
                listing
                    .items
                    .iter()
                    .filter(|block| block.should_expand())
                    .map(|block| self.expand(&block.id)),
            )
            .await;

            let expandable = listing.items.iter_mut().filter(|block| block.should_expand());
            for (block, subtree) in expandable.zip(subtrees) {
                let truncated = !subtree.is_complete();
                block.attach_children(subtree.items, truncated);
            }

            listing
        }
        .boxed()
    }

    fn record(&self, block_id: &str, listing: &Fetched<Block>) {
        self.counters.listings.fetch_add(1, Ordering::Relaxed);
        self.counters
            .blocks
            .fetch_add(listing.items.len() as u64, Ordering::Relaxed);

        match listing.failure() {
            Some(failure) => {
                self.counters.truncated.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "Children of {block_id} are incomplete ({} retrieved): {failure}",
                    listing.items.len()
                );
            },
            None => debug!("Listed {} children of {block_id}", listing.items.len()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{BlockKind, ChildrenState, FetchFailure, Page};
    use async_trait::async_trait;
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// In-memory source with per-id latency and failures.
    #[derive(Default)]
    struct FakeSource {
        children: HashMap<String, Vec<Block>>,
        delays: HashMap<String, Duration>,
        failures: HashMap<String, FetchFailure>,
        requested: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn with_children(mut self, parent: &str, children: Vec<Block>) -> Self {
            self.children.insert(parent.to_string(), children);
            self
        }

        fn with_delay(mut self, id: &str, delay: Duration) -> Self {
            self.delays.insert(id.to_string(), delay);
            self
        }

        fn with_failure(mut self, id: &str, failure: FetchFailure) -> Self {
            self.failures.insert(id.to_string(), failure);
            self
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BlockSource for FakeSource {
        async fn list_children(&self, block_id: &str) -> Fetched<Block> {
            self.requested.lock().unwrap().push(block_id.to_string());
            if let Some(delay) = self.delays.get(block_id) {
                tokio::time::sleep(*delay).await;
            }
            let items = self.children.get(block_id).cloned().unwrap_or_default();
            match self.failures.get(block_id) {
                Some(failure) => Fetched::truncated(Vec::new(), failure.clone()),
                None => Fetched::complete(items),
            }
        }

        async fn search(&self, _query: &str) -> Fetched<Page> {
            Fetched::complete(Vec::new())
        }
    }

    fn para(id: &str) -> Block {
        Block::new(id, BlockKind::Paragraph, json!({"rich_text": []}))
    }

    fn parent(id: &str) -> Block {
        Block::new(id, BlockKind::Toggle, json!({"rich_text": []})).with_has_children(true)
    }

    fn preorder(blocks: &[Block], out: &mut Vec<String>) {
        for block in blocks {
            out.push(block.id.clone());
            preorder(block.children(), out);
        }
    }

    #[tokio::test]
    async fn test_nested_children_attached_in_order() {
        let source = FakeSource::default()
            .with_children("root", vec![parent("a"), para("b"), parent("c")])
            .with_children("a", vec![para("a1"), parent("a2")])
            .with_children("a2", vec![para("a2x")])
            .with_children("c", vec![para("c1")])
            .with_delay("a", Duration::from_millis(30));

        let fetcher = TreeFetcher::new(source);
        let tree = fetcher.fetch_tree("root").await;

        assert!(tree.is_complete());
        let mut ids = Vec::new();
        preorder(&tree.items, &mut ids);
        assert_eq!(ids, ["a", "a1", "a2", "a2x", "b", "c", "c1"]);
        assert_eq!(tree.items[0].children_state(), ChildrenState::Complete);
        assert_eq!(tree.items[1].children_state(), ChildrenState::NotFetched);

        let stats = fetcher.stats();
        assert_eq!(stats.listings, 4);
        assert_eq!(stats.blocks, 7);
        assert_eq!(stats.truncated, 0);
    }

    #[tokio::test]
    async fn test_child_page_is_never_requested() {
        let sub_page =
            Block::new("sub", BlockKind::ChildPage, json!({"title": "Sub"})).with_has_children(true);
        let source = FakeSource::default()
            .with_children("root", vec![sub_page, para("p")])
            .with_children("sub", vec![para("hidden")]);

        let fetcher = TreeFetcher::new(source);
        let tree = fetcher.fetch_tree("root").await;

        assert_eq!(tree.items.len(), 2);
        assert!(tree.items[0].children().is_empty());
        assert_eq!(fetcher.source().requested(), ["root"]);
    }

    #[tokio::test]
    async fn test_failed_subtree_does_not_abort_siblings() {
        let source = FakeSource::default()
            .with_children("root", vec![parent("locked"), parent("open")])
            .with_children("open", vec![para("visible")])
            .with_failure(
                "locked",
                FetchFailure::AccessDenied {
                    block_id: "locked".to_string(),
                },
            );

        let fetcher = TreeFetcher::new(source);
        let tree = fetcher.fetch_tree("root").await;

        assert!(tree.is_complete());
        let locked = &tree.items[0];
        assert!(locked.children().is_empty());
        assert_eq!(locked.children_state(), ChildrenState::Truncated);

        let open = &tree.items[1];
        assert_eq!(open.children().len(), 1);
        assert_eq!(open.children()[0].id, "visible");
        assert_eq!(fetcher.stats().truncated, 1);
    }

    #[tokio::test]
    async fn test_root_failure_is_reported() {
        let source = FakeSource::default()
            .with_failure("root", FetchFailure::RateLimited { attempts: 3 });

        let tree = TreeFetcher::new(source).fetch_tree("root").await;
        assert!(tree.is_empty());
        assert_eq!(tree.failure(), Some(&FetchFailure::RateLimited { attempts: 3 }));
    }

    #[tokio::test]
    async fn test_siblings_fetch_concurrently() {
        let mut source = FakeSource::default().with_children(
            "root",
            (0..5).map(|i| parent(&format!("n{i}"))).collect(),
        );
        for i in 0..5 {
            source = source.with_delay(&format!("n{i}"), Duration::from_millis(100));
        }

        let started = std::time::Instant::now();
        let tree = TreeFetcher::new(source).fetch_tree("root").await;
        assert_eq!(tree.items.len(), 5);
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    /// Level-one nodes, each with a listing delay and a list of level-two
    /// listing delays.
    fn random_tree() -> impl Strategy<Value = Vec<(u64, Vec<u64>)>> {
        prop::collection::vec((0u64..6, prop::collection::vec(0u64..6, 0..4)), 1..6)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn test_order_preserved_under_random_latency(shape in random_tree()) {
            let mut source = FakeSource::default();
            let mut expected = Vec::new();
            let mut top = Vec::new();

            for (i, (delay, grandchildren)) in shape.iter().enumerate() {
                let id = format!("n{i}");
                expected.push(id.clone());
                top.push(parent(&id));

                let mut level_two = Vec::new();
                for (j, child_delay) in grandchildren.iter().enumerate() {
                    let child_id = format!("{id}.{j}");
                    let leaf_id = format!("{child_id}.leaf");
                    expected.push(child_id.clone());
                    expected.push(leaf_id.clone());
                    level_two.push(parent(&child_id));
                    source = source
                        .with_children(&child_id, vec![para(&leaf_id)])
                        .with_delay(&child_id, Duration::from_millis(*child_delay));
                }
                source = source
                    .with_children(&id, level_two)
                    .with_delay(&id, Duration::from_millis(*delay));
            }
            source = source.with_children("root", top);

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();
            let tree = runtime.block_on(TreeFetcher::new(source).fetch_tree("root"));

            let mut ids = Vec::new();
            preorder(&tree.items, &mut ids);
            prop_assert_eq!(ids, expected);
        }
    }
}
