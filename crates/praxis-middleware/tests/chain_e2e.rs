//! End-to-end chain integration tests.
//!
//! These tests assemble the bundled stages the way a real service
//! would and verify how they behave together:
//!
//! - audit (outermost) - records every invocation, even rejected ones
//! - rate_limit - caps invocations in a sliding window
//! - validate - rejects malformed requests before the handler
//! - cache - serves repeats without the handler
//! - notify (innermost) - announces handler-produced successes

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use praxis_core::{
    BoxFuture, Deps, Fault, FaultKind, MemoryCache, OpContext, OpResult, ValueCache,
};
use praxis_middleware::stages::{
    require_in_range, require_non_empty, AuditOutcome, AuditStage, CacheKey, CacheStage,
    MemoryAuditSink, Notifier, NotifyEvent, NotifyStage, RateLimitStage, Validate,
    ValidateStage,
};
use praxis_middleware::{BoxedMiddleware, Chain};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SearchRequest {
    query: String,
    limit: usize,
}

impl Validate for SearchRequest {
    fn validate(&self) -> OpResult<()> {
        require_non_empty("query", &self.query)?;
        require_in_range("limit", self.limit, 1, 100)
    }
}

impl CacheKey for SearchRequest {
    fn cache_key(&self) -> Option<String> {
        Some(format!("search:{}:{}", self.query, self.limit))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SearchResponse {
    hits: Vec<String>,
}

/// Store shared by every invocation; counts handler executions.
struct SearchIndex {
    docs: Vec<&'static str>,
    scans: AtomicUsize,
}

impl SearchIndex {
    fn seeded() -> Self {
        Self {
            docs: vec!["praxis handbook", "chain cookbook", "fault field guide"],
            scans: AtomicUsize::new(0),
        }
    }

    fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }
}

async fn search(
    _ctx: OpContext,
    deps: Deps<SearchIndex>,
    req: SearchRequest,
) -> OpResult<SearchResponse> {
    let index = deps.store();
    index.scans.fetch_add(1, Ordering::SeqCst);
    let hits = index
        .docs
        .iter()
        .filter(|doc| doc.contains(&req.query))
        .take(req.limit)
        .map(|doc| (*doc).to_owned())
        .collect();
    Ok(SearchResponse { hits })
}

#[derive(Clone, Default)]
struct CollectingNotifier {
    events: Arc<Mutex<Vec<NotifyEvent>>>,
}

impl CollectingNotifier {
    fn events(&self) -> Vec<NotifyEvent> {
        self.events.lock().clone()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, event: NotifyEvent) -> BoxFuture<'static, anyhow::Result<()>> {
        let events = Arc::clone(&self.events);
        Box::pin(async move {
            events.lock().push(event);
            Ok(())
        })
    }
}

struct Harness {
    chain: Chain<SearchRequest, SearchResponse>,
    index: Arc<SearchIndex>,
    sink: MemoryAuditSink,
    notifier: CollectingNotifier,
}

/// Assembles the five bundled stages around the search handler.
fn harness(limit_per_minute: u64) -> Harness {
    let index = Arc::new(SearchIndex::seeded());
    let sink = MemoryAuditSink::new();
    let notifier = CollectingNotifier::default();
    let cache: Arc<dyn ValueCache> = Arc::new(MemoryCache::new());

    let stages: Vec<BoxedMiddleware<SearchRequest, SearchResponse>> = vec![
        Arc::new(AuditStage::new(Arc::new(sink.clone()))),
        Arc::new(
            RateLimitStage::builder()
                .limit(limit_per_minute)
                .window_secs(60)
                .build(),
        ),
        Arc::new(ValidateStage::new()),
        Arc::new(CacheStage::new(cache)),
        Arc::new(NotifyStage::new(Arc::new(notifier.clone()))),
    ];

    let chain = Chain::compile(stages, Arc::new(search), Deps::new(Arc::clone(&index)));
    Harness {
        chain,
        index,
        sink,
        notifier,
    }
}

fn ctx() -> OpContext {
    OpContext::new().with_operation("search_notes")
}

fn request(query: &str) -> SearchRequest {
    SearchRequest {
        query: query.to_owned(),
        limit: 10,
    }
}

// ============================================================================
// Happy Path
// ============================================================================

#[tokio::test]
async fn test_full_chain_serves_audits_and_notifies() {
    let h = harness(50);

    let response = h.chain.call(ctx(), request("chain")).await.unwrap();
    assert_eq!(response.hits, vec!["chain cookbook"]);

    let entries = h.sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].operation, "search_notes");
    assert_eq!(entries[0].outcome, AuditOutcome::Succeeded);

    let events = h.notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].operation, "search_notes");
}

#[tokio::test]
async fn test_chain_full_stage_roster() {
    let h = harness(50);
    assert_eq!(
        h.chain.stage_names(),
        ["audit", "rate_limit", "validate", "cache", "notify"]
    );
}

// ============================================================================
// Short-Circuits
// ============================================================================

#[tokio::test]
async fn test_validation_rejection_never_reaches_the_handler() {
    let h = harness(50);

    let fault = h.chain.call(ctx(), request("   ")).await.unwrap_err();
    assert_eq!(fault.kind(), Some(FaultKind::MISSING_REQUIRED));

    assert_eq!(h.index.scans(), 0);
    assert!(h.notifier.events().is_empty());

    // The outer audit stage still saw the rejected invocation.
    let entries = h.sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].outcome, AuditOutcome::Failed);
}

#[tokio::test]
async fn test_cache_hit_skips_handler_but_outer_stages_still_run() {
    let h = harness(50);

    let first = h.chain.call(ctx(), request("chain")).await.unwrap();
    let second = h.chain.call(ctx(), request("chain")).await.unwrap();
    assert_eq!(first, second);

    // One handler execution; the repeat came from the cache.
    assert_eq!(h.index.scans(), 1);

    // Audit sits outside the cache, so both invocations were recorded.
    assert_eq!(h.sink.entries().len(), 2);
    assert!(h
        .sink
        .entries()
        .iter()
        .all(|entry| entry.outcome == AuditOutcome::Succeeded));

    // Notify sits inside the cache, so only the handler-produced
    // response was announced.
    assert_eq!(h.notifier.events().len(), 1);
}

#[tokio::test]
async fn test_rate_limited_invocation_is_out_of_range_and_audited() {
    let h = harness(2);

    assert!(h.chain.call(ctx(), request("praxis")).await.is_ok());
    assert!(h.chain.call(ctx(), request("fault")).await.is_ok());

    let fault = h.chain.call(ctx(), request("guide")).await.unwrap_err();
    assert_eq!(fault.kind(), Some(FaultKind::OUT_OF_RANGE));

    let entries = h.sink.entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[2].outcome, AuditOutcome::Failed);
}

// ============================================================================
// Error Propagation
// ============================================================================

#[tokio::test]
async fn test_handler_fault_travels_out_through_every_stage() {
    async fn failing(
        _ctx: OpContext,
        _deps: Deps<SearchIndex>,
        _req: SearchRequest,
    ) -> OpResult<SearchResponse> {
        Err(Fault::not_found("index not built yet").wrap("searching notes"))
    }

    let sink = MemoryAuditSink::new();
    let stages: Vec<BoxedMiddleware<SearchRequest, SearchResponse>> =
        vec![Arc::new(AuditStage::new(Arc::new(sink.clone())))];
    let chain = Chain::compile(
        stages,
        Arc::new(failing),
        Deps::new(Arc::new(SearchIndex::seeded())),
    );

    let fault = chain.call(ctx(), request("chain")).await.unwrap_err();
    assert_eq!(fault.to_string(), "searching notes");
    assert_eq!(sink.entries()[0].outcome, AuditOutcome::Failed);
}
