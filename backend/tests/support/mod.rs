//! Shared harness for the in-memory behaviour suites.

use std::future::Future;
use std::sync::Arc;

use content_backend::domain::{CallContext, ContentId, ServiceLimits, UserId};
use content_backend::outbound::memory::InMemoryStore;
use content_backend::services::ContentServices;
use content_backend::test_support::MutableClock;
use tokio::runtime::Runtime;

/// Services over a fresh in-memory store, driven from synchronous steps.
#[derive(Clone)]
pub struct Harness {
    runtime: Arc<Runtime>,
    pub store: InMemoryStore,
    pub services: ContentServices,
    pub clock: Arc<MutableClock>,
}

impl Harness {
    pub fn new() -> Self {
        let runtime = Runtime::new().expect("create runtime");
        let store = InMemoryStore::new();
        let clock = Arc::new(MutableClock::default());
        let services =
            ContentServices::in_memory(store.clone(), clock.clone(), ServiceLimits::default());
        Self {
            runtime: Arc::new(runtime),
            store,
            services,
            clock,
        }
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn with_user(&self, raw: i64) -> UserId {
        let user_id = UserId::new(raw);
        self.store.add_user(user_id);
        user_id
    }

    pub fn with_content(&self, raw: i64) -> ContentId {
        let content_id = ContentId::new(raw);
        self.store.add_content(content_id);
        content_id
    }
}

pub fn ctx() -> CallContext {
    CallContext::background()
}

/// Strip the quotes Gherkin string placeholders keep.
pub fn unquote(raw: &str) -> &str {
    raw.trim_matches('"')
}
