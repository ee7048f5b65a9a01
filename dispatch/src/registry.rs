//! Handler records and the per-kind registry with stable priority ordering.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tgbot_core::{BoxFuture, Filters, Payload, Result, UpdateData, UpdateKind};

/// What a handler tells the engine after running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerResponse {
    /// The update is handled; matching stops.
    Done,
    /// Act as if this handler had not matched; matching resumes at the next
    /// record in sequence.
    Continue,
}

type PayloadFn = Arc<dyn Fn(Payload) -> BoxFuture<'static, Result<HandlerResponse>> + Send + Sync>;
type DataFn =
    Arc<dyn Fn(Payload, UpdateData) -> BoxFuture<'static, Result<HandlerResponse>> + Send + Sync>;

/// Handler callback, with its signature fixed at registration: payload only, or
/// payload plus the per-update data map middleware writes into.
#[derive(Clone)]
pub enum Callback {
    Payload(PayloadFn),
    WithData(DataFn),
}

impl Callback {
    /// Wraps an async handler taking the payload only.
    pub fn from_payload<F, Fut>(f: F) -> Self
    where
        F: Fn(Payload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HandlerResponse>> + Send + 'static,
    {
        Callback::Payload(Arc::new(move |payload| Box::pin(f(payload))))
    }

    /// Wraps an async handler taking the payload and the per-update data map.
    pub fn with_data<F, Fut>(f: F) -> Self
    where
        F: Fn(Payload, UpdateData) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HandlerResponse>> + Send + 'static,
    {
        Callback::WithData(Arc::new(move |payload, data| Box::pin(f(payload, data))))
    }

    pub(crate) async fn invoke(&self, payload: Payload, data: UpdateData) -> Result<HandlerResponse> {
        match self {
            Callback::Payload(f) => f(payload).await,
            Callback::WithData(f) => f(payload, data).await,
        }
    }
}

impl std::fmt::Debug for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callback::Payload(_) => f.write_str("Callback::Payload"),
            Callback::WithData(_) => f.write_str("Callback::WithData"),
        }
    }
}

/// One registered handler: callback, filter set, optional name, priority.
/// Never mutated after registration.
#[derive(Clone, Debug)]
pub struct HandlerRecord {
    name: Option<String>,
    priority: i32,
    filters: Filters,
    callback: Callback,
}

impl HandlerRecord {
    /// Default priority of a handler registered without one.
    pub const DEFAULT_PRIORITY: i32 = 1;

    pub fn new(callback: Callback) -> Self {
        HandlerRecord {
            name: None,
            priority: Self::DEFAULT_PRIORITY,
            filters: Filters::new(),
            callback,
        }
    }

    pub fn filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Higher runs first; ties preserve registration order.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn filter_set(&self) -> &Filters {
        &self.filters
    }

    pub fn handler_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn handler_priority(&self) -> i32 {
        self.priority
    }

    pub(crate) async fn invoke(&self, payload: Payload, data: UpdateData) -> Result<HandlerResponse> {
        self.callback.invoke(payload, data).await
    }
}

/// Ordered handler collections, one per update kind. Re-sorted stably on every
/// insert, descending by priority, so lookup is plain slice iteration.
#[derive(Debug, Default)]
pub struct Registry {
    handlers: HashMap<UpdateKind, Vec<HandlerRecord>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    pub fn register(&mut self, kind: UpdateKind, record: HandlerRecord) {
        let records = self.handlers.entry(kind).or_default();
        records.push(record);
        // Stable sort: equal priorities keep registration order.
        records.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    pub fn lookup(&self, kind: UpdateKind) -> &[HandlerRecord] {
        self.handlers.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, kind: UpdateKind) -> usize {
        self.lookup(kind).len()
    }

    /// Process-wide reset; the only way records are removed.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Callback {
        Callback::from_payload(|_| async { Ok(HandlerResponse::Done) })
    }

    #[test]
    fn registry_orders_by_priority_then_registration() {
        let mut registry = Registry::new();
        registry.register(UpdateKind::Message, HandlerRecord::new(noop()).name("a").priority(5));
        registry.register(UpdateKind::Message, HandlerRecord::new(noop()).name("b").priority(5));
        registry.register(UpdateKind::Message, HandlerRecord::new(noop()).name("c").priority(10));

        let names: Vec<&str> = registry
            .lookup(UpdateKind::Message)
            .iter()
            .filter_map(HandlerRecord::handler_name)
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn registry_lookup_unknown_kind_is_empty() {
        let registry = Registry::new();
        assert!(registry.lookup(UpdateKind::Poll).is_empty());
    }

    #[test]
    fn registry_clear_resets() {
        let mut registry = Registry::new();
        registry.register(UpdateKind::Message, HandlerRecord::new(noop()));
        registry.clear();
        assert_eq!(registry.count(UpdateKind::Message), 0);
    }
}
