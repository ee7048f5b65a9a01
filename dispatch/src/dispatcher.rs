//! The dispatch engine: classifies updates, runs the middleware pipeline, matches
//! handlers in priority order, and isolates failures per update.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use tgbot_core::{
    keys, BotError, BoxFuture, ContentType, CustomFilter, ExceptionHandler, FilterValue, Filters,
    Middleware, MiddlewareAction, Payload, Result, Update, UpdateData, UpdateKind,
};

use crate::matcher;
use crate::registry::{Callback, HandlerRecord, HandlerResponse, Registry};

/// Engine-level switches, fixed at construction.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// When false, no middleware runs at all (handlers still do).
    pub middleware_enabled: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        DispatcherConfig {
            middleware_enabled: true,
        }
    }
}

type UpdateListenerFn = Arc<dyn Fn(Update) -> BoxFuture<'static, ()> + Send + Sync>;

/// Registers message-kind helpers that default the `content_types` filter to
/// text-only when the caller did not set one.
macro_rules! message_kind_helpers {
    ($(($fn_name:ident, $kind:ident)),* $(,)?) => {
        $(
            #[doc = concat!("Registers a handler for `", stringify!($kind), "` updates. ")]
            #[doc = "Without an explicit `content_types` filter, only text messages match."]
            pub fn $fn_name(&mut self, filters: Filters, callback: Callback) -> &mut Self {
                let filters = Self::default_text_content(filters);
                self.register(
                    UpdateKind::$kind,
                    HandlerRecord::new(callback).filters(filters),
                )
            }
        )*
    };
}

macro_rules! query_kind_helpers {
    ($(($fn_name:ident, $kind:ident)),* $(,)?) => {
        $(
            #[doc = concat!("Registers a handler for `", stringify!($kind), "` updates.")]
            pub fn $fn_name(&mut self, filters: Filters, callback: Callback) -> &mut Self {
                self.register(
                    UpdateKind::$kind,
                    HandlerRecord::new(callback).filters(filters),
                )
            }
        )*
    };
}

/// The dispatch engine. Populate registries, filters, middleware, and listeners at
/// setup time, then wrap in an [`Arc`] and feed it update batches.
pub struct Dispatcher {
    registry: Registry,
    middlewares: Vec<Arc<dyn Middleware>>,
    custom_filters: HashMap<String, CustomFilter>,
    listeners: Vec<UpdateListenerFn>,
    exception_handler: Option<Arc<dyn ExceptionHandler>>,
    config: DispatcherConfig,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Dispatcher::new()
    }
}

impl Dispatcher {
    /// A dispatcher with default config and the built-in custom filters seeded.
    pub fn new() -> Self {
        Dispatcher::with_config(DispatcherConfig::default())
    }

    pub fn with_config(config: DispatcherConfig) -> Self {
        let mut custom_filters = HashMap::new();
        for filter in filters::default_filters() {
            custom_filters.insert(filter.key().to_string(), filter);
        }
        Dispatcher {
            registry: Registry::new(),
            middlewares: Vec::new(),
            custom_filters,
            listeners: Vec::new(),
            exception_handler: None,
            config,
        }
    }

    /// Registers a handler record for an update kind. Setup-time only; not
    /// guaranteed atomic against live dispatch.
    pub fn register(&mut self, kind: UpdateKind, record: HandlerRecord) -> &mut Self {
        debug!(
            kind = %kind,
            handler = record.handler_name().unwrap_or("<unnamed>"),
            priority = record.handler_priority(),
            "handler registered"
        );
        self.registry.register(kind, record);
        self
    }

    message_kind_helpers!(
        (on_message, Message),
        (on_edited_message, EditedMessage),
        (on_channel_post, ChannelPost),
        (on_edited_channel_post, EditedChannelPost),
    );

    query_kind_helpers!(
        (on_inline_query, InlineQuery),
        (on_chosen_inline_result, ChosenInlineResult),
        (on_callback_query, CallbackQuery),
        (on_shipping_query, ShippingQuery),
        (on_pre_checkout_query, PreCheckoutQuery),
        (on_poll, Poll),
        (on_poll_answer, PollAnswer),
        (on_my_chat_member, MyChatMember),
        (on_chat_member, ChatMember),
        (on_chat_join_request, ChatJoinRequest),
        (on_message_reaction, MessageReaction),
        (on_message_reaction_count, MessageReactionCount),
    );

    /// Registers a custom filter under its key, replacing any previous filter
    /// with the same key.
    pub fn add_custom_filter(&mut self, filter: CustomFilter) -> &mut Self {
        self.custom_filters
            .insert(filter.key().to_string(), filter);
        self
    }

    /// Appends a middleware; middlewares run in registration order.
    pub fn setup_middleware(&mut self, middleware: Arc<dyn Middleware>) -> &mut Self {
        self.middlewares.push(middleware);
        self
    }

    /// Adds a fire-and-forget observer invoked for every update regardless of
    /// handler match.
    pub fn set_update_listener<F, Fut>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(Update) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.listeners
            .push(Arc::new(move |update| Box::pin(listener(update))));
        self
    }

    /// Installs the process-wide hook receiving errors no middleware claimed.
    pub fn set_exception_handler(&mut self, handler: Arc<dyn ExceptionHandler>) -> &mut Self {
        self.exception_handler = Some(handler);
        self
    }

    pub fn handler_count(&self, kind: UpdateKind) -> usize {
        self.registry.count(kind)
    }

    /// Dispatches one batch: one task per update, spawned in submission order,
    /// gathered together. A failing or panicking update never affects siblings.
    pub async fn process_new_updates(self: &Arc<Self>, updates: Vec<Update>) {
        if updates.is_empty() {
            return;
        }
        info!(count = updates.len(), "received new updates");

        let mut tasks = JoinSet::new();
        for update in updates {
            self.notify_listeners(&update);
            let update_id = update.update_id;
            let Some(payload) = update.into_payload() else {
                debug!(update_id, "update carries no payload, skipping");
                continue;
            };
            let engine = Arc::clone(self);
            tasks.spawn(async move { engine.process_payload(payload).await });
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(join_error) = joined {
                error!(error = %join_error, "update task failed to complete");
            }
        }
    }

    /// Webhook-style entry point: classify one raw JSON body and dispatch it.
    pub async fn process_raw_update(self: &Arc<Self>, raw: Value) -> Result<()> {
        let update = Update::from_json(raw)?;
        self.process_new_updates(vec![update]).await;
        Ok(())
    }

    fn notify_listeners(&self, update: &Update) {
        for listener in &self.listeners {
            tokio::spawn(listener(update.clone()));
        }
    }

    /// Runs the full per-update sequence: middleware pre hooks, handler matching,
    /// middleware post hooks. Owns the whole sequence; nothing else interleaves
    /// within one update.
    async fn process_payload(&self, payload: Payload) {
        let kind = payload.kind();
        let middlewares = self.select_middlewares(kind);
        let data = UpdateData::new();

        let mut skip_handlers = false;
        for middleware in &middlewares {
            match middleware.pre_process(&payload, &data).await {
                Ok(MiddlewareAction::Next) => {}
                Ok(MiddlewareAction::SkipHandlers) => {
                    debug!(kind = %kind, "middleware skipped handler matching");
                    skip_handlers = true;
                }
                Ok(MiddlewareAction::CancelUpdate) => {
                    debug!(kind = %kind, "middleware cancelled update");
                    return;
                }
                Err(pre_error) => {
                    // Pre-hook failures go to the global hook, never to post hooks.
                    self.report_error(&pre_error);
                    return;
                }
            }
        }

        let mut handler_error: Option<BotError> = None;
        if !skip_handlers {
            for record in self.registry.lookup(kind) {
                if !matcher::check_handler(record, &payload, &self.custom_filters).await {
                    continue;
                }
                debug!(
                    kind = %kind,
                    handler = record.handler_name().unwrap_or("<unnamed>"),
                    "invoking handler"
                );
                match record.invoke(payload.clone(), data.clone()).await {
                    Ok(HandlerResponse::Done) => break,
                    Ok(HandlerResponse::Continue) => continue,
                    Err(invoke_error) => {
                        warn!(
                            kind = %kind,
                            handler = record.handler_name().unwrap_or("<unnamed>"),
                            error = %invoke_error,
                            "handler raised"
                        );
                        handler_error = Some(invoke_error);
                        break;
                    }
                }
            }
        }

        for middleware in &middlewares {
            if let Err(post_error) = middleware
                .post_process(&payload, &data, handler_error.as_ref())
                .await
            {
                self.report_error(&post_error);
            }
        }

        // With no middleware active for this kind, nothing else saw the error.
        if middlewares.is_empty() {
            if let Some(unclaimed) = handler_error {
                self.report_error(&unclaimed);
            }
        }
    }

    fn select_middlewares(&self, kind: UpdateKind) -> Vec<Arc<dyn Middleware>> {
        if !self.config.middleware_enabled {
            return Vec::new();
        }
        self.middlewares
            .iter()
            .filter(|m| m.update_kinds().contains(&kind))
            .cloned()
            .collect()
    }

    fn report_error(&self, err: &BotError) {
        match &self.exception_handler {
            Some(handler) => handler.handle(err),
            None => error!(error = %err, "unhandled dispatch error"),
        }
    }

    fn default_text_content(filters: Filters) -> Filters {
        let has_content_types = filters
            .entries()
            .iter()
            .any(|(key, _)| key == keys::CONTENT_TYPES);
        if has_content_types {
            filters
        } else {
            filters.with(
                keys::CONTENT_TYPES,
                FilterValue::ContentTypes(vec![ContentType::Text]),
            )
        }
    }
}
