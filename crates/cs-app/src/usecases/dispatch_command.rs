use std::sync::Arc;

use cs_core::history::StoreError;
use cs_core::ports::ClipboardStorePort;
use cs_core::{Clip, Command, Response};
use tracing::{debug, info_span};

/// Maps one decoded command onto the shared store and builds the reply.
///
/// 将协议命令映射到剪贴板历史存储
pub struct CommandDispatcher {
    store: Arc<dyn ClipboardStorePort>,
}

impl CommandDispatcher {
    pub fn new(store: Arc<dyn ClipboardStorePort>) -> Self {
        Self { store }
    }

    /// Run `command` against the store.
    ///
    /// Synchronous on purpose: the store is entered and left within this call,
    /// with no I/O in between.
    pub fn dispatch(&self, command: Command) -> Response {
        let span = info_span!("dispatch", cmd = command.name());
        let _enter = span.enter();

        let result = match command {
            Command::Pull => self.store.peek(),
            Command::Pop => self.store.pop(),
            Command::Push(clips) => {
                debug!(count = clips.len(), "pushing clips");
                self.store.push(clips)
            }
        };

        // The store adapter logs the counters it saw under its own lock.
        debug!(ok = result.is_ok(), "command applied");
        into_response(result)
    }
}

fn into_response(result: Result<Clip, StoreError>) -> Response {
    match result {
        Ok(clip) => Response::Clip(clip),
        Err(StoreError::Empty) => Response::empty_store(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_core::history::StoreStats;

    mockall::mock! {
        Store {}

        impl ClipboardStorePort for Store {
            fn push(&self, clips: Vec<Clip>) -> Result<Clip, StoreError>;
            fn peek(&self) -> Result<Clip, StoreError>;
            fn pop(&self) -> Result<Clip, StoreError>;
            fn stats(&self) -> StoreStats;
        }
    }

    #[test]
    fn pull_peeks_without_popping() {
        let mut store = MockStore::new();
        store
            .expect_peek()
            .times(1)
            .returning(|| Ok(Clip::new(1, "a")));
        store.expect_pop().never();
        store.expect_stats().never();

        let dispatcher = CommandDispatcher::new(Arc::new(store));
        assert_eq!(
            dispatcher.dispatch(Command::Pull),
            Response::Clip(Clip::new(1, "a"))
        );
    }

    #[test]
    fn pop_maps_to_store_pop() {
        let mut store = MockStore::new();
        store.expect_pop().times(1).returning(|| Err(StoreError::Empty));
        store.expect_stats().never();

        let dispatcher = CommandDispatcher::new(Arc::new(store));
        assert_eq!(dispatcher.dispatch(Command::Pop), Response::empty_store());
    }

    #[test]
    fn push_hands_the_whole_batch_to_the_store_once() {
        let mut store = MockStore::new();
        store
            .expect_push()
            .withf(|clips| clips.len() == 2)
            .times(1)
            .returning(|_| Ok(Clip::new(5, "five")));
        store.expect_stats().never();

        let dispatcher = CommandDispatcher::new(Arc::new(store));
        let response = dispatcher.dispatch(Command::Push(vec![
            Clip::new(5, "five"),
            Clip::new(3, "three"),
        ]));
        assert_eq!(response, Response::Clip(Clip::new(5, "five")));
    }
}
