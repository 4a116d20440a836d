//! Processor registry and dispatch.
//!
//! Maps command tokens to processors. A token may have several processors;
//! they run in registration order and a failure in one does not stop the
//! rest. Unknown tokens are ignored.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use slirc_wire::RawMessage;
use tracing::{trace, warn};

use super::{Context, Processor};
use crate::error::{panic_message, ErrorInfo, ProcessorError};
use crate::event::Event;
use crate::processors::{
    channel::{InviteProcessor, JoinProcessor, KickProcessor, NamesProcessor, PartProcessor},
    connection::{
        ErrorProcessor, IsupportProcessor, NickProcessor, PingProcessor, QuitProcessor,
        WelcomeProcessor,
    },
    messaging::{MessageProcessor, WallopsProcessor},
    mode::ModeProcessor,
    topic::TopicProcessor,
    user_status::AwayProcessor,
};

/// Registry of processors keyed by upper-case command token.
#[derive(Default)]
pub struct ProcessorRegistry {
    processors: HashMap<String, Vec<Arc<dyn Processor>>>,
}

impl std::fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tokens: Vec<&str> = self.processors.keys().map(String::as_str).collect();
        tokens.sort_unstable();
        f.debug_struct("ProcessorRegistry").field("tokens", &tokens).finish()
    }
}

impl ProcessorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in processor.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        // Connection
        registry.register_processor(WelcomeProcessor);
        registry.register_processor(IsupportProcessor);
        registry.register_processor(PingProcessor);
        registry.register_processor(ErrorProcessor);
        registry.register_processor(NickProcessor);
        registry.register_processor(QuitProcessor);

        // Channels
        registry.register_processor(JoinProcessor);
        registry.register_processor(PartProcessor);
        registry.register_processor(KickProcessor);
        registry.register_processor(InviteProcessor);
        registry.register_processor(NamesProcessor);
        registry.register_processor(TopicProcessor);
        registry.register_processor(ModeProcessor);

        // Messaging
        registry.register_processor(MessageProcessor);
        registry.register_processor(WallopsProcessor);
        registry.register_processor(AwayProcessor);

        registry
    }

    /// Bind `processor` to one command token.
    pub fn register(&mut self, token: &str, processor: Arc<dyn Processor>) {
        self.processors
            .entry(token.to_ascii_uppercase())
            .or_default()
            .push(processor);
    }

    /// Bind a processor to every token it declares.
    pub fn register_processor<P: Processor + 'static>(&mut self, processor: P) {
        let processor: Arc<dyn Processor> = Arc::new(processor);
        for token in processor.commands() {
            self.register(token, processor.clone());
        }
    }

    /// Whether any processor handles `token`.
    pub fn handles(&self, token: &str) -> bool {
        self.processors.contains_key(&token.to_ascii_uppercase())
    }

    /// Number of processors bound to `token`.
    pub fn count(&self, token: &str) -> usize {
        self.processors
            .get(&token.to_ascii_uppercase())
            .map_or(0, Vec::len)
    }

    /// Run every processor bound to the message's command.
    ///
    /// Returns how many processors ran. Failures are reported as
    /// [`Event::Error`] and never propagate.
    pub fn dispatch(&self, ctx: &mut Context<'_>, msg: &RawMessage) -> usize {
        let token = msg.command.to_ascii_uppercase();
        let Some(processors) = self.processors.get(&token) else {
            trace!(command = %token, "no processor");
            return 0;
        };

        for processor in processors {
            let outcome = catch_unwind(AssertUnwindSafe(|| processor.process(ctx, msg)));
            let err = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err,
                Err(payload) => ProcessorError::Panicked(panic_message(&*payload)),
            };
            warn!(
                processor = processor.name(),
                command = %token,
                error = %err,
                "processor failed"
            );
            let info = ErrorInfo::processor(processor.name(), &err, ctx.line.to_owned());
            ctx.emit(Event::Error(info));
        }

        processors.len()
    }
}
