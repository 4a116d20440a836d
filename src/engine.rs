//! The engine façade.
//!
//! One [`Engine`] per server connection. It owns the State Model, the
//! processor registry and the event dispatcher, and processes lines
//! strictly one at a time: each line is decoded, processed and fully
//! dispatched before `handle_line` returns.

use std::sync::Arc;

use slirc_wire::{decode, DecodeError};
use tracing::{debug, warn};

use crate::config::{ConfigError, EngineConfig};
use crate::dispatch::Dispatcher;
use crate::error::{ErrorInfo, SendError};
use crate::event::{Event, TopicOrigin};
use crate::processors::{Context, ProcessorRegistry};
use crate::sender::RawSender;
use crate::state::StateModel;
use crate::telemetry::{extract_msgid, spans};

/// IRC client protocol engine.
pub struct Engine {
    config: EngineConfig,
    state: StateModel,
    processors: ProcessorRegistry,
    dispatcher: Arc<Dispatcher>,
    sender: Arc<dyn RawSender>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("processors", &self.processors)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Build an engine with every built-in processor registered.
    pub fn new<S>(config: EngineConfig, sender: S) -> Result<Self, ConfigError>
    where
        S: RawSender + 'static,
    {
        let casemap = config.initial_casemapping()?;
        Ok(Self {
            config,
            state: StateModel::new(casemap),
            processors: ProcessorRegistry::with_defaults(),
            dispatcher: Arc::new(Dispatcher::new()),
            sender: Arc::new(sender),
        })
    }

    /// Decode, process and dispatch one inbound line.
    ///
    /// Decode failures are reported as a low-severity [`Event::Error`]
    /// (blank lines excepted) and returned; the engine stays usable.
    pub fn handle_line(&mut self, line: &str) -> Result<(), DecodeError> {
        let line = line.trim_end_matches(['\r', '\n']);

        if self.config.engine.emit_raw_lines {
            self.emit(Event::RawLineIn {
                line: line.to_owned(),
            });
        }

        let msg = match decode(line) {
            Ok(msg) => msg,
            Err(err) => {
                let _span = spans::undecodable(line.len()).entered();
                debug!(error = %err, "undecodable line dropped");
                if err != DecodeError::Empty {
                    self.emit(Event::Error(ErrorInfo::decode(&err, line)));
                }
                return Err(err);
            }
        };

        let span = spans::line(&msg.command, msg.prefix.as_deref(), extract_msgid(&msg));
        let _enter = span.enter();

        if let Some(numeric) = msg.numeric() {
            self.emit(Event::Numeric {
                numeric,
                params: msg.params.clone(),
            });
        }

        let mut ctx = Context {
            state: &mut self.state,
            dispatcher: &self.dispatcher,
            sender: &*self.sender,
            settings: &self.config.engine,
            line,
        };
        self.processors.dispatch(&mut ctx, &msg);
        Ok(())
    }

    /// Write a line to the transport.
    pub fn send_raw(&self, line: impl Into<String>) -> Result<(), SendError> {
        let line = line.into();
        if self.config.engine.emit_raw_lines {
            self.emit(Event::RawLineOut { line: line.clone() });
        }
        self.sender.send_raw(line).inspect_err(|e| {
            warn!(error = %e, "outbound line dropped");
        })
    }

    /// Send `NICK` and `USER` from the configured identity.
    pub fn send_registration(&self) -> Result<(), SendError> {
        let identity = &self.config.identity;
        self.send_raw(format!("NICK {}", identity.nickname))?;
        self.send_raw(format!(
            "USER {} 0 * :{}",
            identity.username, identity.realname
        ))
    }

    /// The `/topic` command.
    ///
    /// With text, asks the server to change the topic. Without text,
    /// reports the stored topic as a `TopicChanged` event (or `NoTopic` if
    /// none is set); for a channel we know nothing about, the server is
    /// asked and its reply produces the event.
    pub fn topic_command(&self, channel: &str, text: Option<&str>) -> Result<(), SendError> {
        if let Some(text) = text {
            return self.send_raw(format!("TOPIC {channel} :{text}"));
        }
        let Some(info) = self.state.channel(channel) else {
            return self.send_raw(format!("TOPIC {channel}"));
        };
        let event = match info.topic() {
            Some(topic) => Event::TopicChanged {
                channel: info.name().to_owned(),
                topic: topic.clone(),
                origin: TopicOrigin::Query,
            },
            None => Event::NoTopic {
                channel: info.name().to_owned(),
            },
        };
        self.emit(event);
        Ok(())
    }

    /// Dispatch an event from the host, e.g. a transport error.
    pub fn emit(&self, event: Event) -> bool {
        self.dispatcher.dispatch(&event, &self.state, &*self.sender)
    }

    /// Remove channels nobody is in any more.
    pub fn collect_empty_channels(&mut self) -> Vec<String> {
        self.state.collect_empty_channels()
    }

    /// Read-only State Model.
    pub fn state(&self) -> &StateModel {
        &self.state
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Add host processors.
    pub fn processors_mut(&mut self) -> &mut ProcessorRegistry {
        &mut self.processors
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
