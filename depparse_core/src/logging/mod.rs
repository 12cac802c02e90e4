//! Global structured logging for the parser
//!
//! A process-wide [`LoggingService`] is installed once with
//! [`init_global_logging`]. Until then every logging call is a no-op, so the
//! library can be used without any logging set up. Worker threads stamp their
//! events with a per-thread sentence context.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

#[cfg(feature = "logging")]
pub use service::LogCrateLogger;

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

/// Which worker and sentence the current thread is busy with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceContext {
    pub worker_id: usize,
    pub sentence_id: usize,
}

thread_local! {
    static SENTENCE_CONTEXT: RefCell<Option<SentenceContext>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Install the configured logging service
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let service = Arc::new(service::create_configured_service());
    GLOBAL_LOGGER
        .set(service.clone())
        .map_err(|_| "Global logger already initialized".to_string())?;

    service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));
    Ok(())
}

/// Install a caller-provided service (tests, embedding applications)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

// ============================================================================
// SENTENCE CONTEXT
// ============================================================================

pub fn set_sentence_context(worker_id: usize, sentence_id: usize) {
    SENTENCE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(SentenceContext {
            worker_id,
            sentence_id,
        });
    });
}

pub fn clear_sentence_context() {
    SENTENCE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

pub fn get_current_sentence_context() -> Option<SentenceContext> {
    SENTENCE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Run `f` with the sentence context set on this thread
pub fn with_sentence_context<F, R>(worker_id: usize, sentence_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_sentence_context(worker_id, sentence_id);
    let result = f();
    clear_sentence_context();
    result
}

// ============================================================================
// MACRO SUPPORT
// ============================================================================

/// Attach context pairs and the sentence context, then hand the event to the global service
pub fn log_with_context(mut event: LogEvent, context: Vec<(&str, String)>) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };
    if !logger.should_log(event.level) {
        return;
    }

    let max_len = config::get_max_message_length();
    if event.message.len() > max_len {
        let mut cut = max_len;
        while !event.message.is_char_boundary(cut) {
            cut -= 1;
        }
        event.message.truncate(cut);
    }

    for (key, value) in context {
        event = event.with_context(key, &value);
    }
    if let Some(ctx) = get_current_sentence_context() {
        event = event
            .with_context("worker", &ctx.worker_id.to_string())
            .with_context("sentence", &ctx.sentence_id.to_string());
    }

    logger.log_event(event);
}

/// Error logging that falls back to stderr when no service is installed
pub fn safe_log_error(code: Code, message: &str) {
    match try_get_global_logger() {
        Some(logger) => logger.log_error(code, message),
        None => eprintln!("[ERROR] FALLBACK: [{}] {}", code.as_str(), message),
    }
}
