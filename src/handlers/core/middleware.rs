//! Handler middleware.
//!
//! A [`Middleware`] takes the next [`Handler`] in the chain and returns a new
//! handler wrapping it. [`chain`] folds a list of middleware around a terminal
//! handler once; the first middleware in the list ends up outermost, so it
//! sees every call first and every result last.

use super::context::Context;
use crate::error::{CommandError, CommandResult};
use crate::telemetry::{CommandTimer, spans};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{Instrument, debug, error, warn};

/// Future returned by a handler.
pub type HandlerFuture = BoxFuture<'static, CommandResult>;

/// A command invocation: consumes the single-use context.
pub type Handler = Arc<dyn Fn(Context) -> HandlerFuture + Send + Sync>;

/// Wraps a handler with cross-cutting behavior.
pub type Middleware = Arc<dyn Fn(Handler) -> Handler + Send + Sync>;

/// Build a [`Handler`] from an async closure.
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CommandResult> + Send + 'static,
{
    Arc::new(move |ctx: Context| Box::pin(f(ctx)) as HandlerFuture)
}

/// Build a [`Middleware`] from a wrapping closure.
pub fn middleware<F>(f: F) -> Middleware
where
    F: Fn(Handler) -> Handler + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Compose `middlewares` around `terminal`.
///
/// The result behaves as `mw[0](mw[1](...mw[n-1](terminal)))`. `None` entries
/// are skipped and an empty list returns `terminal` itself.
pub fn chain(middlewares: &[Option<Middleware>], terminal: Handler) -> Handler {
    middlewares
        .iter()
        .rev()
        .fold(terminal, |next, mw| match mw {
            Some(mw) => mw(next),
            None => next,
        })
}

/// Terminal handler: runs the context's own command.
pub fn execute() -> Handler {
    handler(|ctx: Context| async move {
        let command = Arc::clone(ctx.command());
        command.execute(&ctx).await
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Convert a panic anywhere below this middleware into `CommandError::Panicked`.
///
/// Install it first so it wraps every other middleware.
pub fn recover() -> Middleware {
    middleware(|next| {
        handler(move |ctx: Context| {
            let next = Arc::clone(&next);
            let name = ctx.command_name().to_string();
            // next() runs inside the guarded future so a panic while building
            // the inner future is caught as well.
            let guarded = AssertUnwindSafe(async move { next(ctx).await }).catch_unwind();
            async move {
                match guarded.await {
                    Ok(result) => result,
                    Err(payload) => {
                        let msg = panic_message(payload.as_ref());
                        error!(command = %name, panic = %msg, "Command panicked");
                        Err(CommandError::Panicked(msg))
                    }
                }
            }
        })
    })
}

/// Log every command with its outcome and latency, inside a command span.
pub fn logging() -> Middleware {
    middleware(|next| {
        handler(move |ctx: Context| {
            let next = Arc::clone(&next);
            let name = ctx.command_name().to_string();
            let caller = ctx
                .caller()
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "*".to_string());
            let span = spans::command(&name, &caller);
            async move {
                let _timer = CommandTimer::new(&name);
                debug!("Command started");
                let result = next(ctx).await;
                match &result {
                    Ok(()) => debug!("Command finished"),
                    Err(e) => warn!(error = %e, code = e.error_code(), "Command failed"),
                }
                result
            }
            .instrument(span)
        })
    })
}

/// Reject callers lacking the command's permission mask without running it.
pub fn permissions() -> Middleware {
    middleware(|next| {
        handler(move |ctx: Context| {
            let next = Arc::clone(&next);
            async move {
                if let Some(mask) = ctx.command().permissions() {
                    let allowed = ctx.caller().is_some_and(|c| c.has_permissions(mask));
                    if !allowed {
                        debug!(command = %ctx.command_name(), mask, "Caller lacks permissions");
                        return Err(CommandError::Denied);
                    }
                }
                next(ctx).await
            }
        })
    })
}
