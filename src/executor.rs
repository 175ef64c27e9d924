//! Runs commands and feeds their messages back into a [`Dispatch`].

use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::{
    command::{Command, Context},
    component::Dispatch,
};

/// Starts commands as independent tokio tasks.
///
/// Commands handed over together run concurrently: the executor never waits
/// for one before starting the next. Each resolution is dispatched on its own,
/// in completion order.
pub struct Executor<Msg: Send + 'static> {
    cx: Context,
    dispatch: Dispatch<Msg>,
}

impl<Msg: Send + 'static> Executor<Msg> {
    pub fn new(cx: Context, dispatch: Dispatch<Msg>) -> Self {
        Self { cx, dispatch }
    }

    /// Spawns every non-empty command and returns how many were started.
    ///
    /// Must be called from within a tokio runtime.
    pub fn execute(&self, cmds: Vec<Command<Msg>>) -> usize {
        let mut started = 0;
        for cmd in cmds.into_iter().filter(|cmd| !cmd.is_none()) {
            let cx = self.cx.clone();
            let dispatch = self.dispatch.clone();
            tokio::spawn(async move {
                match AssertUnwindSafe(cmd.run(cx)).catch_unwind().await {
                    Ok(Some(msg)) => dispatch.send(msg),
                    Ok(None) => {}
                    Err(_) => tracing::error!("command panicked before producing a message"),
                }
            });
            started += 1;
        }
        started
    }
}
