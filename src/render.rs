//! The render boundary.
//!
//! A process calls its [`Renderer`] on every state change, including the
//! initial paint. [`TerminalRenderer`] draws the app's view as a ratatui
//! widget.

use parking_lot::Mutex;
use ratatui::{Terminal, backend::Backend, widgets::Widget};

use crate::{
    app::{App, Msg, Shell, State},
    component::{Component, Dispatch},
    immutable::Immutable,
};

pub trait Renderer<A: App>: Send + Sync + 'static {
    /// Draws `state`. `dispatch` is for event handlers installed by the view;
    /// it must not be called while rendering.
    fn render(&self, shell: &Shell<A>, state: &Immutable<State<A>>, dispatch: &Dispatch<Msg<A>>);
}

/// Renders into a ratatui [`Terminal`].
///
/// # Examples
///
/// ```
/// use portal_runtime::render::TerminalRenderer;
/// use ratatui::backend::TestBackend;
///
/// let renderer = TerminalRenderer::new(TestBackend::new(40, 4)).unwrap();
/// let width = renderer.with_terminal(|terminal| terminal.backend().buffer().area.width);
/// assert_eq!(width, 40);
/// ```
pub struct TerminalRenderer<B: Backend> {
    terminal: Mutex<Terminal<B>>,
}

impl<B: Backend> TerminalRenderer<B> {
    pub fn new(backend: B) -> std::io::Result<Self> {
        Ok(Self {
            terminal: Mutex::new(Terminal::new(backend)?),
        })
    }

    /// Runs `f` with exclusive access to the terminal.
    pub fn with_terminal<T>(&self, f: impl FnOnce(&mut Terminal<B>) -> T) -> T {
        f(&mut self.terminal.lock())
    }
}

impl<A, B> Renderer<A> for TerminalRenderer<B>
where
    A: App,
    A::View: Widget,
    B: Backend + Send + 'static,
{
    fn render(&self, shell: &Shell<A>, state: &Immutable<State<A>>, dispatch: &Dispatch<Msg<A>>) {
        let view = shell.view(state, dispatch);
        let mut terminal = self.terminal.lock();
        if let Err(err) = terminal.draw(|frame| frame.render_widget(view, frame.area())) {
            tracing::error!(error = %err, "failed to draw frame");
        }
    }
}
