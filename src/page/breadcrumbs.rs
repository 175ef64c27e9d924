#[derive(Debug, Clone, PartialEq)]
pub struct Breadcrumb<M> {
    pub text: String,
    pub on_click: Option<M>,
}

impl<M> Breadcrumb<M> {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            on_click: None,
        }
    }

    pub fn link(text: impl Into<String>, on_click: M) -> Self {
        Self {
            text: text.into(),
            on_click: Some(on_click),
        }
    }

    pub fn map<N>(self, f: impl Fn(M) -> N) -> Breadcrumb<N> {
        Breadcrumb {
            text: self.text,
            on_click: self.on_click.map(f),
        }
    }
}

/// Breadcrumbs, outermost first.
pub type Breadcrumbs<M> = Vec<Breadcrumb<M>>;
