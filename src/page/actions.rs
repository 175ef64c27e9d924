use super::ThemeColor;

#[derive(Debug, Clone, PartialEq)]
pub enum LinkTarget<M> {
    Msg(M),
    Url(String),
}

/// A contextual link or button in the page header.
#[derive(Debug, Clone, PartialEq)]
pub struct Link<M> {
    pub text: String,
    pub target: LinkTarget<M>,
    pub color: Option<ThemeColor>,
    pub button: bool,
    pub icon: Option<String>,
}

impl<M> Link<M> {
    pub fn msg(text: impl Into<String>, msg: M) -> Self {
        Self::new(text, LinkTarget::Msg(msg))
    }

    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(text, LinkTarget::Url(url.into()))
    }

    fn new(text: impl Into<String>, target: LinkTarget<M>) -> Self {
        Self {
            text: text.into(),
            target,
            color: None,
            button: false,
            icon: None,
        }
    }

    pub fn button(mut self, color: ThemeColor) -> Self {
        self.button = true;
        self.color = Some(color);
        self
    }

    pub fn map<N>(self, f: impl Fn(M) -> N) -> Link<N> {
        Link {
            text: self.text,
            target: match self.target {
                LinkTarget::Msg(msg) => LinkTarget::Msg(f(msg)),
                LinkTarget::Url(url) => LinkTarget::Url(url),
            },
            color: self.color,
            button: self.button,
            icon: self.icon,
        }
    }
}

/// Header actions for the active page.
#[derive(Debug, Clone, PartialEq)]
pub enum Actions<M> {
    None,
    Links(Vec<Link<M>>),
    Dropdown { text: String, links: Vec<Link<M>> },
}

impl<M> Actions<M> {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn map<N>(self, f: impl Fn(M) -> N) -> Actions<N> {
        let map = |links: Vec<Link<M>>| -> Vec<Link<N>> { links.into_iter().map(|l| l.map(&f)).collect() };
        match self {
            Self::None => Actions::None,
            Self::Links(links) => Actions::Links(map(links)),
            Self::Dropdown { text, links } => Actions::Dropdown {
                text,
                links: map(links),
            },
        }
    }
}

impl<M> Default for Actions<M> {
    fn default() -> Self {
        Self::None
    }
}
