use super::ThemeColor;

#[derive(Debug, Clone, PartialEq)]
pub struct ModalButton<M> {
    pub text: String,
    pub color: ThemeColor,
    pub msg: M,
    /// Rendered as a button rather than a link.
    pub button: bool,
    pub icon: Option<String>,
}

impl<M> ModalButton<M> {
    pub fn new(text: impl Into<String>, color: ThemeColor, msg: M) -> Self {
        Self {
            text: text.into(),
            color,
            msg,
            button: true,
            icon: None,
        }
    }

    pub fn map<N>(self, f: impl Fn(M) -> N) -> ModalButton<N> {
        ModalButton {
            text: self.text,
            color: self.color,
            msg: f(self.msg),
            button: self.button,
            icon: self.icon,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModalContent<M> {
    pub title: String,
    pub body: String,
    pub on_close: M,
    /// Buttons in display order.
    pub actions: Vec<ModalButton<M>>,
}

/// The modal a page wants on screen. Pages show none by default.
#[derive(Debug, Clone, PartialEq)]
pub enum Modal<M> {
    Hidden,
    Visible(ModalContent<M>),
}

impl<M> Modal<M> {
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Visible(_))
    }

    pub fn content(&self) -> Option<&ModalContent<M>> {
        match self {
            Self::Hidden => None,
            Self::Visible(content) => Some(content),
        }
    }

    pub fn map<N>(self, f: impl Fn(M) -> N) -> Modal<N> {
        match self {
            Self::Hidden => Modal::Hidden,
            Self::Visible(content) => Modal::Visible(ModalContent {
                title: content.title,
                body: content.body,
                on_close: f(content.on_close),
                actions: content.actions.into_iter().map(|b| b.map(&f)).collect(),
            }),
        }
    }
}

impl<M> Default for Modal<M> {
    fn default() -> Self {
        Self::Hidden
    }
}
