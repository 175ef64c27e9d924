/// An inline notice, optionally dismissible with a message.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert<M> {
    pub text: String,
    pub dismiss: Option<M>,
}

impl<M> Alert<M> {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            dismiss: None,
        }
    }

    pub fn dismissible(text: impl Into<String>, dismiss: M) -> Self {
        Self {
            text: text.into(),
            dismiss: Some(dismiss),
        }
    }

    pub fn map<N>(self, f: impl Fn(M) -> N) -> Alert<N> {
        Alert {
            text: self.text,
            dismiss: self.dismiss.map(f),
        }
    }
}

/// Page alerts by severity, each list in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct Alerts<M> {
    pub info: Vec<Alert<M>>,
    pub warnings: Vec<Alert<M>>,
    pub errors: Vec<Alert<M>>,
}

impl<M> Alerts<M> {
    pub fn is_empty(&self) -> bool {
        self.info.is_empty() && self.warnings.is_empty() && self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.info.len() + self.warnings.len() + self.errors.len()
    }

    pub fn with_info(mut self, alert: Alert<M>) -> Self {
        self.info.push(alert);
        self
    }

    pub fn with_warning(mut self, alert: Alert<M>) -> Self {
        self.warnings.push(alert);
        self
    }

    pub fn with_error(mut self, alert: Alert<M>) -> Self {
        self.errors.push(alert);
        self
    }

    pub fn map<N>(self, f: impl Fn(M) -> N) -> Alerts<N> {
        let map = |alerts: Vec<Alert<M>>| -> Vec<Alert<N>> { alerts.into_iter().map(|a| a.map(&f)).collect() };
        Alerts {
            info: map(self.info),
            warnings: map(self.warnings),
            errors: map(self.errors),
        }
    }
}

impl<M> Default for Alerts<M> {
    fn default() -> Self {
        Self {
            info: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }
}
