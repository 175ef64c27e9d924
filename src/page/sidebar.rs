use serde::{Deserialize, Serialize};

use super::{Page, PageMsg, ThemeColor};
use crate::{component::Dispatch, immutable::Immutable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidebarSize {
    #[default]
    Medium,
    Large,
}

type SidebarViewFn<P> =
    fn(&P, &Immutable<<P as Page>::State>, &Dispatch<PageMsg<P>>) -> <P as Page>::View;

/// A sub-view rendered beside the page body from the page's own state.
pub struct Sidebar<P: Page> {
    pub size: SidebarSize,
    pub color: ThemeColor,
    pub view: SidebarViewFn<P>,
    /// Whether the sidebar has nothing to show on small screens.
    pub is_empty_on_mobile: Option<fn(&P::State) -> bool>,
}

impl<P: Page> Sidebar<P> {
    pub fn new(view: SidebarViewFn<P>) -> Self {
        Self {
            size: SidebarSize::Medium,
            color: ThemeColor::Light,
            view,
            is_empty_on_mobile: None,
        }
    }

    pub fn render(
        &self,
        page: &P,
        state: &Immutable<P::State>,
        dispatch: &Dispatch<PageMsg<P>>,
    ) -> SidebarView<P::View> {
        SidebarView {
            size: self.size,
            color: self.color,
            empty_on_mobile: self.is_empty_on_mobile.is_some_and(|empty| empty(state)),
            view: (self.view)(page, state, dispatch),
        }
    }
}

/// A rendered sidebar.
#[derive(Debug, Clone, PartialEq)]
pub struct SidebarView<V> {
    pub size: SidebarSize,
    pub color: ThemeColor,
    pub empty_on_mobile: bool,
    pub view: V,
}
