//! Prelude module for convenient imports.
//!
//! ```
//! use portal_runtime::prelude::*;
//! ```

pub use crate::app::{App, Mount, Registry, Shell};
pub use crate::command::Command;
pub use crate::component::{Component, Dispatch, Transition};
pub use crate::config::Config;
pub use crate::host::{Host, MemoryHost};
pub use crate::immutable::{Immutable, Lens};
pub use crate::page::{Page, PageMsg};
pub use crate::process::Process;
pub use crate::router::{Route, Router};
