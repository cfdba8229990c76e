//! TUI pane rendering modules
//!
//! Every pane renders one part of the current [`Step`](crate::snapshot::Step).
//!
//! # Pane Modules
//!
//! - [`source`]: the snippet with the current line highlighted
//! - [`variables`]: global variables
//! - [`stack`]: call frames with their locals
//! - [`heap`]: heap objects with their references
//! - [`terminal`]: program output so far
//! - [`status`]: step counter, step description and keybindings
//!
//! # Architecture
//!
//! Each pane module exports a `render_*` function plus, where the pane
//! scrolls on its own, a scroll state owned by the app.

mod utils;

pub mod heap;
pub mod source;
pub mod stack;
pub mod status;
pub mod terminal;
pub mod variables;

pub use heap::{render_heap_pane, HeapScrollState};
pub use source::{render_source_pane, SourceRenderData, SourceScrollState};
pub use stack::{render_stack_pane, StackScrollState};
pub use status::{render_status_bar, StatusRenderData};
pub use terminal::render_terminal_pane;
pub use variables::render_variables_pane;
