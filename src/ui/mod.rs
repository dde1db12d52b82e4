//! Terminal user interface.
//!
//! ```text
//! AppState → layout → UIViewModel → components → ANSI output
//! ```
//!
//! - [`viewmodel`]: display-ready frame description
//! - [`layout`]: screen geometry and card heights shared with the grid
//! - [`renderer`]: rendering entry point
//! - [`components`]: header, search box, grid, notice, detail and footer
//! - [`helpers`]: cell-width aware text utilities and match highlighting
//! - [`theme`]: color schemes and ANSI escapes

pub mod components;
pub mod helpers;
pub mod layout;
pub mod renderer;
pub mod theme;
pub mod viewmodel;

pub use renderer::render;
pub use theme::Theme;
pub use viewmodel::{Content, FooterInfo, HeaderInfo, SearchBarInfo, UIViewModel};
