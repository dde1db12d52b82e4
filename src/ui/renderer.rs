//! Top-level rendering coordinator.
//!
//! Rendering is two steps: compute the view model from application state, then
//! hand it to the components. Computing the view model needs `&mut AppState`
//! because rows that enter the viewport are measured on the way.

use crate::app::AppState;
use crate::ui::components;

/// Renders the plugin UI to stdout for a `rows` x `cols` pane.
pub fn render(state: &mut AppState, rows: usize, cols: usize) {
    let viewmodel = state.layout(rows, cols);
    components::render_screen(&viewmodel, &state.theme, rows, cols);
}
