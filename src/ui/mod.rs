//! UI module - handles all TUI rendering
//!
//! Structure:
//! - `draw.rs` - Main draw functions
//! - `theme.rs` - Color themes and presets
//! - `layout.rs` - Button layout and hit-testing
//! - `button.rs` - Button widget

pub mod button;
mod draw;
pub mod layout;
pub mod theme;

// Re-export main draw function
pub use draw::draw;

pub use layout::HomeLayout;
