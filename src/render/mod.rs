// src/render/mod.rs
mod renderer;
mod table;

pub use renderer::{RenderTarget, RenderedRow, ResultsRenderer, RowStyle};
pub use table::TableView;
