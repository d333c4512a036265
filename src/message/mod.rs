//! Message assembly and the HTML alternative collaborator.

pub mod assembler;
pub mod html;

pub use assembler::{EmailAssembler, RenderedMessage};
pub use html::{BasicHtmlRenderer, HtmlRenderer};
