pub mod convert;
pub mod media;
pub mod ricos;
pub mod types;

pub use convert::{convert, ConvertError, ConvertOptions};
pub use types::{Block, Decoration, Document, MediaReference, TextRun};
