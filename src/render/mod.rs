//! Page assembly and output formats.

mod assembler;
pub mod chrome;
mod json;
mod options;
mod result;

pub use assembler::{PageAssembler, PAGE_STYLESHEET};
pub use chrome::Chrome;
pub use json::{to_json, JsonFormat};
pub use options::{PageSelection, RenderOptions};
pub use result::{PaginationResult, PaginationStats};
