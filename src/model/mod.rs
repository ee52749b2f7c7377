//! Data model for pagination.
//!
//! Content flows through these types in one direction: the decomposer
//! produces [`ContentUnit`]s, the flow engine groups them into
//! [`PageContentGroup`]s, and the assembler turns each group into a
//! [`RenderedPage`].

mod metadata;
mod page;
mod unit;

pub use metadata::{PublicationMetadata, TableOfContents, TocEntry, DEFAULT_THEME_COLOR};
pub use page::{PageContentGroup, Placement, RenderedPage};
pub use unit::{ContentUnit, UnitKind};
