//! volcanyx-annotate: External gene metadata and literature references.
//!
//! A two-stage lookup (symbol → gene id → GeneRIF references) behind the
//! [`sources::AnnotationSource`] trait, wrapped by [`AnnotationFetcher`] which
//! bounds it with a timeout and never returns an error to the caller.

pub mod fetcher;
pub mod mock;
pub mod sources;

pub use fetcher::AnnotationFetcher;
pub use mock::{MockAnnotationSource, MockFailure};
pub use sources::mygene::MyGeneClient;
pub use sources::AnnotationSource;
