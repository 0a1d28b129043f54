//! Retrieval layer: curated Q&A corpus, flat L2 index, nearest-neighbor search.

pub mod corpus;
pub mod index;
pub mod result;


pub use corpus::{load_corpus, CorpusEntry, RawEntry};
pub use index::{CorpusIndex, IndexBuildError};
pub use result::RetrievalResult;
