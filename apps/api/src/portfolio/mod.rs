// Portfolio matching: the source table of past work, its embeddings, and the
// persisted similarity index that maps job skills to portfolio links.

pub mod embedding;
pub mod source;
pub mod store;
