// Pipeline processing: normalization, classification tables, and enrichment

pub mod classify;
pub mod enrich;
pub mod normalize;
