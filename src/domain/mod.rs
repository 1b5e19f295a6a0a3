pub mod benchmark;
pub mod company;
pub mod comparison;
pub mod insights;
pub mod market;
pub mod snippet_classifier;
pub mod value_extractor;
