pub mod columns;
pub mod embedding;
pub mod matching;
pub mod normalizer;
pub mod ranking;
pub mod similarity;
