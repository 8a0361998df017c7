//! SQL parser: tokenization and section splitting

pub mod sections;
pub mod tokenizer;
pub mod vocabulary;
