//! sqlsplit - lossless SQL tokenizer and query section splitter

pub mod config;
pub mod error;
pub mod parser;
pub mod trace;

// Re-export main public types
pub use error::{Error, ErrorCode, Result};

pub use config::{ParseConfig, DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT};
pub use parser::sections::{parse_sections, SectionMap, SectionParser, COUNT_PROJECTION};
pub use parser::tokenizer::{collapse_whitespace, tokenize, untokenize, Token, TokenStream};
pub use parser::vocabulary::{classify, TokenClass};
pub use trace::{TraceCallback, TraceFlags, TraceInfo, Tracer};
