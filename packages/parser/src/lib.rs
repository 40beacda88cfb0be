pub mod ast;
pub mod error;
pub mod explode;
pub mod parser;
pub mod serializer;
pub mod tokenizer;

pub use error::{ParseError, ParseResult};
pub use explode::{explode, ExplodedModule, ExportEntry, ImportEntry};
pub use parser::{parse, Parser};
pub use serializer::{serialize, serialize_with, Quote, Serializer, SerializerOptions};
pub use tokenizer::{tokenize, Token};
