pub mod openai;
pub mod writer;
