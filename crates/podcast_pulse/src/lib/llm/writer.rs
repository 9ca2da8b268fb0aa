use std::{fmt::Display, future::Future};

use crate::types::SourcePost;

/// Turns a source post into a spoken-style monologue
pub trait ScriptWriter {
    const WRITER_MODEL: &str;

    type Error: Display + Send;

    fn write_script(
        &self,
        post: &SourcePost,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}
