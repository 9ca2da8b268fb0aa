pub mod client;

use std::{fmt::Display, future::Future};

use crate::types::SourcePost;

/// Query-by-author/keyword search returning the most recent match, if any
pub trait PostSearcher {
    type Error: Display + Send;

    fn latest_post(&self) -> impl Future<Output = Result<Option<SourcePost>, Self::Error>> + Send;
}
