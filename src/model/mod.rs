//! Domain records and their wire representation.
//!
//! `Article` is what the cache stores and the view states carry. The DTOs
//! mirror the remote JSON payload, where every field may be absent;
//! [`mapper`] converts between the two and drops records that have no
//! usable identifier.

mod article;
mod dto;
pub mod mapper;

pub use article::{Article, Source};
pub use dto::{ArticleDto, NewsResponse, SourceDto};
