//! Conversions from wire DTOs to domain articles.

use super::{Article, ArticleDto, NewsResponse, Source};

pub fn article_from_dto(dto: ArticleDto) -> Article {
    Article {
        url: dto.url.unwrap_or_default(),
        source: dto.source.map(|s| Source {
            id: s.id,
            name: s.name,
        }),
        author: dto.author,
        title: dto.title,
        description: dto.description,
        url_to_image: dto.url_to_image,
        published_at: dto.published_at,
        content: dto.content,
    }
}

/// Map a response body to articles, dropping entries without a URL.
///
/// An absent `articles` array yields an empty list.
pub fn articles_from_response(response: NewsResponse) -> Vec<Article> {
    response
        .articles
        .unwrap_or_default()
        .into_iter()
        .map(article_from_dto)
        .filter(Article::has_identifier)
        .collect()
}
