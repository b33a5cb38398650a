use async_graphql::{InputObject, SimpleObject};
use bookshelf_db::BookDocument;
use serde::{Deserialize, Serialize};

/// A book saved to a user's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
#[graphql(name = "Book")]
pub struct SavedBook {
    /// Identifier from the external book search API
    pub book_id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub description: Option<String>,
    /// Cover image link
    pub image: Option<String>,
    /// Info page link
    pub link: Option<String>,
}

/// Book fields sent by the client when saving a search result.
#[derive(Debug, Clone, Serialize, Deserialize, InputObject)]
pub struct BookInput {
    pub book_id: String,
    pub title: String,
    #[graphql(default)]
    pub authors: Vec<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
}

impl From<BookInput> for SavedBook {
    fn from(input: BookInput) -> Self {
        Self {
            book_id: input.book_id.trim().to_string(),
            title: input.title.trim().to_string(),
            authors: input.authors,
            description: input.description,
            image: input.image,
            link: input.link,
        }
    }
}

impl From<BookDocument> for SavedBook {
    fn from(document: BookDocument) -> Self {
        Self {
            book_id: document.book_id,
            title: document.title,
            authors: document.authors,
            description: document.description,
            image: document.image,
            link: document.link,
        }
    }
}

impl From<SavedBook> for BookDocument {
    fn from(book: SavedBook) -> Self {
        Self {
            book_id: book.book_id,
            title: book.title,
            authors: book.authors,
            description: book.description,
            image: book.image,
            link: book.link,
        }
    }
}
