use uuid::Uuid;

use crate::contract::model::{Book, Category};
use crate::infra::storage::entity::{books, categories};

pub fn to_book(model: books::Model, category_ids: Vec<Uuid>) -> Book {
    Book {
        id: model.id,
        title: model.title,
        author: model.author,
        isbn: model.isbn,
        price: model.price,
        description: model.description,
        cover_image: model.cover_image,
        category_ids,
    }
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
        }
    }
}
