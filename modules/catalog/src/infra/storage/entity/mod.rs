pub mod book_categories;
pub mod books;
pub mod categories;
