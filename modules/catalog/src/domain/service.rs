use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{
    Book, BookSearchParams, Category, NewBook, NewCategory, Page, PageRequest,
};
use crate::domain::error::CatalogError;
use crate::infra::storage::{mapper, repo, search::SpecificationBuilder};

/// Domain service with business rules for catalog management.
pub struct Service {
    db: DatabaseConnection,
    spec_builder: SpecificationBuilder,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_page_size: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { max_page_size: 100 }
    }
}

impl Service {
    pub fn new(db: DatabaseConnection, config: ServiceConfig) -> Self {
        Self {
            db,
            spec_builder: SpecificationBuilder::new(),
            config,
        }
    }

    fn clamp(&self, page: PageRequest) -> PageRequest {
        PageRequest {
            page: page.page,
            size: page.size.clamp(1, self.config.max_page_size),
        }
    }

    // --- books ---

    #[instrument(name = "catalog.service.create_book", skip(self), fields(isbn = %new_book.isbn))]
    pub async fn create_book(&self, new_book: NewBook) -> Result<Book, CatalogError> {
        info!("Creating new book");

        if repo::isbn_taken(&self.db, &new_book.isbn, None)
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?
        {
            return Err(CatalogError::isbn_already_exists(new_book.isbn));
        }

        let book = Book {
            id: Uuid::new_v4(),
            title: new_book.title,
            author: new_book.author,
            isbn: new_book.isbn,
            price: new_book.price,
            description: new_book.description,
            cover_image: new_book.cover_image,
            category_ids: new_book.category_ids,
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?;

        for category_id in &book.category_ids {
            repo::find_category(&txn, *category_id)
                .await
                .map_err(|e| CatalogError::database(e.to_string()))?
                .ok_or_else(|| CatalogError::category_not_found(*category_id))?;
        }

        repo::insert_book(&txn, &book)
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?;
        repo::replace_book_categories(&txn, book.id, &book.category_ids)
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?;

        info!("Successfully created book with id={}", book.id);
        Ok(book)
    }

    #[instrument(name = "catalog.service.get_book", skip(self), fields(book_id = %id))]
    pub async fn get_book(&self, id: Uuid) -> Result<Book, CatalogError> {
        debug!("Getting book by id");

        let model = repo::find_book(&self.db, id)
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?
            .ok_or_else(|| CatalogError::book_not_found(id))?;
        let category_ids = repo::category_ids_of_book(&self.db, id)
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?;
        Ok(mapper::to_book(model, category_ids))
    }

    #[instrument(name = "catalog.service.list_books", skip(self))]
    pub async fn list_books(&self, page: PageRequest) -> Result<Page<Book>, CatalogError> {
        let page = self.clamp(page);
        debug!("Listing books page {} size {}", page.page, page.size);

        let rows = repo::list_books(&self.db, page.size, page.offset())
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?;
        let total = repo::count_books(&self.db)
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?;

        let items = self.attach_categories(rows).await?;
        Ok(Page {
            items,
            total,
            page: page.page,
            size: page.size,
        })
    }

    /// Multi-field catalog search: compose one conjunctive condition from
    /// the sparse parameters and page through the matches. No parameters at
    /// all is the unfiltered listing.
    #[instrument(name = "catalog.service.search_books", skip(self, params))]
    pub async fn search_books(
        &self,
        params: BookSearchParams,
        page: PageRequest,
    ) -> Result<Page<Book>, CatalogError> {
        let page = self.clamp(page);
        debug!("Searching books page {} size {}", page.page, page.size);

        let condition = self.spec_builder.build(&params)?;

        let rows = repo::search_books(&self.db, condition.clone(), page.size, page.offset())
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?;
        let total = repo::count_search_books(&self.db, condition)
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?;

        let items = self.attach_categories(rows).await?;
        Ok(Page {
            items,
            total,
            page: page.page,
            size: page.size,
        })
    }

    #[instrument(name = "catalog.service.update_book", skip(self, data), fields(book_id = %id))]
    pub async fn update_book(&self, id: Uuid, data: NewBook) -> Result<Book, CatalogError> {
        info!("Updating book");

        repo::find_book(&self.db, id)
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?
            .ok_or_else(|| CatalogError::book_not_found(id))?;

        if repo::isbn_taken(&self.db, &data.isbn, Some(id))
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?
        {
            return Err(CatalogError::isbn_already_exists(data.isbn));
        }

        // Full replace keeping the identity, as the update endpoint promises.
        let book = Book {
            id,
            title: data.title,
            author: data.author,
            isbn: data.isbn,
            price: data.price,
            description: data.description,
            cover_image: data.cover_image,
            category_ids: data.category_ids,
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?;

        for category_id in &book.category_ids {
            repo::find_category(&txn, *category_id)
                .await
                .map_err(|e| CatalogError::database(e.to_string()))?
                .ok_or_else(|| CatalogError::category_not_found(*category_id))?;
        }

        repo::update_book(&txn, &book)
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?;
        repo::replace_book_categories(&txn, book.id, &book.category_ids)
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?;

        info!("Successfully updated book");
        Ok(book)
    }

    #[instrument(name = "catalog.service.delete_book", skip(self), fields(book_id = %id))]
    pub async fn delete_book(&self, id: Uuid) -> Result<(), CatalogError> {
        info!("Deleting book");

        let deleted = repo::soft_delete_book(&self.db, id)
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?;
        if !deleted {
            return Err(CatalogError::book_not_found(id));
        }
        Ok(())
    }

    #[instrument(name = "catalog.service.delete_all_books", skip(self))]
    pub async fn delete_all_books(&self) -> Result<u64, CatalogError> {
        info!("Deleting all books");

        repo::soft_delete_all_books(&self.db)
            .await
            .map_err(|e| CatalogError::database(e.to_string()))
    }

    async fn attach_categories(
        &self,
        rows: Vec<crate::infra::storage::entity::books::Model>,
    ) -> Result<Vec<Book>, CatalogError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut grouped = repo::category_ids_of_books(&self.db, &ids)
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let category_ids = grouped.remove(&row.id).unwrap_or_default();
                mapper::to_book(row, category_ids)
            })
            .collect())
    }

    // --- categories ---

    #[instrument(name = "catalog.service.create_category", skip(self), fields(name = %new_category.name))]
    pub async fn create_category(
        &self,
        new_category: NewCategory,
    ) -> Result<Category, CatalogError> {
        info!("Creating new category");

        let category = Category {
            id: Uuid::new_v4(),
            name: new_category.name,
            description: new_category.description,
        };
        repo::insert_category(&self.db, &category)
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?;

        info!("Successfully created category with id={}", category.id);
        Ok(category)
    }

    #[instrument(name = "catalog.service.get_category", skip(self), fields(category_id = %id))]
    pub async fn get_category(&self, id: Uuid) -> Result<Category, CatalogError> {
        let model = repo::find_category(&self.db, id)
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?
            .ok_or_else(|| CatalogError::category_not_found(id))?;
        Ok(model.into())
    }

    #[instrument(name = "catalog.service.list_categories", skip(self))]
    pub async fn list_categories(&self, page: PageRequest) -> Result<Page<Category>, CatalogError> {
        let page = self.clamp(page);

        let rows = repo::list_categories(&self.db, page.size, page.offset())
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?;
        let total = repo::count_categories(&self.db)
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?;

        Ok(Page {
            items: rows.into_iter().map(Into::into).collect(),
            total,
            page: page.page,
            size: page.size,
        })
    }

    #[instrument(name = "catalog.service.update_category", skip(self, data), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        id: Uuid,
        data: NewCategory,
    ) -> Result<Category, CatalogError> {
        info!("Updating category");

        repo::find_category(&self.db, id)
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?
            .ok_or_else(|| CatalogError::category_not_found(id))?;

        let category = Category {
            id,
            name: data.name,
            description: data.description,
        };
        repo::update_category(&self.db, &category)
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?;
        Ok(category)
    }

    #[instrument(name = "catalog.service.delete_category", skip(self), fields(category_id = %id))]
    pub async fn delete_category(&self, id: Uuid) -> Result<(), CatalogError> {
        info!("Deleting category");

        let deleted = repo::soft_delete_category(&self.db, id)
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?;
        if !deleted {
            return Err(CatalogError::category_not_found(id));
        }
        Ok(())
    }

    /// Books linked to a category. An unknown category yields an empty list
    /// rather than an error; only the link table decides membership.
    #[instrument(name = "catalog.service.books_by_category", skip(self), fields(category_id = %id))]
    pub async fn books_by_category(&self, id: Uuid) -> Result<Vec<Book>, CatalogError> {
        let rows = repo::books_by_category(&self.db, id)
            .await
            .map_err(|e| CatalogError::database(e.to_string()))?;
        self.attach_categories(rows).await
    }
}
