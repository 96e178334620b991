use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Books::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Books::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Books::Title).string().not_null())
                    .col(ColumnDef::new(Books::Author).string().not_null())
                    .col(ColumnDef::new(Books::Isbn).string().not_null())
                    .col(ColumnDef::new(Books::Price).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(Books::Description).string())
                    .col(ColumnDef::new(Books::CoverImage).string())
                    .col(
                        ColumnDef::new(Books::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        // Non-unique: isbn uniqueness is scoped to non-deleted books and
        // enforced by the service.
        manager
            .create_index(
                Index::create()
                    .name("idx_books_isbn")
                    .table(Books::Table)
                    .col(Books::Isbn)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::Description).string())
                    .col(
                        ColumnDef::new(Categories::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BookCategories::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BookCategories::BookId).uuid().not_null())
                    .col(
                        ColumnDef::new(BookCategories::CategoryId)
                            .uuid()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(BookCategories::BookId)
                            .col(BookCategories::CategoryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(BookCategories::Table, BookCategories::BookId)
                            .to(Books::Table, Books::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(BookCategories::Table, BookCategories::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BookCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Books::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Books {
    Table,
    Id,
    Title,
    Author,
    Isbn,
    Price,
    Description,
    CoverImage,
    IsDeleted,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    Description,
    IsDeleted,
}

#[derive(DeriveIden)]
enum BookCategories {
    Table,
    BookId,
    CategoryId,
}
