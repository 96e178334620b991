use sea_orm_migration::prelude::*;

mod initial_001;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(initial_001::Migration)]
    }

    // Separate bookkeeping table so this migrator can share a database with
    // the catalog migrator without clashing over `seaql_migrations`.
    fn migration_table_name() -> DynIden {
        Alias::new("storefront_seaql_migrations").into_iden()
    }
}
