use sea_orm_migration::prelude::*;

mod m20220524_000001_initial;
mod m20220601_000002_add_subscriptions;
mod m20220617_000003_add_auth_tokens;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20220524_000001_initial::Migration),
            Box::new(m20220601_000002_add_subscriptions::Migration),
            Box::new(m20220617_000003_add_auth_tokens::Migration),
        ]
    }
}
