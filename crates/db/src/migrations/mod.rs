//! Database migrations.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_user_table;
mod m20250601_000002_create_article_like_table;
mod m20250601_000003_create_saved_entry_table;
mod m20250601_000004_create_follow_table;
mod m20250601_000005_create_poll_vote_table;
mod m20250601_000006_create_poll_option_count_table;
mod m20250601_000007_create_notification_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_user_table::Migration),
            Box::new(m20250601_000002_create_article_like_table::Migration),
            Box::new(m20250601_000003_create_saved_entry_table::Migration),
            Box::new(m20250601_000004_create_follow_table::Migration),
            Box::new(m20250601_000005_create_poll_vote_table::Migration),
            Box::new(m20250601_000006_create_poll_option_count_table::Migration),
            Box::new(m20250601_000007_create_notification_table::Migration),
        ]
    }
}
