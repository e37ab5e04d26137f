//! Create saved entry table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SavedEntry::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SavedEntry::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SavedEntry::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SavedEntry::ContentTypeUid)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SavedEntry::EntryUid)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SavedEntry::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_saved_entry_user")
                            .from(SavedEntry::Table, SavedEntry::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: one save per user per entry
        manager
            .create_index(
                Index::create()
                    .name("idx_saved_entry_identity")
                    .table(SavedEntry::Table)
                    .col(SavedEntry::UserId)
                    .col(SavedEntry::ContentTypeUid)
                    .col(SavedEntry::EntryUid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for reading-list pages)
        manager
            .create_index(
                Index::create()
                    .name("idx_saved_entry_user_id")
                    .table(SavedEntry::Table)
                    .col(SavedEntry::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SavedEntry::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SavedEntry {
    Table,
    Id,
    UserId,
    ContentTypeUid,
    EntryUid,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
