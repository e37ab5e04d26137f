//! Create article like table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ArticleLike::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ArticleLike::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ArticleLike::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ArticleLike::ContentTypeUid)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ArticleLike::EntryUid)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ArticleLike::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_article_like_user")
                            .from(ArticleLike::Table, ArticleLike::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: one like per user per entry. This is the authority
        // that keeps racing toggles from inserting duplicates.
        manager
            .create_index(
                Index::create()
                    .name("idx_article_like_identity")
                    .table(ArticleLike::Table)
                    .col(ArticleLike::UserId)
                    .col(ArticleLike::ContentTypeUid)
                    .col(ArticleLike::EntryUid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: entry_uid (for like counts)
        manager
            .create_index(
                Index::create()
                    .name("idx_article_like_entry_uid")
                    .table(ArticleLike::Table)
                    .col(ArticleLike::EntryUid)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ArticleLike::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ArticleLike {
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
