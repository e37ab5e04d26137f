//! Create poll vote table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PollVote::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PollVote::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PollVote::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(PollVote::ArticleUid)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PollVote::OptionIndex).integer().not_null())
                    .col(
                        ColumnDef::new(PollVote::OptionText)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PollVote::Locale).string_len(16))
                    .col(
                        ColumnDef::new(PollVote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(PollVote::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_poll_vote_user")
                            .from(PollVote::Table, PollVote::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: one vote per user per poll. Vote changes mutate the
        // row; they never add a second one.
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_vote_identity")
                    .table(PollVote::Table)
                    .col(PollVote::UserId)
                    .col(PollVote::ArticleUid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: article_uid (for voter counts)
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_vote_article_uid")
                    .table(PollVote::Table)
                    .col(PollVote::ArticleUid)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PollVote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PollVote {
    Table,
    Id,
    UserId,
    ArticleUid,
    OptionIndex,
    OptionText,
    Locale,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
