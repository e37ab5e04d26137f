//! Create poll option count table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PollOptionCount::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PollOptionCount::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PollOptionCount::ArticleUid)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PollOptionCount::OptionIndex)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PollOptionCount::OptionText)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PollOptionCount::PollQuestion).string_len(512))
                    .col(
                        ColumnDef::new(PollOptionCount::VoteCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PollOptionCount::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: one projection row per (poll, option)
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_option_count_identity")
                    .table(PollOptionCount::Table)
                    .col(PollOptionCount::ArticleUid)
                    .col(PollOptionCount::OptionIndex)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PollOptionCount::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PollOptionCount {
    Table,
    Id,
    ArticleUid,
    OptionIndex,
    OptionText,
    PollQuestion,
    VoteCount,
    LastUpdated,
}
