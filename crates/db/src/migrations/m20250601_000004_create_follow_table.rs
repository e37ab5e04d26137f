//! Create follow table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Follow::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Follow::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Follow::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Follow::TargetType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Follow::TargetEntryId)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Follow::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_follow_user")
                            .from(Follow::Table, Follow::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: one follow per user per target
        manager
            .create_index(
                Index::create()
                    .name("idx_follow_identity")
                    .table(Follow::Table)
                    .col(Follow::UserId)
                    .col(Follow::TargetType)
                    .col(Follow::TargetEntryId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (target_type, target_entry_id) for follower counts and fan-out
        manager
            .create_index(
                Index::create()
                    .name("idx_follow_target")
                    .table(Follow::Table)
                    .col(Follow::TargetType)
                    .col(Follow::TargetEntryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Follow::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Follow {
    Table,
    Id,
    UserId,
    TargetType,
    TargetEntryId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
