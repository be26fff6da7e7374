use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create branches table
        manager
            .create_table(
                Table::create()
                    .table(Branches::Table)
                    .if_not_exists()
                    .col(pk_auto(Branches::Id))
                    .col(string(Branches::Name))
                    .col(string(Branches::Address))
                    .col(string(Branches::Phone))
                    .col(string_null(Branches::ImageUrl))
                    .to_owned(),
            )
            .await?;

        // Create users table. The unique key on username is what makes
        // concurrent account provisioning safe: the allocator only
        // suggests a name, this constraint enforces it.
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Username).unique_key())
                    .col(string(Users::PasswordHash))
                    .col(string(Users::Name))
                    .col(string(Users::Email))
                    .col(string(Users::Phone))
                    .col(string(Users::FatherName))
                    .col(string(Users::MotherName))
                    .col(string_null(Users::ImageUrl))
                    .col(string(Users::Gender).string_len(10))
                    .col(string(Users::Role).string_len(10))
                    .col(boolean(Users::IsAdmin).default(false))
                    .col(integer_null(Users::BranchId))
                    .col(date(Users::JoinedOn))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_branch")
                            .from(Users::Table, Users::BranchId)
                            .to(Branches::Table, Branches::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create admissions table
        manager
            .create_table(
                Table::create()
                    .table(Admissions::Table)
                    .if_not_exists()
                    .col(pk_auto(Admissions::Id))
                    .col(string(Admissions::Name))
                    .col(string(Admissions::FatherName))
                    .col(string(Admissions::MotherName))
                    .col(date(Admissions::DateOfBirth))
                    .col(string(Admissions::Gender).string_len(10))
                    .col(string_null(Admissions::BloodGroup).string_len(3))
                    .col(string(Admissions::Email))
                    .col(string(Admissions::Phone))
                    .col(string_null(Admissions::ImageUrl))
                    .col(string_null(Admissions::TransactionRef))
                    .col(string(Admissions::Status).string_len(10).default("PENDING"))
                    .col(timestamp_with_time_zone(Admissions::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create notices table
        manager
            .create_table(
                Table::create()
                    .table(Notices::Table)
                    .if_not_exists()
                    .col(pk_auto(Notices::Id))
                    .col(string(Notices::Title))
                    .col(text(Notices::Body))
                    .col(date(Notices::PublishedOn))
                    .col(timestamp_with_time_zone(Notices::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create payments table
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(pk_auto(Payments::Id))
                    .col(integer(Payments::UserId))
                    .col(decimal(Payments::Amount).decimal_len(16, 4))
                    .col(date(Payments::PaidOn))
                    .col(string_null(Payments::TransactionRef))
                    .col(string_null(Payments::Note))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_user")
                            .from(Payments::Table, Payments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create gallery_items table
        manager
            .create_table(
                Table::create()
                    .table(GalleryItems::Table)
                    .if_not_exists()
                    .col(pk_auto(GalleryItems::Id))
                    .col(string_null(GalleryItems::Caption))
                    .col(string(GalleryItems::ImageUrl))
                    .col(timestamp_with_time_zone(GalleryItems::CreatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GalleryItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Notices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Admissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Branches::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Branches {
    Table,
    Id,
    Name,
    Address,
    Phone,
    ImageUrl,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    Name,
    Email,
    Phone,
    FatherName,
    MotherName,
    ImageUrl,
    Gender,
    Role,
    IsAdmin,
    BranchId,
    JoinedOn,
}

#[derive(DeriveIden)]
enum Admissions {
    Table,
    Id,
    Name,
    FatherName,
    MotherName,
    DateOfBirth,
    Gender,
    BloodGroup,
    Email,
    Phone,
    ImageUrl,
    TransactionRef,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Notices {
    Table,
    Id,
    Title,
    Body,
    PublishedOn,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    UserId,
    Amount,
    PaidOn,
    TransactionRef,
    Note,
}

#[derive(DeriveIden)]
enum GalleryItems {
    Table,
    Id,
    Caption,
    ImageUrl,
    CreatedAt,
}
