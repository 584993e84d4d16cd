//! Create cars table
//!
//! Catalog rows are written by the car catalog; reservations only read
//! `price_per_day`.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cars::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cars::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Cars::Brand).string().not_null())
                    .col(ColumnDef::new(Cars::Model).string().not_null())
                    .col(ColumnDef::new(Cars::Year).integer().not_null())
                    .col(ColumnDef::new(Cars::PricePerDay).double().not_null())
                    .col(
                        ColumnDef::new(Cars::RegistrationNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Cars::Mileage).integer())
                    .col(ColumnDef::new(Cars::FuelType).string())
                    .col(ColumnDef::new(Cars::Gearbox).string())
                    .col(ColumnDef::new(Cars::Seats).integer())
                    .col(ColumnDef::new(Cars::Description).text())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Cars::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Cars {
    Table,
    Id,
    Brand,
    Model,
    Year,
    PricePerDay,
    RegistrationNumber,
    Mileage,
    FuelType,
    Gearbox,
    Seats,
    Description,
}
