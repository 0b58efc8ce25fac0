use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let is_postgres = manager.get_database_backend() == sea_orm::DatabaseBackend::Postgres;

        if is_postgres {
            manager
                .get_connection()
                .execute_unprepared("CREATE EXTENSION IF NOT EXISTS \"postgis\";")
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Whales::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Whales::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Whales::Species).string().not_null())
                    .col(ColumnDef::new(Whales::CommonName).string())
                    .col(
                        ColumnDef::new(Whales::Population)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Whales::Longitude).double().not_null())
                    .col(ColumnDef::new(Whales::Latitude).double().not_null())
                    .col(
                        ColumnDef::new(Whales::Region)
                            .string()
                            .not_null()
                            .default("Unknown"),
                    )
                    .col(
                        ColumnDef::new(Whales::LastUpdated)
                            .date()
                            .not_null()
                            .default(Expr::current_date()),
                    )
                    .to_owned(),
            )
            .await?;

        // Conflict target for occurrence upserts
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_whales_species_location")
                    .table(Whales::Table)
                    .col(Whales::Species)
                    .col(Whales::Longitude)
                    .col(Whales::Latitude)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_whales_region")
                    .table(Whales::Table)
                    .col(Whales::Region)
                    .to_owned(),
            )
            .await?;

        // PostGIS point derived from the stored coordinates (PostgreSQL only)
        if is_postgres {
            manager
                .get_connection()
                .execute_unprepared(
                    "ALTER TABLE whales ADD COLUMN IF NOT EXISTS location geometry(Point, 4326)
                        GENERATED ALWAYS AS
                        (ST_SetSRID(ST_MakePoint(longitude, latitude), 4326)) STORED;",
                )
                .await?;
            manager
                .get_connection()
                .execute_unprepared(
                    "CREATE INDEX IF NOT EXISTS idx_whales_location
                        ON whales USING GIST (location);",
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Whales::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Whales {
    Table,
    Id,
    Species,
    CommonName,
    Population,
    Longitude,
    Latitude,
    Region,
    LastUpdated,
}
