use sea_orm_migration::prelude::*;
use uuid::Uuid;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::DisplayName).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::SessionVersion)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(timestamp(Users::CreatedAt))
                    .col(timestamp(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UnitPreferences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UnitPreferences::UserId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UnitPreferences::Depth).string())
                    .col(ColumnDef::new(UnitPreferences::Temperature).string())
                    .col(ColumnDef::new(UnitPreferences::Pressure).string())
                    .col(ColumnDef::new(UnitPreferences::Weight).string())
                    .col(timestamp(UnitPreferences::UpdatedAt))
                    .foreign_key(&mut owner_fk(UnitPreferences::Table, UnitPreferences::UserId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DiveLogs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DiveLogs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(DiveLogs::UserId).uuid().not_null())
                    .col(ColumnDef::new(DiveLogs::DiveNumber).integer())
                    .col(ColumnDef::new(DiveLogs::SiteName).string().not_null())
                    .col(ColumnDef::new(DiveLogs::Location).string())
                    .col(timestamp(DiveLogs::DivedAt))
                    .col(ColumnDef::new(DiveLogs::BottomTimeMin).integer().not_null())
                    .col(ColumnDef::new(DiveLogs::MaxDepthCm).integer().not_null())
                    .col(ColumnDef::new(DiveLogs::WaterTempCx10).integer())
                    .col(ColumnDef::new(DiveLogs::VisibilityCm).integer())
                    .col(ColumnDef::new(DiveLogs::StartPressureBarX10).integer())
                    .col(ColumnDef::new(DiveLogs::EndPressureBarX10).integer())
                    .col(ColumnDef::new(DiveLogs::WeightG).integer())
                    .col(ColumnDef::new(DiveLogs::Notes).text())
                    .col(timestamp(DiveLogs::CreatedAt))
                    .col(timestamp(DiveLogs::UpdatedAt))
                    .foreign_key(&mut owner_fk(DiveLogs::Table, DiveLogs::UserId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dive_logs_user_dived_at")
                    .table(DiveLogs::Table)
                    .col(DiveLogs::UserId)
                    .col(DiveLogs::DivedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DivePlans::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DivePlans::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(DivePlans::UserId).uuid().not_null())
                    .col(ColumnDef::new(DivePlans::SiteName).string().not_null())
                    .col(timestamp(DivePlans::PlannedAt))
                    .col(
                        ColumnDef::new(DivePlans::PlannedMaxDepthCm)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DivePlans::PlannedBottomTimeMin).integer())
                    .col(ColumnDef::new(DivePlans::GasMix).string())
                    .col(ColumnDef::new(DivePlans::Notes).text())
                    .col(ColumnDef::new(DivePlans::SafetyBriefing).text())
                    .col(timestamp(DivePlans::CreatedAt))
                    .col(timestamp(DivePlans::UpdatedAt))
                    .foreign_key(&mut owner_fk(DivePlans::Table, DivePlans::UserId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dive_plans_user_planned_at")
                    .table(DivePlans::Table)
                    .col(DivePlans::UserId)
                    .col(DivePlans::PlannedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CertificationDefinitions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CertificationDefinitions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CertificationDefinitions::Agency)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CertificationDefinitions::Name)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CertificationDefinitions::Category)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CertificationDefinitions::LevelRank)
                            .integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_certification_definitions_agency_name")
                    .table(CertificationDefinitions::Table)
                    .col(CertificationDefinitions::Agency)
                    .col(CertificationDefinitions::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Certifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Certifications::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Certifications::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Certifications::DefinitionId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Certifications::CertifiedOn).timestamp_with_time_zone())
                    .col(ColumnDef::new(Certifications::CardNumber).string())
                    .col(ColumnDef::new(Certifications::Instructor).string())
                    .col(timestamp(Certifications::CreatedAt))
                    .foreign_key(&mut owner_fk(Certifications::Table, Certifications::UserId))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Certifications::Table, Certifications::DefinitionId)
                            .to(CertificationDefinitions::Table, CertificationDefinitions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_certifications_user_definition")
                    .table(Certifications::Table)
                    .col(Certifications::UserId)
                    .col(Certifications::DefinitionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GearItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GearItems::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(GearItems::UserId).uuid().not_null())
                    .col(ColumnDef::new(GearItems::Name).string().not_null())
                    .col(ColumnDef::new(GearItems::Kind).string().not_null())
                    .col(ColumnDef::new(GearItems::Brand).string())
                    .col(ColumnDef::new(GearItems::Model).string())
                    .col(ColumnDef::new(GearItems::SerialNumber).string())
                    .col(ColumnDef::new(GearItems::PurchasedOn).timestamp_with_time_zone())
                    .col(ColumnDef::new(GearItems::LastServicedOn).timestamp_with_time_zone())
                    .col(ColumnDef::new(GearItems::Notes).text())
                    .col(timestamp(GearItems::CreatedAt))
                    .col(timestamp(GearItems::UpdatedAt))
                    .foreign_key(&mut owner_fk(GearItems::Table, GearItems::UserId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GearKits::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GearKits::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(GearKits::UserId).uuid().not_null())
                    .col(ColumnDef::new(GearKits::Name).string().not_null())
                    .col(timestamp(GearKits::CreatedAt))
                    .col(timestamp(GearKits::UpdatedAt))
                    .foreign_key(&mut owner_fk(GearKits::Table, GearKits::UserId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GearKitItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GearKitItems::KitId).uuid().not_null())
                    .col(ColumnDef::new(GearKitItems::ItemId).uuid().not_null())
                    .col(ColumnDef::new(GearKitItems::Position).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(GearKitItems::KitId)
                            .col(GearKitItems::ItemId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GearKitItems::Table, GearKitItems::KitId)
                            .to(GearKits::Table, GearKits::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GearKitItems::Table, GearKitItems::ItemId)
                            .to(GearItems::Table, GearItems::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        seed_definitions(manager).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GearKitItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GearKits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GearItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Certifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CertificationDefinitions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DivePlans::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DiveLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UnitPreferences::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

/// Built-in certification catalogue: (id, agency, name, category, rank).
const DEFINITIONS: &[(u128, &str, &str, &str, i32)] = &[
    (0x0c1e_0001, "PADI", "Open Water Diver", "core", 10),
    (0x0c1e_0002, "PADI", "Advanced Open Water Diver", "core", 20),
    (0x0c1e_0003, "PADI", "Rescue Diver", "core", 30),
    (0x0c1e_0004, "SSI", "Open Water Diver", "core", 10),
    (0x0c1e_0005, "SSI", "Advanced Adventurer", "core", 20),
    (0x0c1e_0006, "SSI", "Stress & Rescue", "core", 30),
    (0x0c1e_0101, "PADI", "Enriched Air Diver", "specialty", 10),
    (0x0c1e_0102, "PADI", "Deep Diver", "specialty", 20),
    (0x0c1e_0103, "PADI", "Night Diver", "specialty", 20),
    (0x0c1e_0104, "PADI", "Wreck Diver", "specialty", 30),
    (0x0c1e_0105, "SSI", "Enriched Air Nitrox", "specialty", 10),
    (0x0c1e_0106, "SSI", "Deep Diving", "specialty", 20),
    (0x0c1e_0201, "PADI", "Divemaster", "professional", 10),
    (0x0c1e_0202, "PADI", "Open Water Scuba Instructor", "professional", 20),
    (0x0c1e_0203, "SSI", "Dive Guide", "professional", 10),
    (0x0c1e_0204, "SSI", "Open Water Instructor", "professional", 20),
];

async fn seed_definitions(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    let mut insert = Query::insert();
    insert.into_table(CertificationDefinitions::Table).columns([
        CertificationDefinitions::Id,
        CertificationDefinitions::Agency,
        CertificationDefinitions::Name,
        CertificationDefinitions::Category,
        CertificationDefinitions::LevelRank,
    ]);
    for &(id, agency, name, category, rank) in DEFINITIONS {
        insert
            .values([
                Uuid::from_u128(id).into(),
                agency.into(),
                name.into(),
                category.into(),
                rank.into(),
            ])
            .map_err(|e| DbErr::Custom(e.to_string()))?;
    }
    manager.exec_stmt(insert).await
}

fn timestamp<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

fn owner_fk<T: IntoTableRef, C: IntoIden>(table: T, column: C) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .from(table, column)
        .to(Users::Table, Users::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    DisplayName,
    PasswordHash,
    SessionVersion,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UnitPreferences {
    Table,
    UserId,
    Depth,
    Temperature,
    Pressure,
    Weight,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DiveLogs {
    Table,
    Id,
    UserId,
    DiveNumber,
    SiteName,
    Location,
    DivedAt,
    BottomTimeMin,
    MaxDepthCm,
    #[sea_orm(iden = "water_temp_cx10")]
    WaterTempCx10,
    VisibilityCm,
    #[sea_orm(iden = "start_pressure_bar_x10")]
    StartPressureBarX10,
    #[sea_orm(iden = "end_pressure_bar_x10")]
    EndPressureBarX10,
    WeightG,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DivePlans {
    Table,
    Id,
    UserId,
    SiteName,
    PlannedAt,
    PlannedMaxDepthCm,
    PlannedBottomTimeMin,
    GasMix,
    Notes,
    SafetyBriefing,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CertificationDefinitions {
    Table,
    Id,
    Agency,
    Name,
    Category,
    LevelRank,
}

#[derive(DeriveIden)]
enum Certifications {
    Table,
    Id,
    UserId,
    DefinitionId,
    CertifiedOn,
    CardNumber,
    Instructor,
    CreatedAt,
}

#[derive(DeriveIden)]
enum GearItems {
    Table,
    Id,
    UserId,
    Name,
    Kind,
    Brand,
    Model,
    SerialNumber,
    PurchasedOn,
    LastServicedOn,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GearKits {
    Table,
    Id,
    UserId,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GearKitItems {
    Table,
    KitId,
    ItemId,
    Position,
}
