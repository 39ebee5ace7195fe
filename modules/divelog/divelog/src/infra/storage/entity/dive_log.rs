use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "dive_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub dive_number: Option<i32>,
    pub site_name: String,
    pub location: Option<String>,
    pub dived_at: TimeDateTimeWithTimeZone,
    pub bottom_time_min: i32,
    pub max_depth_cm: i32,
    pub water_temp_cx10: Option<i32>,
    pub visibility_cm: Option<i32>,
    pub start_pressure_bar_x10: Option<i32>,
    pub end_pressure_bar_x10: Option<i32>,
    pub weight_g: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: TimeDateTimeWithTimeZone,
    pub updated_at: TimeDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
