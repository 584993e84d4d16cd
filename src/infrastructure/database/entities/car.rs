//! Car entity
//!
//! Catalog rows are owned by the car catalog; this service only reads the
//! daily rate.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cars")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub brand: String,
    pub model: String,
    pub year: i32,

    /// Daily rental rate
    pub price_per_day: f64,

    #[sea_orm(unique)]
    pub registration_number: String,

    pub mileage: Option<i32>,
    pub fuel_type: Option<String>,
    pub gearbox: Option<String>,
    pub seats: Option<i32>,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reservation::Entity")]
    Reservations,
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
