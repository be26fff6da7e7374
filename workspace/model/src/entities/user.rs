use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::admission::Gender;
use super::branch;

/// Role of a provisioned account. Admission-provisioned members are
/// always students; trainers and admins are created directly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "UPPERCASE")]
#[derive(Default)]
pub enum UserRole {
    #[sea_orm(string_value = "STUDENT")]
    #[default]
    Student,
    #[sea_orm(string_value = "TRAINER")]
    Trainer,
    #[sea_orm(string_value = "ADMIN")]
    Admin,
}

/// Represents a member account.
///
/// The `username` column carries a UNIQUE constraint; generated usernames
/// follow the `d<number>` pattern but legacy hand-picked usernames also
/// exist and are valid.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    /// Bcrypt hash. Never exposed through the API.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub father_name: String,
    pub mother_name: String,
    pub image_url: Option<String>,
    pub gender: Gender,
    pub role: UserRole,
    pub is_admin: bool,
    /// Branch the member trains at. Assigned by an admin after
    /// provisioning, so nullable.
    pub branch_id: Option<i32>,
    pub joined_on: NaiveDate,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::branch::Entity",
        from = "Column::BranchId",
        to = "super::branch::Column::Id"
    )]
    Branch,
    #[sea_orm(has_many = "super::payment::Entity")]
    Payment,
}

impl Related<branch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Branch.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
