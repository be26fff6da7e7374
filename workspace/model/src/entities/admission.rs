use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Gender of an applicant or member.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    #[sea_orm(string_value = "MALE")]
    Male,
    #[sea_orm(string_value = "FEMALE")]
    Female,
}

/// Blood group of an applicant. Optional on the admission form.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(3))")]
pub enum BloodGroup {
    #[sea_orm(string_value = "A+")]
    #[serde(rename = "A+")]
    APositive,
    #[sea_orm(string_value = "A-")]
    #[serde(rename = "A-")]
    ANegative,
    #[sea_orm(string_value = "B+")]
    #[serde(rename = "B+")]
    BPositive,
    #[sea_orm(string_value = "B-")]
    #[serde(rename = "B-")]
    BNegative,
    #[sea_orm(string_value = "AB+")]
    #[serde(rename = "AB+")]
    AbPositive,
    #[sea_orm(string_value = "AB-")]
    #[serde(rename = "AB-")]
    AbNegative,
    #[sea_orm(string_value = "O+")]
    #[serde(rename = "O+")]
    OPositive,
    #[sea_orm(string_value = "O-")]
    #[serde(rename = "O-")]
    ONegative,
}

/// Workflow state of an admission. Transitions are one-way:
/// Pending -> Approved or Pending -> Rejected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "UPPERCASE")]
#[derive(Default)]
pub enum AdmissionStatus {
    #[sea_orm(string_value = "PENDING")]
    #[default]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

/// A membership application submitted through the public admission form.
/// Approving one provisions a `user` account; rejecting one only flips
/// the status. The record itself is never deleted by the workflow.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub father_name: String,
    pub mother_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub blood_group: Option<BloodGroup>,
    pub email: String,
    pub phone: String,
    /// Reference to the uploaded applicant photo, if any.
    pub image_url: Option<String>,
    /// Reference to the admission-fee payment transaction, if any.
    pub transaction_ref: Option<String>,
    pub status: AdmissionStatus,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
