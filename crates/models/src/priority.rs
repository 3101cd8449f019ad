use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

/// Urgency shared by notices and complaints
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[cfg_attr(feature = "database", derive(sea_orm::DeriveActiveEnum))]
#[cfg_attr(feature = "database", sea_orm(rs_type = "String", db_type = "Text"))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Priority {
    #[cfg_attr(feature = "database", sea_orm(string_value = "low"))]
    Low,
    #[default]
    #[cfg_attr(feature = "database", sea_orm(string_value = "normal"))]
    Normal,
    #[cfg_attr(feature = "database", sea_orm(string_value = "high"))]
    High,
    #[cfg_attr(feature = "database", sea_orm(string_value = "urgent"))]
    Urgent,
}
