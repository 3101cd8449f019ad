use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumIter, AsRefStr,
)]
#[cfg_attr(feature = "database", derive(sea_orm::DeriveActiveEnum))]
#[cfg_attr(feature = "database", sea_orm(rs_type = "String", db_type = "Text"))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChatType {
    /// Exactly two participants
    #[cfg_attr(feature = "database", sea_orm(string_value = "direct"))]
    Direct,
    #[cfg_attr(feature = "database", sea_orm(string_value = "group"))]
    Group,
}

/// Longest message body accepted
pub const MAX_MESSAGE_LEN: usize = 4000;
