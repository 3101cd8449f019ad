pub mod attendance;
pub mod auth;
pub mod chat;
pub mod class;
pub mod complaint;
pub mod dashboard;
pub mod department;
pub mod grade;
pub mod notice;
pub mod subject;
pub mod timetable;
pub mod user;

use database::entities::attachment::{Attachment, Attachments};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Keeps an explicit `null` apart from an absent field: absent stays `None`
/// through `#[serde(default)]`, `null` becomes `Some(None)`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(page: u64, per_page: u64, total_items: u64) -> Self {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 100);
        let total_pages = total_items.div_ceil(per_page);

        Self {
            page,
            per_page,
            total_pages,
            total_items,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// Plain `{ "message": ... }` acknowledgement
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentResponse {
    pub file_name: String,
    pub url: String,
    pub size: u64,
    pub content_type: Option<String>,
}

impl From<Attachment> for AttachmentResponse {
    fn from(a: Attachment) -> Self {
        Self {
            file_name: a.file_name,
            url: a.url,
            size: a.size,
            content_type: a.content_type,
        }
    }
}

pub(crate) fn attachments(list: Attachments) -> Vec<AttachmentResponse> {
    list.0.into_iter().map(Into::into).collect()
}

pub(crate) fn default_page() -> u64 {
    1
}

pub(crate) fn default_per_page() -> u64 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 20, 45, 3, true, false)]
    #[case(3, 20, 45, 3, false, true)]
    #[case(1, 20, 0, 0, false, false)]
    #[case(0, 500, 150, 2, true, false)]
    fn test_pagination_meta(
        #[case] page: u64,
        #[case] per_page: u64,
        #[case] total: u64,
        #[case] pages: u64,
        #[case] next: bool,
        #[case] prev: bool,
    ) {
        let meta = PaginationMeta::new(page, per_page, total);
        assert_eq!(meta.total_pages, pages);
        assert_eq!(meta.has_next, next);
        assert_eq!(meta.has_prev, prev);
    }
}
