use crate::error::{ApiError, ApiResult};
use axum::extract::Multipart;
use database::entities::attachment::Attachment;
use log::{info, warn};
use std::{collections::HashMap, path::PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Public prefix the upload directory is served under
pub const PUBLIC_PREFIX: &str = "/uploads";

const MAX_NAME_LEN: usize = 100;

/// Keeps ASCII letters, digits, dots, dashes and underscores
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    let cleaned: String = cleaned.chars().take(MAX_NAME_LEN).collect();

    if cleaned.is_empty() {
        "file".into()
    } else {
        cleaned
    }
}

/// Attachment files on local disk
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Writes the bytes to `<root>/<category>/<uuid>-<name>`
    pub async fn save(
        &self,
        category: &str,
        file_name: &str,
        content_type: Option<String>,
        bytes: &[u8],
    ) -> ApiResult<Attachment> {
        let original = sanitize_file_name(file_name);
        let stored = format!("{}-{original}", Uuid::new_v4());
        let dir = self.root.join(category);
        fs::create_dir_all(&dir).await?;
        fs::write(dir.join(&stored), bytes).await?;

        info!("Stored upload {category}/{stored} ({} bytes)", bytes.len());
        Ok(Attachment {
            file_name: original,
            url: format!("{PUBLIC_PREFIX}/{category}/{stored}"),
            size: bytes.len() as u64,
            content_type,
        })
    }

    /// Best effort removal of an attachment's file
    pub async fn remove(&self, attachment: &Attachment) {
        let Some(relative) = attachment
            .url
            .strip_prefix(PUBLIC_PREFIX)
            .map(|r| r.trim_start_matches('/'))
        else {
            return;
        };
        if relative.split('/').any(|part| part == "..") {
            return;
        }

        if let Err(e) = fs::remove_file(self.root.join(relative)).await {
            warn!("Failed to remove upload {relative}: {e}");
        }
    }
}

/// Text fields and stored files of a multipart form
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub files: Vec<Attachment>,
}

impl UploadForm {
    /// Drains the form, saving every file part under `category`
    pub async fn read(
        mut multipart: Multipart,
        store: &UploadStore,
        category: &str,
    ) -> ApiResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?;
                    if bytes.is_empty() {
                        continue;
                    }
                    form.files
                        .push(store.save(category, &file_name, content_type, &bytes).await?);
                }
                None => {
                    form.fields.insert(name, field.text().await?);
                }
            }
        }

        Ok(form)
    }

    /// A trimmed, non-empty text field
    pub fn text(&self, key: &str) -> Option<String> {
        self.fields
            .get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn require(&self, key: &str) -> ApiResult<String> {
        self.text(key)
            .ok_or_else(|| ApiError::bad_request(format!("{key} is required")))
    }

    /// Parses an optional field, rejecting values that do not parse
    pub fn parse<T: std::str::FromStr>(&self, key: &str) -> ApiResult<Option<T>> {
        self.text(key)
            .map(|v| {
                v.parse()
                    .map_err(|_| ApiError::bad_request(format!("Invalid {key}: {v}")))
            })
            .transpose()
    }

    /// Comma separated list field
    pub fn list<T: std::str::FromStr>(&self, key: &str) -> ApiResult<Vec<T>> {
        self.text(key)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| {
                        s.parse()
                            .map_err(|_| ApiError::bad_request(format!("Invalid {key}: {s}")))
                    })
                    .collect()
            })
            .unwrap_or_else(|| Ok(vec![]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("syllabus.pdf", "syllabus.pdf")]
    #[case("my notes (v2).txt", "my_notes__v2_.txt")]
    #[case("../../etc/passwd", "passwd")]
    #[case("C:\\Users\\me\\photo.png", "photo.png")]
    #[case(".env", "env")]
    #[case("...", "file")]
    #[case("résumé.doc", "r_sum_.doc")]
    fn test_sanitize_file_name(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_file_name(input), expected);
    }

    #[test]
    fn test_long_names_are_truncated() {
        let name = "a".repeat(300);
        assert_eq!(sanitize_file_name(&name).len(), MAX_NAME_LEN);
    }

    #[tokio::test]
    async fn test_save_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().to_path_buf());

        let attachment = store
            .save("notices", "exam plan.pdf", Some("application/pdf".into()), b"%PDF")
            .await
            .unwrap();
        assert_eq!(attachment.file_name, "exam_plan.pdf");
        assert_eq!(attachment.size, 4);
        assert!(attachment.url.starts_with("/uploads/notices/"));
        assert!(attachment.url.ends_with("-exam_plan.pdf"));

        let path = dir
            .path()
            .join(attachment.url.trim_start_matches("/uploads/"));
        assert!(path.exists());

        store.remove(&attachment).await;
        assert!(!path.exists());
    }
}
