//! Share settings and public access.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use websharex_core::error::AppError;
use websharex_core::result::AppResult;
use websharex_core::types::EntryId;
use websharex_entity::entry::{Entry, ShareSettings};

use crate::context::ServiceContext;
use crate::password::PasswordHasher;

use super::token::generate_token;

/// Requested share state of a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareOptions {
    /// Whether the link is active.
    pub enabled: bool,
    /// When the link stops working.
    pub expires_at: Option<DateTime<Utc>>,
    /// Link password; empty or absent means none.
    pub password: Option<String>,
}

/// A file resolved through its share link.
#[derive(Debug, Clone, Serialize)]
pub struct SharedFile {
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type.
    pub mime_type: String,
    /// Signed download URL.
    pub url: String,
}

/// Manages file share links.
#[derive(Debug, Clone)]
pub struct ShareService {
    ctx: Arc<ServiceContext>,
    hasher: PasswordHasher,
}

impl ShareService {
    /// Creates a new share service.
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self {
            ctx,
            hasher: PasswordHasher::new(),
        }
    }

    /// Enable, update, or disable the share link of a file.
    ///
    /// Disabling clears every share field. Enabling keeps an issued token
    /// and its issue time, or issues a new token now.
    pub async fn set_share_options(
        &self,
        room: &str,
        id: EntryId,
        options: ShareOptions,
    ) -> AppResult<Entry> {
        let password_hash = match options.password.as_deref().map(str::trim) {
            Some(password) if options.enabled && !password.is_empty() => {
                Some(self.hasher.hash_password(password)?)
            }
            _ => None,
        };

        self.ctx
            .exclusive(room, "set_share_options", async {
                let mut state = self.ctx.load_room(room).await?;
                let entry = state
                    .entries
                    .iter_mut()
                    .find(|e| e.id == id)
                    .ok_or_else(|| {
                        AppError::not_found(format!("Entry {id} not found in room '{room}'"))
                    })?;
                let meta = entry.file_meta_mut().ok_or_else(|| {
                    AppError::validation("Only files can be shared")
                })?;

                meta.share = if options.enabled {
                    let now = Utc::now();
                    ShareSettings {
                        expires_at: options.expires_at,
                        password_hash,
                        token: Some(meta.share.token.take().unwrap_or_else(generate_token)),
                        issued_at: Some(meta.share.issued_at.unwrap_or(now)),
                    }
                } else {
                    ShareSettings::default()
                };
                entry.touch();
                let updated = entry.clone();

                self.ctx.persist(&state).await?;
                info!(room, entry_id = %id, enabled = options.enabled, "Updated share options");
                Ok(updated)
            })
            .await
    }

    /// Resolve a share token to a signed download URL.
    ///
    /// Unknown, disabled, and expired links are all `NotFound`; a missing
    /// or wrong password is `Authentication`.
    pub async fn access_share(
        &self,
        room: &str,
        token: &str,
        password: Option<&str>,
    ) -> AppResult<SharedFile> {
        let state = self.ctx.load_room(room).await?;
        let (entry, meta) = state
            .entries
            .iter()
            .filter_map(|e| e.file_meta().map(|m| (e, m)))
            .find(|(_, m)| m.share.token.as_deref() == Some(token))
            .ok_or_else(|| AppError::not_found("Share link not found"))?;

        if meta.share.is_expired(Utc::now()) {
            return Err(AppError::not_found("Share link has expired"));
        }
        if let Some(hash) = meta.share.password_hash.as_deref() {
            let supplied = password.unwrap_or_default();
            if supplied.is_empty() || !self.hasher.verify_password(supplied, hash)? {
                return Err(AppError::authentication("Share password is incorrect"));
            }
        }
        let key = meta
            .storage_key
            .as_deref()
            .ok_or_else(|| AppError::not_found("Shared file has not been stored"))?;

        let url = self
            .ctx
            .storage
            .signed_url(key, self.ctx.settings.signed_url_ttl)
            .await?;
        Ok(SharedFile {
            name: entry.name.clone(),
            size: meta.size,
            mime_type: meta.mime_type.clone(),
            url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::Duration;
    use websharex_core::error::ErrorKind;
    use websharex_database::RoomStore;

    use crate::context::test_support::memory_context;
    use crate::entry::{EntryService, UploadFile};

    async fn setup() -> (ShareService, EntryService, Entry, Entry) {
        let (ctx, store, _) = memory_context();
        store.create_room("demo", "hash").await.unwrap();
        let entries = EntryService::new(Arc::clone(&ctx));
        let folder = entries.create_folder("demo", "docs", None).await.unwrap();
        let file = entries
            .upload(
                "demo",
                None,
                vec![UploadFile {
                    name: "a.txt".into(),
                    content_type: None,
                    data: Bytes::from_static(b"a"),
                }],
            )
            .await
            .unwrap()
            .remove(0);
        (ShareService::new(ctx), entries, folder, file)
    }

    #[tokio::test]
    async fn test_enable_keeps_token_and_disable_clears() {
        let (shares, _, _, file) = setup().await;

        let first = shares
            .set_share_options("demo", file.id, ShareOptions { enabled: true, ..Default::default() })
            .await
            .unwrap();
        let share = first.file_meta().unwrap().share.clone();
        assert!(share.is_enabled());
        assert!(share.issued_at.is_some());

        let expires = Utc::now() + Duration::hours(1);
        let second = shares
            .set_share_options(
                "demo",
                file.id,
                ShareOptions { enabled: true, expires_at: Some(expires), password: None },
            )
            .await
            .unwrap();
        let again = &second.file_meta().unwrap().share;
        assert_eq!(again.token, share.token);
        assert_eq!(again.issued_at, share.issued_at);
        assert_eq!(again.expires_at, Some(expires));

        let off = shares
            .set_share_options("demo", file.id, ShareOptions::default())
            .await
            .unwrap();
        assert_eq!(off.file_meta().unwrap().share, ShareSettings::default());
    }

    #[tokio::test]
    async fn test_folders_cannot_be_shared() {
        let (shares, _, folder, _) = setup().await;
        let err = shares
            .set_share_options("demo", folder.id, ShareOptions { enabled: true, ..Default::default() })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_access_checks_password_and_expiry() {
        let (shares, _, _, file) = setup().await;
        let shared = shares
            .set_share_options(
                "demo",
                file.id,
                ShareOptions { enabled: true, expires_at: None, password: Some("pw".into()) },
            )
            .await
            .unwrap();
        let token = shared.file_meta().unwrap().share.token.clone().unwrap();

        let err = shares.access_share("demo", &token, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        let err = shares.access_share("demo", &token, Some("nope")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);

        let ok = shares.access_share("demo", &token, Some("pw")).await.unwrap();
        assert_eq!(ok.name, "a.txt");
        assert!(ok.url.starts_with("memory://"));

        shares
            .set_share_options(
                "demo",
                file.id,
                ShareOptions {
                    enabled: true,
                    expires_at: Some(Utc::now() - Duration::minutes(1)),
                    password: None,
                },
            )
            .await
            .unwrap();
        let err = shares.access_share("demo", &token, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let err = shares.access_share("demo", "unknown", None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
