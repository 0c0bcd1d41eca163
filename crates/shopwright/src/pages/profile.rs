//! Session profile kept in browser-local storage.
//!
//! Stored under [`PROFILE_KEY`] as `{"fullname": .., "email": ..}`. Every call
//! is a round trip to the browser; nothing is cached on this side.

use crate::data::profile::PROFILE_KEY;
use crate::model::{ProfileField, SessionProfile};
use crate::result::ShopResult;
use crate::session::SessionContext;

/// Read/write access to the stored profile
#[derive(Debug, Clone)]
pub struct ProfileStore {
    ctx: SessionContext,
}

impl ProfileStore {
    /// Bind to a session
    #[must_use]
    pub const fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    async fn write(&self, profile: &SessionProfile) -> ShopResult<()> {
        let json = serde_json::to_string(profile)?;
        self.ctx.session().local_storage_set(PROFILE_KEY, &json).await
    }

    /// Store a new profile
    ///
    /// # Errors
    ///
    /// Returns error if the browser store cannot be written
    pub async fn set(&self, full_name: &str, email: &str) -> ShopResult<()> {
        self.write(&SessionProfile::new(full_name, email)).await?;
        tracing::info!(full_name, email, "profile set");
        Ok(())
    }

    /// Replace both fields
    ///
    /// # Errors
    ///
    /// Returns error if the browser store cannot be written
    pub async fn update(&self, full_name: &str, email: &str) -> ShopResult<()> {
        self.write(&SessionProfile::new(full_name, email)).await?;
        tracing::info!(full_name, email, "profile updated");
        Ok(())
    }

    /// Replace one field and keep the other
    ///
    /// # Errors
    ///
    /// Returns error if the stored value is not valid profile JSON or the
    /// store cannot be written
    pub async fn partial_update(&self, field: ProfileField, value: &str) -> ShopResult<()> {
        let mut profile = self.get().await?.unwrap_or_default();
        profile.set_field(field, value);
        self.write(&profile).await?;
        tracing::info!(field = field.key(), value, "profile field updated");
        Ok(())
    }

    /// Stored profile, `None` when nothing is stored
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Json`](crate::result::ShopError::Json) if the
    /// stored value is not valid profile JSON
    pub async fn get(&self) -> ShopResult<Option<SessionProfile>> {
        match self.ctx.session().local_storage_get(PROFILE_KEY).await? {
            Some(raw) if !raw.is_empty() => {
                let profile: SessionProfile = serde_json::from_str(&raw)?;
                tracing::debug!(?profile, "profile read");
                Ok(Some(profile))
            }
            _ => Ok(None),
        }
    }

    /// Remove the stored profile
    ///
    /// # Errors
    ///
    /// Returns error if the browser store cannot be written
    pub async fn clear(&self) -> ShopResult<()> {
        self.ctx.session().local_storage_remove(PROFILE_KEY).await?;
        tracing::info!("profile cleared");
        Ok(())
    }

    /// Whether a profile is stored
    ///
    /// # Errors
    ///
    /// Propagates session failures
    pub async fn exists(&self) -> ShopResult<bool> {
        Ok(self.get().await?.is_some())
    }

    /// Whether the stored profile has exactly these values
    ///
    /// # Errors
    ///
    /// Propagates read failures
    pub async fn verify(&self, full_name: &str, email: &str) -> ShopResult<bool> {
        let matches = self
            .get()
            .await?
            .is_some_and(|p| p.full_name == full_name && p.email == email);
        if !matches {
            tracing::warn!(full_name, email, "stored profile differs");
        }
        Ok(matches)
    }

    /// Stored full name
    ///
    /// # Errors
    ///
    /// Propagates read failures
    pub async fn full_name(&self) -> ShopResult<Option<String>> {
        Ok(self.get().await?.map(|p| p.full_name))
    }

    /// Stored email
    ///
    /// # Errors
    ///
    /// Propagates read failures
    pub async fn email(&self) -> ShopResult<Option<String>> {
        Ok(self.get().await?.map(|p| p.email))
    }

    /// Reload the page; the profile must survive it
    ///
    /// # Errors
    ///
    /// Returns error if the reload fails
    pub async fn reload(&self) -> ShopResult<()> {
        self.ctx.session().refresh().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use crate::data::profile;
    use crate::result::ShopError;
    use crate::session::{SessionHandle, SimulatedStorefront};
    use proptest::prelude::*;
    use std::sync::Arc;

    async fn store() -> ProfileStore {
        let config = SuiteConfig::default().with_base_url("https://demo.test/");
        let session: SessionHandle = Arc::new(SimulatedStorefront::new(&config));
        session.open("https://demo.test/").await.unwrap();
        ProfileStore::new(SessionContext::new(session, Arc::new(config)))
    }

    mod round_trip_tests {
        use super::*;

        #[tokio::test]
        async fn test_empty_before_set() {
            let store = store().await;
            assert_eq!(store.get().await.unwrap(), None);
            assert!(!store.exists().await.unwrap());
        }

        #[tokio::test]
        async fn test_set_then_get() {
            let store = store().await;
            store
                .set(profile::INITIAL_FULLNAME, profile::INITIAL_EMAIL)
                .await
                .unwrap();
            assert!(store
                .verify(profile::INITIAL_FULLNAME, profile::INITIAL_EMAIL)
                .await
                .unwrap());
            assert_eq!(
                store.full_name().await.unwrap().as_deref(),
                Some(profile::INITIAL_FULLNAME)
            );
        }

        #[tokio::test]
        async fn test_update_replaces_both() {
            let store = store().await;
            store
                .set(profile::INITIAL_FULLNAME, profile::INITIAL_EMAIL)
                .await
                .unwrap();
            store
                .update(profile::UPDATED_FULLNAME, profile::UPDATED_EMAIL)
                .await
                .unwrap();
            assert_eq!(
                store.get().await.unwrap(),
                Some(crate::data::updated_profile())
            );
        }

        #[tokio::test]
        async fn test_partial_update_keeps_other_field() {
            let store = store().await;
            store
                .set(profile::INITIAL_FULLNAME, profile::INITIAL_EMAIL)
                .await
                .unwrap();
            store
                .partial_update(ProfileField::Email, profile::UPDATED_EMAIL)
                .await
                .unwrap();
            assert!(store
                .verify(profile::INITIAL_FULLNAME, profile::UPDATED_EMAIL)
                .await
                .unwrap());
        }

        #[tokio::test]
        async fn test_clear_then_get() {
            let store = store().await;
            store
                .set(profile::INITIAL_FULLNAME, profile::INITIAL_EMAIL)
                .await
                .unwrap();
            store.clear().await.unwrap();
            assert_eq!(store.get().await.unwrap(), None);
            assert_eq!(store.email().await.unwrap(), None);
        }

        #[tokio::test]
        async fn test_survives_reload() {
            let store = store().await;
            store
                .set(profile::SPECIAL_FULLNAME, profile::SPECIAL_EMAIL)
                .await
                .unwrap();
            store.reload().await.unwrap();
            assert!(store
                .verify(profile::SPECIAL_FULLNAME, profile::SPECIAL_EMAIL)
                .await
                .unwrap());
        }
    }

    mod format_tests {
        use super::*;

        #[tokio::test]
        async fn test_stored_json_shape() {
            let store = store().await;
            store.set("A \"quoted\" name", "a@b.c").await.unwrap();
            let raw = store
                .ctx
                .session()
                .local_storage_get(PROFILE_KEY)
                .await
                .unwrap()
                .unwrap();
            let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
            assert_eq!(value["fullname"], "A \"quoted\" name");
            assert_eq!(value["email"], "a@b.c");
        }

        #[tokio::test]
        async fn test_malformed_value_is_an_error() {
            let store = store().await;
            store
                .ctx
                .session()
                .local_storage_set(PROFILE_KEY, "{not json")
                .await
                .unwrap();
            assert!(matches!(store.get().await.unwrap_err(), ShopError::Json(_)));
        }

        proptest! {
            #[test]
            fn prop_profile_json_round_trip(name in "\\PC{0,24}", email in "[a-z0-9.+]{1,12}@[a-z]{1,8}\\.com") {
                let profile = SessionProfile::new(name, email);
                let json = serde_json::to_string(&profile).unwrap();
                let back: SessionProfile = serde_json::from_str(&json).unwrap();
                prop_assert_eq!(back, profile);
            }
        }
    }
}
