//! Session resolution: provider session changes to admin authorization.

use serde_json::{Map, Value};
use sweetslot_core::{AdminRole, Phone, ShopCategory, Uid};
use sweetslot_store::{DocumentStore, StoreError};
use tracing::{debug, warn};

use crate::collections::{ADMINS, USERS};
use crate::profile::AdminProfile;
use crate::provider::{IdentityProvider, Principal, SessionStream};

/// The resolver's current view of the session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// The authenticated principal, when a usable session exists.
    pub principal: Option<Principal>,
    /// The admin authorization record for the principal, if any.
    pub admin: Option<AdminProfile>,
    /// Convenience copy of `admin.categories`, empty when not an admin.
    pub allowed_categories: Vec<ShopCategory>,
    /// True until the first session change has been processed.
    pub loading: bool,
}

impl SessionState {
    #[must_use]
    fn initial() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }
}

/// Turns identity-provider session events into an [`AdminProfile`].
///
/// Lookup failures fail closed: on any error reading the admin record the
/// principal is treated as a non-admin and the failure is logged, never
/// surfaced as elevated access.
pub struct SessionResolver<P, S> {
    provider: P,
    store: S,
    sessions: SessionStream,
    state: SessionState,
}

impl<P: IdentityProvider, S: DocumentStore> SessionResolver<P, S> {
    /// Create a resolver and subscribe to the provider's session stream.
    pub fn new(provider: P, store: S) -> Self {
        let sessions = provider.subscribe_sessions();
        Self {
            provider,
            store,
            sessions,
            state: SessionState::initial(),
        }
    }

    /// The current session view.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// The resolved admin profile, if the principal is an admin.
    #[must_use]
    pub fn admin(&self) -> Option<&AdminProfile> {
        self.state.admin.as_ref()
    }

    /// Whether the current principal is an active superadmin or admin.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.admin().is_some_and(AdminProfile::is_super_admin)
    }

    /// Role check against the resolved profile.
    ///
    /// `None` requires nothing and passes for any session, admin or not;
    /// a concrete role needs a resolved profile that satisfies it.
    #[must_use]
    pub fn has_role(&self, required: Option<AdminRole>) -> bool {
        match required {
            None => true,
            Some(role) => self.admin().is_some_and(|a| a.has_role(Some(role))),
        }
    }

    /// Whether the current principal may manage the given shop category.
    #[must_use]
    pub fn can_manage_category(&self, shop: &str) -> bool {
        self.admin().is_some_and(|a| a.can_manage_category(shop))
    }

    /// Drive one session event from the provider stream.
    ///
    /// Returns `false` when the provider closed the stream.
    pub async fn pump(&mut self) -> bool {
        match self.sessions.recv().await {
            Some(principal) => {
                self.handle_session_change(principal).await;
                true
            }
            None => false,
        }
    }

    /// Apply a single session change.
    ///
    /// Principals without any contact channel are treated as signed out.
    /// For usable principals the display name and phone are backfilled from
    /// the `users` record (best effort), then the admin profile is loaded.
    pub async fn handle_session_change(&mut self, principal: Option<Principal>) {
        match principal {
            Some(mut principal) if principal.has_contact() => {
                self.backfill_profile(&mut principal).await;
                let uid = principal.uid.clone();
                self.state.principal = Some(principal);
                self.load_admin_profile(&uid).await;
            }
            _ => {
                self.state.principal = None;
                self.state.admin = None;
                self.state.allowed_categories.clear();
            }
        }
        self.state.loading = false;
    }

    /// Re-read the admin record for the current principal.
    pub async fn refresh_admin_profile(&mut self) {
        let Some(uid) = self.state.principal.as_ref().map(|p| p.uid.clone()) else {
            return;
        };
        self.load_admin_profile(&uid).await;
    }

    /// Fill in a missing display name from the `users` record, picking up
    /// a stored phone along the way.
    ///
    /// Only runs when the provider reported no display name; a principal
    /// that already carries one is taken as-is. Failures here never block
    /// the session; they are logged and the principal proceeds with
    /// whatever the provider reported.
    async fn backfill_profile(&self, principal: &mut Principal) {
        if principal.display_name.is_some() {
            return;
        }
        let doc = match self.store.get_document(USERS, principal.uid.as_str()).await {
            Ok(Some(doc)) => doc,
            Ok(None) => return,
            Err(err) => {
                warn!(uid = %principal.uid, error = %err, "user profile backfill failed");
                return;
            }
        };

        if let Some(name) = doc.field("name").and_then(Value::as_str)
            && !name.trim().is_empty()
        {
            if let Err(err) = self.provider.update_display_name(&principal.uid, name).await {
                warn!(uid = %principal.uid, error = %err, "display name sync failed");
            }
            principal.display_name = Some(name.to_owned());
        }
        if principal.phone.is_none()
            && let Some(phone) = doc.field("phone").and_then(Value::as_str)
            && !phone.trim().is_empty()
        {
            principal.phone = Some(Phone::normalize(phone));
        }
    }

    async fn load_admin_profile(&mut self, uid: &Uid) {
        match self.resolve_admin(uid).await {
            Ok(profile) => {
                self.state.allowed_categories = profile
                    .as_ref()
                    .map(|p| p.categories.clone())
                    .unwrap_or_default();
                debug!(
                    uid = %uid,
                    is_admin = profile.is_some(),
                    categories = self.state.allowed_categories.len(),
                    "admin profile resolved"
                );
                self.state.admin = profile;
            }
            Err(err) => {
                // Fail closed: an unreadable admin record grants nothing.
                warn!(uid = %uid, error = %err, "admin profile lookup failed");
                self.state.admin = None;
                self.state.allowed_categories.clear();
            }
        }
    }

    async fn resolve_admin(&self, uid: &Uid) -> Result<Option<AdminProfile>, StoreError> {
        let Some(doc) = self.store.get_document(ADMINS, uid.as_str()).await? else {
            return Ok(None);
        };

        let role = doc
            .field("role")
            .and_then(Value::as_str)
            .map(AdminRole::parse)
            .unwrap_or_default();

        let categories = if role == AdminRole::SuperAdmin {
            self.union_all_categories().await?
        } else {
            normalize_categories(raw_categories(&doc.fields))
        };

        Ok(Some(AdminProfile {
            active: doc.field("active").and_then(Value::as_bool).unwrap_or(false),
            role,
            categories,
            email: doc
                .field("email")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
        }))
    }

    /// Union of categories across every admin record, first seen wins.
    async fn union_all_categories(&self) -> Result<Vec<ShopCategory>, StoreError> {
        let docs = self.store.list_documents(ADMINS).await?;
        let mut union = Vec::new();
        for doc in &docs {
            for category in normalize_categories(raw_categories(&doc.fields)) {
                if !union.contains(&category) {
                    union.push(category);
                }
            }
        }
        Ok(union)
    }
}

/// Raw category strings on an admin record.
///
/// Newer records carry a `categories` array; older ones a single
/// `category` string. The array wins when both are present.
fn raw_categories(fields: &Map<String, Value>) -> Vec<String> {
    if let Some(list) = fields.get("categories").and_then(Value::as_array) {
        return list
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect();
    }
    fields
        .get("category")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .into_iter()
        .collect()
}

/// Normalize raw categories, dropping blanks and duplicates in order.
fn normalize_categories(raw: Vec<String>) -> Vec<ShopCategory> {
    let mut out = Vec::new();
    for item in raw {
        if let Some(category) = ShopCategory::parse(&item) {
            if !out.contains(&category) {
                out.push(category);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_categories_prefers_array() {
        let mut fields = Map::new();
        fields.insert("categories".to_owned(), json!(["Bandra", "Andheri"]));
        fields.insert("category".to_owned(), json!("juhu"));
        assert_eq!(raw_categories(&fields), vec!["Bandra", "Andheri"]);
    }

    #[test]
    fn test_raw_categories_legacy_singular() {
        let mut fields = Map::new();
        fields.insert("category".to_owned(), json!("Juhu"));
        assert_eq!(raw_categories(&fields), vec!["Juhu"]);
    }

    #[test]
    fn test_normalize_dedupes_preserving_order() {
        let normalized = normalize_categories(vec![
            " Bandra ".to_owned(),
            "bandra".to_owned(),
            String::new(),
            "Andheri".to_owned(),
        ]);
        let names: Vec<&str> = normalized.iter().map(ShopCategory::as_str).collect();
        assert_eq!(names, vec!["bandra", "andheri"]);
    }
}
