//! Resolved admin authorization profile.

use sweetslot_core::{AdminRole, ShopCategory};

/// What an authenticated principal is allowed to administer.
///
/// Produced by [`crate::SessionResolver`] from the `admins` collection.
/// For superadmins `categories` is the deduplicated union across every
/// admin record; for scoped admins it is their own normalized list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminProfile {
    pub active: bool,
    pub role: AdminRole,
    pub categories: Vec<ShopCategory>,
    pub email: String,
}

impl AdminProfile {
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.role == AdminRole::SuperAdmin
    }

    /// Check against a required role.
    ///
    /// `None` means any admin qualifies, and superadmins satisfy every
    /// requirement.
    #[must_use]
    pub fn has_role(&self, required: Option<AdminRole>) -> bool {
        required.is_none_or(|role| self.is_super_admin() || self.role == role)
    }

    /// Whether this admin may manage the given shop category.
    ///
    /// Requires an active record. Superadmins manage everything; scoped
    /// admins match against their category list with the usual
    /// trim/lowercase normalization.
    #[must_use]
    pub fn can_manage_category(&self, shop: &str) -> bool {
        self.active
            && (self.is_super_admin() || self.categories.iter().any(|c| c.matches(shop)))
    }

    /// The category driving board visibility for a scoped admin.
    ///
    /// Only the first assigned category scopes the booking board; the rest
    /// of the list still grants `can_manage_category`.
    #[must_use]
    pub fn primary_category(&self) -> Option<&ShopCategory> {
        self.categories.first()
    }
}
