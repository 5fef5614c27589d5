//! User promotion actions.
//!
//! Promoting a user is a confirmation followed by a redirect to the user's
//! change page with a query flag; the admin host applies the change there.

use std::fmt;

use glasscart_core::UserId;

/// A user promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserPromotion {
    /// Staff access: the admin panel and product management.
    MakeAdmin,
    /// Full admin privileges, including managing other admin users.
    MakeSuperuser,
}

/// Asks the operator to confirm an action.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Confirms everything without asking.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}

impl UserPromotion {
    /// Confirmation prompt shown before redirecting.
    #[must_use]
    pub const fn confirm_text(self) -> &'static str {
        match self {
            Self::MakeAdmin => {
                "Make this user an admin? They will be able to access the admin panel and manage products."
            }
            Self::MakeSuperuser => {
                "Make this user a superuser? They will have full admin privileges including managing other admin users."
            }
        }
    }

    /// Query flag the change page understands.
    #[must_use]
    pub const fn query_flag(self) -> &'static str {
        match self {
            Self::MakeAdmin => "make_admin",
            Self::MakeSuperuser => "make_superuser",
        }
    }

    /// Change-page path for `user_id` carrying this promotion's flag.
    #[must_use]
    pub fn redirect_path(self, user_id: UserId) -> String {
        format!("/admin/auth/user/{user_id}/change/?{}=1", self.query_flag())
    }

    /// Ask for confirmation, then return the redirect path.
    ///
    /// Returns `None` when the operator declines.
    pub fn request(self, user_id: UserId, confirm: &impl Confirm) -> Option<String> {
        if !confirm.confirm(self.confirm_text()) {
            tracing::info!(%user_id, promotion = %self, "Promotion declined");
            return None;
        }
        tracing::info!(%user_id, promotion = %self, "Promotion confirmed");
        Some(self.redirect_path(user_id))
    }
}

impl fmt::Display for UserPromotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MakeAdmin => "admin",
            Self::MakeSuperuser => "superuser",
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[test]
    fn test_redirect_paths() {
        let id = UserId::new(7);
        assert_eq!(
            UserPromotion::MakeAdmin.redirect_path(id),
            "/admin/auth/user/7/change/?make_admin=1"
        );
        assert_eq!(
            UserPromotion::MakeSuperuser.redirect_path(id),
            "/admin/auth/user/7/change/?make_superuser=1"
        );
    }

    #[test]
    fn test_declined_promotion_does_not_redirect() {
        let asked = RefCell::new(Vec::new());
        let decline = |message: &str| {
            asked.borrow_mut().push(message.to_owned());
            false
        };

        assert_eq!(
            UserPromotion::MakeSuperuser.request(UserId::new(3), &decline),
            None
        );
        assert_eq!(
            asked.borrow().as_slice(),
            [UserPromotion::MakeSuperuser.confirm_text()]
        );
    }

    #[test]
    fn test_confirmed_promotion_redirects() {
        assert_eq!(
            UserPromotion::MakeAdmin
                .request(UserId::new(3), &AssumeYes)
                .as_deref(),
            Some("/admin/auth/user/3/change/?make_admin=1")
        );
    }
}
