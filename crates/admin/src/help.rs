//! Help panel for the admin user changelist.
//!
//! The admin host renders its own pages; this module decides whether a page
//! gets the help panel and splices the rendered panel in front of the
//! changelist element.

use std::borrow::Cow;

use askama::Template;
use thiserror::Error;

/// Path fragment identifying the user admin pages.
pub const USER_ADMIN_PATH: &str = "/auth/user/";

/// Marker of the changelist element in admin HTML.
pub const CHANGELIST_MARKER: &str = r#"id="changelist""#;

/// Errors from the help overlay.
#[derive(Debug, Error)]
pub enum HelpError {
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),
}

/// One titled list of steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpSection {
    pub heading: &'static str,
    pub steps: &'static [&'static str],
}

#[derive(Template)]
#[template(path = "help_overlay.html")]
struct HelpOverlayTemplate<'a> {
    title: &'a str,
    sections: &'a [HelpSection],
    note: &'a str,
}

/// Admin user management help.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpOverlay {
    pub title: &'static str,
    pub sections: Vec<HelpSection>,
    pub note: &'static str,
}

impl Default for HelpOverlay {
    fn default() -> Self {
        Self {
            title: "Admin User Management",
            sections: vec![
                HelpSection {
                    heading: "To create an admin user:",
                    steps: &[
                        "Click \"Add User\" to create a new user",
                        "Fill in username, email, and password",
                        "Check \"Staff status\" to allow admin panel access",
                        "Check \"Superuser status\" for full admin privileges (optional)",
                        "Save the user",
                    ],
                },
                HelpSection {
                    heading: "To make an existing user admin:",
                    steps: &[
                        "Find the user in the list below",
                        "Click on their username to edit",
                        "In the \"Permissions\" section, check \"Staff status\"",
                        "Optionally check \"Superuser status\" for full privileges",
                        "Save the changes",
                    ],
                },
            ],
            note: "Staff users can access admin panel and manage products. \
                   Superusers have all permissions.",
        }
    }
}

impl HelpOverlay {
    /// Whether a page gets the panel: user admin pages that show a
    /// changelist.
    #[must_use]
    pub fn should_inject(path: &str, has_changelist: bool) -> bool {
        has_changelist && path.contains(USER_ADMIN_PATH)
    }

    /// Render the panel.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self) -> Result<String, HelpError> {
        Ok(HelpOverlayTemplate {
            title: self.title,
            sections: &self.sections,
            note: self.note,
        }
        .render()?)
    }

    /// Insert the panel before the changelist element of `html`.
    ///
    /// Returns the page unchanged when it does not qualify.
    ///
    /// # Errors
    ///
    /// Returns an error if the panel fails to render.
    pub fn inject<'a>(&self, path: &str, html: &'a str) -> Result<Cow<'a, str>, HelpError> {
        let Some(marker) = html.find(CHANGELIST_MARKER) else {
            return Ok(Cow::Borrowed(html));
        };
        if !Self::should_inject(path, true) {
            return Ok(Cow::Borrowed(html));
        }

        // Start of the tag carrying the marker.
        let Some(tag_start) = html[..marker].rfind('<') else {
            return Ok(Cow::Borrowed(html));
        };

        tracing::debug!(path, "Injecting admin help panel");
        let panel = self.render()?;
        let mut out = String::with_capacity(html.len() + panel.len());
        out.push_str(&html[..tag_start]);
        out.push_str(&panel);
        out.push_str(&html[tag_start..]);
        Ok(Cow::Owned(out))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CHANGELIST_PAGE: &str =
        r#"<body><h1>Users</h1><div id="changelist" class="module"></div></body>"#;

    #[test]
    fn test_should_inject_requires_path_and_changelist() {
        assert!(HelpOverlay::should_inject("/admin/auth/user/", true));
        assert!(!HelpOverlay::should_inject("/admin/auth/user/", false));
        assert!(!HelpOverlay::should_inject("/admin/shop/product/", true));
    }

    #[test]
    fn test_render_contains_both_guides() {
        let html = HelpOverlay::default().render().unwrap();
        assert!(html.contains("Admin User Management"));
        assert!(html.contains("To create an admin user:"));
        assert!(html.contains("To make an existing user admin:"));
        assert_eq!(html.matches("<li>").count(), 10);
        assert!(html.contains("Superusers have all permissions."));
    }

    #[test]
    fn test_inject_places_panel_before_changelist() {
        let overlay = HelpOverlay::default();
        let out = overlay.inject("/admin/auth/user/", CHANGELIST_PAGE).unwrap();

        let panel = out.find("admin-help").unwrap();
        let changelist = out.find(CHANGELIST_MARKER).unwrap();
        assert!(panel < changelist);
        assert!(out.starts_with("<body><h1>Users</h1>"));
    }

    #[test]
    fn test_inject_leaves_other_pages_alone() {
        let overlay = HelpOverlay::default();
        let out = overlay
            .inject("/admin/shop/product/", CHANGELIST_PAGE)
            .unwrap();
        assert!(matches!(out, Cow::Borrowed(_)));

        let no_list = "<body><h1>Users</h1></body>";
        let out = overlay.inject("/admin/auth/user/", no_list).unwrap();
        assert_eq!(out, no_list);
    }
}
