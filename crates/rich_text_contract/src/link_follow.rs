//! Following editor links out of the editable surface.
//!
//! A Ctrl/Meta click on an anchor inside the surface never navigates the page hosting the
//! editor. The reducer hands the anchor's `href` to a [`LinkFollower`], and the follower decides
//! where the destination opens.

use std::{future::Future, pin::Pin};

/// Completion of a [`LinkFollower::follow`] call; the error is a reason readable by the host.
pub type FollowFuture<'a> = Pin<Box<dyn Future<Output = Result<(), String>> + 'a>>;

/// Opens link destinations picked from the editable surface.
pub trait LinkFollower {
    /// Opens `href` in a browsing context other than the one hosting the surface.
    fn follow<'a>(&'a self, href: &'a str) -> FollowFuture<'a>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Follower for hosts without a second browsing context. Nothing is opened.
pub struct InertLinkFollower;

impl LinkFollower for InertLinkFollower {
    fn follow<'a>(&'a self, href: &'a str) -> FollowFuture<'a> {
        Box::pin(async move { Err(format!("no browsing context available to open {href}")) })
    }
}

/// Returns the destination worth following for an anchor `href`.
///
/// Blank hrefs and script URLs are never followed.
pub fn followable_href(href: &str) -> Option<&str> {
    let href = href.trim();
    let is_script = href
        .get(..11)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("javascript:"));
    (!href.is_empty() && !is_script).then_some(href)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct TabStrip {
        tabs: RefCell<Vec<String>>,
    }

    impl LinkFollower for TabStrip {
        fn follow<'a>(&'a self, href: &'a str) -> FollowFuture<'a> {
            Box::pin(async move {
                self.tabs.borrow_mut().push(href.to_string());
                Ok(())
            })
        }
    }

    #[test]
    fn followers_work_behind_trait_objects() {
        let strip = TabStrip::default();
        let follower: &dyn LinkFollower = &strip;

        block_on(follower.follow("https://docs.test/intro")).expect("follow");

        assert_eq!(strip.tabs.borrow().as_slice(), ["https://docs.test/intro"]);
    }

    #[test]
    fn inert_follower_reports_the_skipped_link() {
        let err = block_on(InertLinkFollower.follow("https://docs.test")).expect_err("inert");
        assert!(err.contains("https://docs.test"));
    }

    #[test]
    fn blank_and_script_hrefs_are_not_followable() {
        assert_eq!(followable_href("  https://docs.test "), Some("https://docs.test"));
        assert_eq!(followable_href("mailto:team@docs.test"), Some("mailto:team@docs.test"));
        assert_eq!(followable_href("   "), None);
        assert_eq!(followable_href("JavaScript:alert(1)"), None);
    }
}
