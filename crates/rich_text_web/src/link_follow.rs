//! Opens followed editor links in a new browser tab.

use rich_text_contract::{FollowFuture, LinkFollower};

#[derive(Debug, Clone, Copy, Default)]
/// Follows links into a new tab via `window.open(href, "_blank")`.
pub struct NewTabLinkFollower;

impl LinkFollower for NewTabLinkFollower {
    fn follow<'a>(&'a self, href: &'a str) -> FollowFuture<'a> {
        Box::pin(async move { open_tab(href) })
    }
}

#[cfg(target_arch = "wasm32")]
fn open_tab(href: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or_else(|| "window unavailable".to_string())?;
    match window.open_with_url_and_target(href, "_blank") {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(format!("popup blocked for {href}")),
        Err(err) => Err(format!("window.open failed: {err:?}")),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn open_tab(href: &str) -> Result<(), String> {
    Err(format!("cannot open {href}: new tabs need a wasm32 browser build"))
}
