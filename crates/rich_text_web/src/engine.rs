//! Compile-time and user-agent based resolution of the editor engine profile.

use rich_text_contract::{EngineCapabilities, EngineProfile};

#[cfg(all(feature = "engine-override-gecko", feature = "engine-override-trident"))]
compile_error!(
    "features `engine-override-gecko` and `engine-override-trident` are mutually exclusive; enable only one"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How the engine profile is chosen for the active build.
pub enum EngineSelection {
    /// Detect from `navigator.userAgent` at runtime.
    Detect,
    /// Forced to a fixed profile by a cargo feature.
    Override(EngineProfile),
}

/// Returns the compile-time engine selection for the active build.
pub const fn selected_engine_selection() -> EngineSelection {
    #[cfg(feature = "engine-override-gecko")]
    {
        EngineSelection::Override(EngineProfile::Gecko)
    }

    #[cfg(feature = "engine-override-trident")]
    {
        EngineSelection::Override(EngineProfile::Trident)
    }

    #[cfg(not(any(feature = "engine-override-gecko", feature = "engine-override-trident")))]
    {
        EngineSelection::Detect
    }
}

/// Resolves the engine profile of the running browser.
///
/// Outside `wasm32` there is no user agent to inspect and [`EngineProfile::Unknown`] is returned
/// unless a feature override is active.
pub fn detect_engine() -> EngineProfile {
    match selected_engine_selection() {
        EngineSelection::Override(profile) => profile,
        EngineSelection::Detect => user_agent()
            .map(|ua| EngineProfile::detect(&ua))
            .unwrap_or(EngineProfile::Unknown),
    }
}

/// Capabilities of the running browser, resolved once per mount.
pub fn engine_capabilities() -> EngineCapabilities {
    detect_engine().capabilities()
}

fn user_agent() -> Option<String> {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window()?.navigator().user_agent().ok()
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        None
    }
}
