//! Browser-engine profiles and the capability descriptor derived from them.
//!
//! The descriptor is resolved once per environment and consulted by the editor to pick its
//! selection-classification and link-insertion strategies.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Rendering engine family hosting the editable surface.
pub enum EngineProfile {
    /// Chromium-based engines.
    Blink,
    /// Safari and other WebKit builds.
    WebKit,
    /// Firefox.
    Gecko,
    /// Legacy (pre-Chromium) Edge.
    EdgeHtml,
    /// Internet Explorer.
    Trident,
    /// Anything the detector does not recognize.
    Unknown,
}

impl EngineProfile {
    /// Detects the engine family from a user-agent string.
    pub fn detect(user_agent: &str) -> Self {
        if user_agent.contains("Trident/") || user_agent.contains("MSIE ") {
            Self::Trident
        } else if user_agent.contains("Edge/") {
            Self::EdgeHtml
        } else if user_agent.contains("Firefox/") {
            Self::Gecko
        } else if user_agent.contains("Chrome/")
            || user_agent.contains("Chromium/")
            || user_agent.contains("Edg/")
        {
            Self::Blink
        } else if user_agent.contains("AppleWebKit/") {
            Self::WebKit
        } else {
            Self::Unknown
        }
    }

    /// Returns a stable string token for the profile.
    pub fn token(self) -> &'static str {
        match self {
            Self::Blink => "blink",
            Self::WebKit => "webkit",
            Self::Gecko => "gecko",
            Self::EdgeHtml => "edgehtml",
            Self::Trident => "trident",
            Self::Unknown => "unknown",
        }
    }

    /// Returns the capability descriptor for the profile.
    pub fn capabilities(self) -> EngineCapabilities {
        EngineCapabilities::for_engine(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Fallback heuristics enabled for selection classification.
pub struct SelectionStrategy {
    /// Check the anchor node's first child and the focus node itself for an anchor element.
    pub probe_anchor_children: bool,
    /// Match the selection text against the text of every anchor as a last resort.
    pub text_match_fallback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// How new link markup reaches the document.
pub enum LinkInsertion {
    /// Hand an HTML fragment to the native `insertHTML` command.
    InsertHtml {
        /// Surround new links with `&nbsp;` so the caret does not stay trapped inside.
        pad_with_nbsp: bool,
    },
    /// Build the anchor node directly and insert it at the selection range.
    DirectNode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Capability descriptor resolved once per environment.
pub struct EngineCapabilities {
    /// Engine the descriptor was resolved for.
    pub engine: EngineProfile,
    /// Selection-classification strategy.
    pub selection: SelectionStrategy,
    /// Link-insertion strategy.
    pub link_insertion: LinkInsertion,
    /// Whether `queryCommandValue("ForeColor")` reports `rgb(...)` strings.
    pub reports_rgb_fore_color: bool,
}

impl EngineCapabilities {
    /// Resolves the descriptor for `engine`.
    pub const fn for_engine(engine: EngineProfile) -> Self {
        match engine {
            EngineProfile::Gecko => Self {
                engine,
                selection: SelectionStrategy {
                    probe_anchor_children: true,
                    text_match_fallback: true,
                },
                link_insertion: LinkInsertion::InsertHtml {
                    pad_with_nbsp: true,
                },
                reports_rgb_fore_color: true,
            },
            EngineProfile::EdgeHtml => Self {
                engine,
                selection: SelectionStrategy {
                    probe_anchor_children: true,
                    text_match_fallback: true,
                },
                link_insertion: LinkInsertion::InsertHtml {
                    pad_with_nbsp: false,
                },
                reports_rgb_fore_color: true,
            },
            EngineProfile::Trident => Self {
                engine,
                selection: SelectionStrategy {
                    probe_anchor_children: true,
                    text_match_fallback: true,
                },
                link_insertion: LinkInsertion::DirectNode,
                reports_rgb_fore_color: false,
            },
            EngineProfile::Blink | EngineProfile::WebKit | EngineProfile::Unknown => Self {
                engine,
                selection: SelectionStrategy {
                    probe_anchor_children: false,
                    text_match_fallback: false,
                },
                link_insertion: LinkInsertion::InsertHtml {
                    pad_with_nbsp: false,
                },
                reports_rgb_fore_color: true,
            },
        }
    }
}

impl Default for EngineCapabilities {
    fn default() -> Self {
        Self::for_engine(EngineProfile::Unknown)
    }
}
