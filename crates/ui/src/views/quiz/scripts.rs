use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;

use services::quiz::{BrowserSignal, KeyChord};

const BRIDGE_ID: &str = "{BRIDGE_ID}";

/// Listens on the whole document: visibility, key releases and clipboard or
/// context-menu actions. Clipboard defaults are suppressed here while the
/// quiz root is marked `data-guarded="true"`. Resolves after the matching stop
/// event, once its listeners are gone.
const PAGE_BRIDGE: &str = r#"
    const root = () => document.getElementById("quiz-root");
    const onVisibility = () => {
        dioxus.send({ kind: "visibility", hidden: document.visibilityState === "hidden" });
    };
    const onKeyUp = (e) => {
        const key = e.keyCode === 44 ? "PrintScreen" : e.key;
        dioxus.send({ kind: "key", key, ctrl: e.ctrlKey, shift: e.shiftKey, alt: e.altKey, meta: e.metaKey });
    };
    const onGuarded = (e) => {
        if (root()?.dataset.guarded === "true") {
            e.preventDefault();
        }
        dioxus.send({ kind: "guarded", action: e.type });
    };
    const guarded = ["copy", "cut", "paste", "contextmenu"];
    document.addEventListener("visibilitychange", onVisibility);
    document.addEventListener("keyup", onKeyUp);
    guarded.forEach((name) => document.addEventListener(name, onGuarded));
    await new Promise((resolve) => window.addEventListener("quiz-bridge-stop-{BRIDGE_ID}", resolve, { once: true }));
    document.removeEventListener("visibilitychange", onVisibility);
    document.removeEventListener("keyup", onKeyUp);
    guarded.forEach((name) => document.removeEventListener(name, onGuarded));
    return null;
"#;

const STOP_BRIDGE: &str =
    r#"window.dispatchEvent(new Event("quiz-bridge-stop-{BRIDGE_ID}"));"#;

static NEXT_BRIDGE: AtomicU64 = AtomicU64::new(1);

/// One mounted bridge; `stop_script` detaches exactly this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct PageBridge(u64);

impl PageBridge {
    pub fn next() -> Self {
        Self(NEXT_BRIDGE.fetch_add(1, Ordering::Relaxed))
    }

    pub fn script(self) -> String {
        PAGE_BRIDGE.replace(BRIDGE_ID, &self.0.to_string())
    }

    pub fn stop_script(self) -> String {
        STOP_BRIDGE.replace(BRIDGE_ID, &self.0.to_string())
    }
}

/// Message posted by the page bridge.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(super) enum BridgeMessage {
    Visibility {
        hidden: bool,
    },
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        alt: bool,
        #[serde(default)]
        meta: bool,
    },
    Guarded {
        action: String,
    },
}

impl BridgeMessage {
    pub fn into_signal(self) -> Option<BrowserSignal> {
        match self {
            BridgeMessage::Visibility { hidden: true } => Some(BrowserSignal::VisibilityHidden),
            BridgeMessage::Visibility { hidden: false } => Some(BrowserSignal::VisibilityVisible),
            BridgeMessage::Key {
                key,
                ctrl,
                shift,
                alt,
                meta,
            } => Some(BrowserSignal::KeyUp(KeyChord {
                key,
                ctrl,
                shift,
                alt,
                meta,
            })),
            BridgeMessage::Guarded { action } => match action.as_str() {
                "copy" => Some(BrowserSignal::Copy),
                "cut" => Some(BrowserSignal::Cut),
                "paste" => Some(BrowserSignal::Paste),
                "contextmenu" => Some(BrowserSignal::ContextMenu),
                _ => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(raw: &str) -> Option<BrowserSignal> {
        serde_json::from_str::<BridgeMessage>(raw)
            .unwrap()
            .into_signal()
    }

    #[test]
    fn bridge_messages_map_to_signals() {
        assert_eq!(
            decode(r#"{"kind":"visibility","hidden":true}"#),
            Some(BrowserSignal::VisibilityHidden)
        );
        assert_eq!(
            decode(r#"{"kind":"key","key":"PrintScreen","ctrl":false,"shift":false,"alt":false,"meta":false}"#),
            Some(BrowserSignal::KeyUp(KeyChord::print_screen()))
        );
        assert_eq!(
            decode(r#"{"kind":"guarded","action":"paste"}"#),
            Some(BrowserSignal::Paste)
        );
        assert_eq!(decode(r#"{"kind":"guarded","action":"drop"}"#), None);
    }

    #[test]
    fn each_bridge_listens_for_its_own_stop_event() {
        let first = PageBridge::next();
        let second = PageBridge::next();
        assert_ne!(first, second);

        let script = first.script();
        assert!(script.contains(r#"document.addEventListener("keyup", onKeyUp)"#));
        assert!(script.contains(&format!("quiz-bridge-stop-{}", first.0)));
        assert!(!script.contains(BRIDGE_ID));
        assert!(first.stop_script().contains(&format!("quiz-bridge-stop-{}\"", first.0)));
        assert!(!second.stop_script().contains(&format!("quiz-bridge-stop-{}\"", first.0)));
    }
}
