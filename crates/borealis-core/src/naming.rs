//! Attribute-name classification and event-name resolution.
//!
//! Binding declarations made by name follow a fixed convention:
//!
//! | attribute name   | binding                                   |
//! |------------------|-------------------------------------------|
//! | `on_<event>`     | native event `<event>` (hyphenated)       |
//! | `interval_<N>`   | repeating timer every `N` milliseconds    |
//! | `oneshot_<N>`    | single timer firing after `N` milliseconds |
//! | anything else    | candidate for a service prefix match      |
//!
//! Event names on a widget's surface are lowercase with `-` between words.
//! Service-qualified events are `"<service-prefix>-<signal>"`.

use crate::annotation::{RESERVED_SEPARATOR, SEGMENT_SEPARATOR};

const SIGNAL_PREFIX: &str = "on_";
const INTERVAL_PREFIX: &str = "interval_";
const ONESHOT_PREFIX: &str = "oneshot_";

/// Normalize a raw name to the event surface's form: lowercase, words
/// separated by `-`.
pub fn event_name(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c == RESERVED_SEPARATOR {
                SEGMENT_SEPARATOR
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

/// How an attribute name classifies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrClass {
    /// `on_<event>`: a binding on the widget's own event surface.
    Signal(String),
    /// `interval_<N>`: a repeating timer.
    Interval(u64),
    /// `oneshot_<N>`: a single-fire timer.
    Oneshot(u64),
    /// A reserved prefix with an unusable remainder.
    Malformed {
        /// The reserved prefix that matched.
        prefix: &'static str,
        /// What followed it.
        remainder: String,
    },
    /// Not reserved; the hyphenated name is matched against service
    /// prefixes once the widget is mounted.
    Candidate(String),
}

/// Classify a declared attribute name.
pub fn classify(name: &str) -> AttrClass {
    if let Some(rest) = name.strip_prefix(SIGNAL_PREFIX) {
        if rest.is_empty() {
            return AttrClass::Malformed {
                prefix: SIGNAL_PREFIX,
                remainder: String::new(),
            };
        }
        return AttrClass::Signal(event_name(rest));
    }
    if let Some(rest) = name.strip_prefix(INTERVAL_PREFIX) {
        return match rest.parse() {
            Ok(ms) => AttrClass::Interval(ms),
            Err(_) => AttrClass::Malformed {
                prefix: INTERVAL_PREFIX,
                remainder: rest.to_string(),
            },
        };
    }
    if let Some(rest) = name.strip_prefix(ONESHOT_PREFIX) {
        return match rest.parse() {
            Ok(ms) => AttrClass::Oneshot(ms),
            Err(_) => AttrClass::Malformed {
                prefix: ONESHOT_PREFIX,
                remainder: rest.to_string(),
            },
        };
    }
    AttrClass::Candidate(event_name(name))
}

/// Order prefixes so the most specific is tried first.
///
/// Longer prefixes come first; ties are broken alphabetically so the order
/// is deterministic.
pub fn sort_prefixes(prefixes: &mut [String]) {
    prefixes.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
}

/// Match a hyphenated attribute name against service prefixes.
///
/// Returns the matching prefix and the remaining signal name. A prefix
/// matches only at a segment boundary and only when a non-empty signal name
/// follows it. The longest matching prefix wins, so `"hyprland-on-v2"` is
/// preferred over `"hyprland-on"` for `"hyprland-on-v2-workspace"`.
pub fn match_service_prefix<'p>(attr: &str, prefixes: &'p [String]) -> Option<(&'p str, String)> {
    let attr = event_name(attr);
    let mut candidates: Vec<&'p String> = prefixes.iter().collect();
    candidates.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    candidates.into_iter().find_map(|prefix| {
        let rest = attr.strip_prefix(prefix.as_str())?;
        let signal = rest.strip_prefix(SEGMENT_SEPARATOR)?;
        (!signal.is_empty()).then(|| (prefix.as_str(), signal.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_name() {
        assert_eq!(event_name("button_press_event"), "button-press-event");
        assert_eq!(event_name("Clicked"), "clicked");
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("on_clicked"), AttrClass::Signal("clicked".into()));
        assert_eq!(
            classify("on_state_flags_changed"),
            AttrClass::Signal("state-flags-changed".into())
        );
        assert_eq!(classify("interval_100"), AttrClass::Interval(100));
        assert_eq!(classify("oneshot_0"), AttrClass::Oneshot(0));
        assert!(matches!(classify("interval_fast"), AttrClass::Malformed { .. }));
        assert!(matches!(classify("oneshot_-5"), AttrClass::Malformed { .. }));
        assert!(matches!(classify("on_"), AttrClass::Malformed { .. }));
        assert_eq!(
            classify("hyprland_on_workspace"),
            AttrClass::Candidate("hyprland-on-workspace".into())
        );
    }

    #[test]
    fn test_longest_prefix_wins() {
        let prefixes = vec!["hyprland-on".to_string(), "hyprland-on-v2".to_string()];
        assert_eq!(
            match_service_prefix("hyprland-on-v2-workspace", &prefixes),
            Some(("hyprland-on-v2", "workspace".to_string()))
        );
        assert_eq!(
            match_service_prefix("hyprland-on-workspace", &prefixes),
            Some(("hyprland-on", "workspace".to_string()))
        );
    }

    #[test]
    fn test_prefix_requires_segment_boundary() {
        let prefixes = vec!["hyprland-on".to_string()];
        assert_eq!(match_service_prefix("hyprland-only-thing", &prefixes), None);
        assert_eq!(match_service_prefix("hyprland-on", &prefixes), None);
        assert_eq!(match_service_prefix("label", &prefixes), None);
    }

    #[test]
    fn test_sort_prefixes() {
        let mut prefixes = vec!["a".to_string(), "ccc".to_string(), "bb".to_string(), "ab".to_string()];
        sort_prefixes(&mut prefixes);
        assert_eq!(prefixes, ["ccc", "ab", "bb", "a"]);
    }
}
