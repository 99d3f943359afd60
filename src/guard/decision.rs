//! Push classification rule.

use std::time::Duration;

use crate::bus::PushDecision;
use crate::location::UrlKey;

/// Everything the guard knows when a push request arrives.
#[derive(Debug, Clone, Copy)]
pub struct PushCheck<'a> {
    pub displayed: &'a UrlKey,
    pub requested: &'a UrlKey,
    pub last_pushed: Option<(&'a UrlKey, Duration)>,
    pub now: Duration,
    pub rapid_window: Duration,
    pub enabled: bool,
}

/// Decide how to carry out a push.
///
/// Only an identical URL requested again within the rapid window is
/// coalesced. Anything else goes through as a real push.
pub fn classify_push(check: PushCheck<'_>) -> PushDecision {
    if check.requested != check.displayed {
        return PushDecision::Allowed;
    }

    if !check.enabled {
        return PushDecision::AllowedSameUrl;
    }

    let rapid = match check.last_pushed {
        Some((key, at)) => {
            key == check.requested && check.now.saturating_sub(at) < check.rapid_window
        }
        None => false,
    };

    if rapid {
        PushDecision::Coalesced
    } else {
        PushDecision::AllowedSameUrl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;

    fn key(path: &str) -> UrlKey {
        Location::parse(path).key()
    }

    fn check<'a>(
        displayed: &'a UrlKey,
        requested: &'a UrlKey,
        last: Option<(&'a UrlKey, Duration)>,
        now_ms: u64,
    ) -> PushCheck<'a> {
        PushCheck {
            displayed,
            requested,
            last_pushed: last,
            now: Duration::from_millis(now_ms),
            rapid_window: Duration::from_millis(30),
            enabled: true,
        }
    }

    #[test]
    fn different_url_always_allowed() {
        let home = key("/home");
        let browse = key("/browse");
        let last = Some((&browse, Duration::ZERO));
        let decision = classify_push(check(&home, &browse, last, 1));
        assert_eq!(decision, PushDecision::Allowed);
    }

    #[test]
    fn same_url_rapid_is_coalesced() {
        let home = key("/home");
        let last = Some((&home, Duration::from_millis(5)));
        let decision = classify_push(check(&home, &home, last, 10));
        assert_eq!(decision, PushDecision::Coalesced);
    }

    #[test]
    fn same_url_slow_is_allowed() {
        let home = key("/home");
        let last = Some((&home, Duration::ZERO));
        let decision = classify_push(check(&home, &home, last, 30));
        assert_eq!(decision, PushDecision::AllowedSameUrl);
    }

    #[test]
    fn same_url_first_request_is_allowed() {
        let home = key("/home");
        assert_eq!(
            classify_push(check(&home, &home, None, 0)),
            PushDecision::AllowedSameUrl
        );
    }

    #[test]
    fn rapid_window_is_per_key() {
        let home = key("/home");
        let other = key("/other");
        let last = Some((&other, Duration::from_millis(9)));
        let decision = classify_push(check(&home, &home, last, 10));
        assert_eq!(decision, PushDecision::AllowedSameUrl);
    }

    #[test]
    fn disabled_guard_allows_everything() {
        let home = key("/home");
        let mut c = check(&home, &home, Some((&home, Duration::from_millis(9))), 10);
        c.enabled = false;
        assert!(classify_push(c).creates_entry());
    }
}
