//! Lifecycle transition table
//!
//! The table is exhaustive and explicit: every (from, to) pair is either a
//! defined transition, a duplicate delivery, or rejected. Undefined pairs
//! are never applied silently — the caller logs them loudly.
//!
//! `timeout` is reachable only from `draft` and only through the reaper's
//! guarded update; gateway results never target it, so the table rejects it.

use shared::models::AttendeeStatus;

/// What a requested status change amounts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Defined transition: apply and fire side effects
    Transition,
    /// Same status again: persist metadata, no side effects
    Duplicate,
    /// Undefined transition: reject, log, leave state unchanged
    Rejected,
}

/// Decide what applying `to` on a group currently in `from` means
pub fn decide(from: AttendeeStatus, to: AttendeeStatus) -> Decision {
    use AttendeeStatus::*;

    if from == to {
        return Decision::Duplicate;
    }

    match (from, to) {
        (Draft, Pending | Publish | Cancel | Failed) => Decision::Transition,
        (Pending, Publish | Failed) => Decision::Transition,
        (Publish, Refund) => Decision::Transition,
        _ => Decision::Rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::AttendeeStatus::*;

    const ALL: [AttendeeStatus; 7] = [Draft, Pending, Publish, Cancel, Failed, Refund, Timeout];

    #[test]
    fn test_draft_transitions() {
        assert_eq!(decide(Draft, Pending), Decision::Transition);
        assert_eq!(decide(Draft, Publish), Decision::Transition);
        assert_eq!(decide(Draft, Cancel), Decision::Transition);
        assert_eq!(decide(Draft, Failed), Decision::Transition);
        // the reaper bypasses the table with a guarded update
        assert_eq!(decide(Draft, Timeout), Decision::Rejected);
    }

    #[test]
    fn test_pending_transitions() {
        assert_eq!(decide(Pending, Publish), Decision::Transition);
        assert_eq!(decide(Pending, Failed), Decision::Transition);
        assert_eq!(decide(Pending, Cancel), Decision::Rejected);
        assert_eq!(decide(Pending, Refund), Decision::Rejected);
    }

    #[test]
    fn test_publish_only_refunds() {
        assert_eq!(decide(Publish, Refund), Decision::Transition);
        // a late failure notice after success must arrive as a refund
        assert_eq!(decide(Publish, Failed), Decision::Rejected);
        assert_eq!(decide(Publish, Cancel), Decision::Rejected);
        assert_eq!(decide(Publish, Pending), Decision::Rejected);
        assert_eq!(decide(Publish, Draft), Decision::Rejected);
    }

    #[test]
    fn test_terminal_states_accept_nothing() {
        for terminal in [Cancel, Failed, Refund, Timeout] {
            for to in ALL {
                let expected = if to == terminal {
                    Decision::Duplicate
                } else {
                    Decision::Rejected
                };
                assert_eq!(decide(terminal, to), expected, "{:?} -> {:?}", terminal, to);
            }
        }
    }

    #[test]
    fn test_same_status_is_duplicate() {
        for status in ALL {
            assert_eq!(decide(status, status), Decision::Duplicate);
        }
    }
}
