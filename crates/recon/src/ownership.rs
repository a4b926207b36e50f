use crate::model::{Owner, Owners, Submission};

/// Resolve the owner of every resource identity.
///
/// The owner is the email of the earliest non-deletion submission with a
/// non-empty email. Ties keep the first seen. An unparsable timestamp only
/// holds ownership until a submission with a parsable one shows up.
pub fn resolve_owners(submissions: &[Submission]) -> Owners {
    let mut owners = Owners::new();

    for sub in submissions {
        if sub.identity.is_empty() || sub.is_deletion || sub.email.is_empty() {
            continue;
        }

        let replace = match owners.get(&sub.identity) {
            None => true,
            Some(prev) => match (sub.submitted_at, prev.submitted_at) {
                (Some(ts), Some(prev_ts)) => ts < prev_ts,
                (Some(_), None) => true,
                (None, _) => false,
            },
        };

        if replace {
            owners.insert(
                sub.identity.clone(),
                Owner {
                    email: sub.email.clone(),
                    submitted_at: sub.submitted_at,
                    row: sub.row,
                },
            );
        }
    }

    log::debug!("resolved {} owner(s)", owners.len());
    owners
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sub;

    const U: &str = "https://example.org/app";

    #[test]
    fn earliest_creation_owns() {
        let subs = vec![
            sub(0, "2024-03-02 10:00:00", "b@x.org", U, ""),
            sub(1, "2024-03-01 10:00:00", "A@x.org", U, ""),
        ];
        let owners = resolve_owners(&subs);
        let owner = &owners[U];
        assert_eq!(owner.email, "a@x.org");
        assert_eq!(owner.row, 1);
    }

    #[test]
    fn ties_keep_first_seen() {
        let subs = vec![
            sub(0, "2024-03-01 10:00:00", "a@x.org", U, ""),
            sub(1, "2024-03-01 10:00:00", "b@x.org", U, ""),
        ];
        assert_eq!(resolve_owners(&subs)[U].email, "a@x.org");
    }

    #[test]
    fn deletions_and_anonymous_rows_never_own() {
        let subs = vec![
            sub(0, "2024-03-01 10:00:00", "a@x.org", U, "Sí"),
            sub(1, "2024-03-02 10:00:00", "", U, ""),
            sub(2, "2024-03-03 10:00:00", "c@x.org", "", ""),
        ];
        assert!(resolve_owners(&subs).is_empty());
    }

    #[test]
    fn identity_is_trimmed_url() {
        let subs = vec![sub(0, "2024-03-01 10:00:00", "a@x.org", "  https://example.org/app ", "")];
        let owners = resolve_owners(&subs);
        assert!(owners.contains_key(U));
    }

    #[test]
    fn unparsable_timestamp_never_wins() {
        // Unparsable incumbent is displaced by a parsable later row
        let subs = vec![
            sub(0, "garbage", "a@x.org", U, ""),
            sub(1, "2024-03-05 10:00:00", "b@x.org", U, ""),
        ];
        assert_eq!(resolve_owners(&subs)[U].email, "b@x.org");

        // Unparsable challenger never displaces
        let subs = vec![
            sub(0, "2024-03-05 10:00:00", "a@x.org", U, ""),
            sub(1, "garbage", "b@x.org", U, ""),
        ];
        assert_eq!(resolve_owners(&subs)[U].email, "a@x.org");
    }

    #[test]
    fn only_unparsable_rows_still_resolve_first() {
        let subs = vec![
            sub(0, "", "a@x.org", U, ""),
            sub(1, "", "b@x.org", U, ""),
        ];
        let owners = resolve_owners(&subs);
        assert_eq!(owners[U].email, "a@x.org");
        assert_eq!(owners[U].submitted_at, None);
    }
}
