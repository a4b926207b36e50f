use crate::model::{DeletionCutoffs, Owners, Submission};

/// Latest owner-verified deletion timestamp per resource identity.
///
/// Deletion requests for resources without an owner, or from any email
/// other than the owner's, are ignored. Unparsable timestamps never set a
/// cutoff.
pub fn deletion_cutoffs(submissions: &[Submission], owners: &Owners) -> DeletionCutoffs {
    let mut cutoffs = DeletionCutoffs::new();

    for sub in submissions {
        if !sub.is_deletion || sub.identity.is_empty() {
            continue;
        }
        let Some(owner) = owners.get(&sub.identity) else {
            log::trace!("row {}: deletion for unowned '{}' ignored", sub.row, sub.identity);
            continue;
        };
        if sub.email.is_empty() || sub.email != owner.email {
            log::trace!("row {}: deletion for '{}' not from owner", sub.row, sub.identity);
            continue;
        }
        let Some(ts) = sub.submitted_at else {
            continue;
        };

        cutoffs
            .entry(sub.identity.clone())
            .and_modify(|cut| {
                if ts > *cut {
                    *cut = ts;
                }
            })
            .or_insert(ts);
    }

    log::debug!("{} deletion cutoff(s)", cutoffs.len());
    cutoffs
}
