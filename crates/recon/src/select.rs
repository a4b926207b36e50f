use std::collections::HashMap;

use crate::model::{
    DeletionCutoffs, Owners, RejectReason, Rejection, ReconciledResource, Submission,
};
use crate::normalize::is_absolute_url;

/// Check one submission against the publication gates, in order.
fn admit(sub: &Submission, owners: &Owners, cutoffs: &DeletionCutoffs) -> Result<(), RejectReason> {
    if sub.identity.is_empty() {
        return Err(RejectReason::MissingUrl);
    }
    if sub.is_deletion {
        return Err(RejectReason::DeletionRequest);
    }
    let owner = owners.get(&sub.identity).ok_or(RejectReason::NoOwner)?;
    if sub.email.is_empty() || sub.email != owner.email {
        return Err(RejectReason::NotOwner);
    }
    // Undated versions take no part in the cutoff comparison
    if let (Some(cut), Some(ts)) = (cutoffs.get(&sub.identity), sub.submitted_at) {
        if ts <= *cut {
            return Err(RejectReason::Tombstoned);
        }
    }
    if let Some(field) = sub.record.missing_required() {
        return Err(RejectReason::MissingRequiredField { field });
    }
    if !is_absolute_url(&sub.record.url_app) {
        return Err(RejectReason::InvalidUrl);
    }
    Ok(())
}

/// Pick the current version of every resource.
///
/// Among the submissions that pass every gate, the one with the greatest
/// row index wins for its identity (last submitted, not latest timestamp).
/// Winners are returned newest row first; every other submission gets a
/// [`Rejection`], in row order.
pub fn select_versions(
    submissions: &[Submission],
    owners: &Owners,
    cutoffs: &DeletionCutoffs,
) -> (Vec<ReconciledResource>, Vec<Rejection>) {
    let mut rejections = Vec::new();
    let mut admitted = Vec::new();
    let mut winner: HashMap<&str, usize> = HashMap::new();

    for (idx, sub) in submissions.iter().enumerate() {
        match admit(sub, owners, cutoffs) {
            Ok(()) => {
                admitted.push(idx);
                let slot = winner.entry(sub.identity.as_str()).or_insert(idx);
                if idx > *slot {
                    *slot = idx;
                }
            }
            Err(reason) => {
                log::trace!("row {}: rejected ({reason})", sub.row);
                rejections.push((idx, reason));
            }
        }
    }

    for idx in admitted {
        if winner.get(submissions[idx].identity.as_str()) != Some(&idx) {
            rejections.push((idx, RejectReason::Superseded));
        }
    }
    rejections.sort_by_key(|(idx, _)| *idx);

    let mut winners: Vec<usize> = winner.into_values().collect();
    winners.sort_unstable_by(|a, b| b.cmp(a));

    let resources = winners
        .into_iter()
        .map(|idx| {
            let sub = &submissions[idx];
            ReconciledResource {
                key: sub.identity.clone(),
                source_row: sub.row,
                record: sub.record.clone(),
            }
        })
        .collect();

    let rejections = rejections
        .into_iter()
        .map(|(idx, reason)| Rejection {
            row: submissions[idx].row,
            url: submissions[idx].identity.clone(),
            reason,
        })
        .collect();

    (resources, rejections)
}
