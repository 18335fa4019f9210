//! Session selection: which pending session a branch places next.

use rand::rngs::StdRng;
use rand::Rng;

use horarium_core::{Availability, Session};

use crate::assigner::Placement;
use crate::catalog::{Bucket, BucketKind, SessionBuckets};

/// Picks and removes the next session from the active bucket.
///
/// Preference order inside the bucket:
///
/// 1. another session of the previously placed subject, when that
///    subject is vocational, so contiguous runs are built immediately
/// 2. in the conciliation bucket, sessions of teachers who leave early
/// 3. in the elective bucket, a sibling of the previous placement's
///    block that has not joined its cell yet
/// 4. otherwise a uniformly random session
///
/// Returns `None` only when every bucket is empty.
pub fn select_next(
    buckets: &mut SessionBuckets,
    last: Option<&Placement>,
    rng: &mut StdRng,
) -> Option<Session> {
    let index = {
        let bucket = buckets.active()?;
        pick_index(bucket, last, rng)
    };
    buckets.take_active(index)
}

fn pick_index(bucket: &Bucket, last: Option<&Placement>, rng: &mut StdRng) -> usize {
    let sessions = bucket.sessions();

    if let Some(placement) = last {
        if let Some(previous) = placement.session.subject() {
            if previous.is_vocational() {
                if let Some(index) = sessions
                    .iter()
                    .position(|session| session.subject() == Some(previous))
                {
                    return index;
                }
            }
        }
    }

    if bucket.kind() == BucketKind::Conciliation {
        if let Some(index) = sessions.iter().position(|session| {
            session.teacher().availability() == Some(Availability::LeavesBeforeFifth)
        }) {
            return index;
        }
    }

    if bucket.kind() == BucketKind::Elective {
        if let Some(placement) = last {
            if let Some(block) = placement.session.elective_block() {
                let sibling = sessions.iter().position(|session| match session.subject() {
                    Some(subject) => {
                        subject.in_block(block) && !placement.cell.contains_subject(subject)
                    }
                    None => false,
                });
                if let Some(index) = sibling {
                    return index;
                }
            }
        }
    }

    rng.random_range(0..sessions.len())
}
