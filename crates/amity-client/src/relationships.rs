//! Friend relationship derivation.
//!
//! Relationships are stored as directed assertions `author -> target`
//! (see [`FriendValue`]). An edge is *live* when its author has a `friend`
//! record for the target and no `friend_cancel` record for it; cancellation
//! sticks until the author removes it by requesting again. Mutual friendship
//! is two live edges in opposite directions.
//!
//! Derivation is a pure function of the record set, so the order records
//! arrive in from discovery never matters.

use std::collections::{BTreeSet, HashSet};

use amity_shared::{Actor, FriendActivity, FriendValue, Record, StoredObject};
use serde::Serialize;
use tracing::debug;

/// A discovered relationship object together with its decoded value.
#[derive(Debug, Clone, PartialEq)]
pub struct FriendRecord {
    pub object: StoredObject,
    pub activity: FriendActivity,
    pub target: Actor,
}

impl FriendRecord {
    /// Decode a discovered object, or `None` when its value is malformed.
    pub fn parse(object: StoredObject) -> Option<Self> {
        match FriendValue::from_value(&object.value) {
            Ok(value) => Some(Self {
                activity: value.activity,
                target: value.target,
                object,
            }),
            Err(e) => {
                debug!(url = %object.url, error = %e, "skipping malformed friend record");
                None
            }
        }
    }

    pub fn author(&self) -> &Actor {
        &self.object.actor
    }

    pub fn is(&self, author: &Actor, target: &Actor, activity: FriendActivity) -> bool {
        self.author() == author && self.target == *target && self.activity == activity
    }
}

/// The three disjoint peer lists shown to the current actor, each sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FriendViews {
    pub accepted: Vec<Actor>,
    pub incoming: Vec<Actor>,
    pub outgoing: Vec<Actor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
    Mutual,
    Incoming,
    Outgoing,
    None,
}

impl FriendViews {
    pub fn relationship_with(&self, peer: &Actor) -> Relationship {
        if self.accepted.contains(peer) {
            Relationship::Mutual
        } else if self.incoming.contains(peer) {
            Relationship::Incoming
        } else if self.outgoing.contains(peer) {
            Relationship::Outgoing
        } else {
            Relationship::None
        }
    }
}

struct Edges<'a> {
    friend: HashSet<(&'a Actor, &'a Actor)>,
    cancel: HashSet<(&'a Actor, &'a Actor)>,
}

impl<'a> Edges<'a> {
    fn collect(records: &'a [FriendRecord]) -> Self {
        let mut edges = Edges {
            friend: HashSet::new(),
            cancel: HashSet::new(),
        };
        for r in records {
            let pair = (r.author(), &r.target);
            match r.activity {
                FriendActivity::Friend => edges.friend.insert(pair),
                FriendActivity::FriendCancel => edges.cancel.insert(pair),
            };
        }
        edges
    }

    fn is_live(&self, from: &'a Actor, to: &'a Actor) -> bool {
        self.friend.contains(&(from, to)) && !self.cancel.contains(&(from, to))
    }
}

/// Whether `author` currently asserts a live edge towards `target`.
pub fn is_live_edge(records: &[FriendRecord], author: &Actor, target: &Actor) -> bool {
    Edges::collect(records).is_live(author, target)
}

/// Derive the accepted / incoming / outgoing views for `me`.
///
/// Records that involve neither side as `me` are ignored. Without an actor
/// every view is empty.
pub fn derive_views(me: Option<&Actor>, records: &[FriendRecord]) -> FriendViews {
    let Some(me) = me else {
        return FriendViews::default();
    };

    let edges = Edges::collect(records);

    let mut live_out = BTreeSet::new();
    let mut cancelled = BTreeSet::new();
    let mut live_in = BTreeSet::new();

    for r in records {
        if r.author() == me && r.target != *me {
            match r.activity {
                FriendActivity::Friend if edges.is_live(me, &r.target) => {
                    live_out.insert(&r.target);
                }
                FriendActivity::FriendCancel => {
                    cancelled.insert(&r.target);
                }
                FriendActivity::Friend => {}
            }
        } else if r.target == *me
            && r.author() != me
            && r.activity == FriendActivity::Friend
            && edges.is_live(r.author(), me)
        {
            live_in.insert(r.author());
        }
    }

    let accepted = live_out.intersection(&live_in).map(|a| (*a).clone()).collect();
    let incoming = live_in
        .iter()
        .filter(|a| !live_out.contains(*a) && !cancelled.contains(*a))
        .map(|a| (*a).clone())
        .collect();
    let outgoing = live_out.difference(&live_in).map(|a| (*a).clone()).collect();

    FriendViews {
        accepted,
        incoming,
        outgoing,
    }
}
