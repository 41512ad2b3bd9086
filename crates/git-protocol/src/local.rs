//! Direct local-peer access.
//!
//! For a local filesystem path or `file://` URL the remote is just another
//! repository on the same machine: there is no wire protocol to speak, the
//! core opens the peer's object database and ref store directly and copies
//! what it needs. This is the "Local" transport described for fetch/clone/
//! push: no negotiation, no packfile framing, object-by-object copy walked
//! recursively over tree and commit references.

use std::collections::HashSet;
use std::path::Path;

use bstr::BString;
use git_hash::ObjectId;
use git_object::Object;
use git_odb::ObjectDatabase;
use git_ref::{RefName, RefStore, RefTransaction};
use git_repository::Repository;

use crate::ProtocolError;

/// A repository opened purely for direct, local-to-local object/ref access.
pub struct LocalPeer {
    repo: Repository,
}

impl LocalPeer {
    /// Open the peer repository at `path`.
    pub fn open(path: &Path) -> Result<Self, ProtocolError> {
        let repo = Repository::open(path)?;
        Ok(Self { repo })
    }

    /// List every ref visible in the peer (including `HEAD`), resolved to
    /// its target OID. Mirrors the advertisement a smart-protocol server
    /// would send.
    pub fn list_refs(&self) -> Result<Vec<(ObjectId, BString)>, ProtocolError> {
        let mut refs = Vec::new();

        if let Some(oid) = self.repo.head_oid()? {
            refs.push((oid, BString::from("HEAD")));
        }

        for r in self.repo.refs().iter(None)?.flatten() {
            if let Some(oid) = r.target_oid() {
                refs.push((oid, BString::from(r.name().as_str())));
            }
        }

        Ok(refs)
    }

    /// The peer's object database, for direct reads.
    pub fn odb(&self) -> &ObjectDatabase {
        self.repo.odb()
    }

    /// The underlying repository handle.
    pub fn repo(&self) -> &Repository {
        &self.repo
    }
}

/// Copy every object reachable from `roots` in `src` into `dest`.
///
/// Recursion stops the moment an object is already present in `dest` — this
/// both bounds the walk to the fetch/push frontier and gives fetch/push
/// idempotence: running the same transfer twice with no new history on the
/// source side copies nothing the second time.
pub fn copy_reachable(
    dest: &ObjectDatabase,
    src: &ObjectDatabase,
    roots: impl IntoIterator<Item = ObjectId>,
) -> Result<Vec<ObjectId>, ProtocolError> {
    let mut seen = HashSet::new();
    let mut stack: Vec<ObjectId> = roots.into_iter().collect();
    let mut copied = Vec::new();

    while let Some(oid) = stack.pop() {
        if !seen.insert(oid) {
            continue;
        }
        if dest.contains(&oid) {
            continue;
        }

        let obj = src
            .read(&oid)?
            .ok_or(ProtocolError::MissingObject(oid))?;

        match &obj {
            Object::Commit(c) => {
                stack.push(c.tree);
                stack.extend(c.parents.iter().copied());
            }
            Object::Tree(t) => {
                for entry in t.iter() {
                    stack.push(entry.oid);
                }
            }
            Object::Tag(t) => {
                stack.push(t.target);
            }
            Object::Blob(_) => {}
        }

        dest.write(&obj)?;
        copied.push(oid);
    }

    Ok(copied)
}

/// A single ref update to apply to a local peer.
#[derive(Debug, Clone)]
pub struct PushUpdate {
    /// Ref to update on the peer.
    pub name: RefName,
    /// New target. `None` deletes the ref.
    pub new_oid: Option<ObjectId>,
    /// Skip the fast-forward check.
    pub force: bool,
    /// For `--force-with-lease`: the OID the caller last observed on the
    /// peer. If the peer's current value differs, the update is rejected
    /// before anything is touched.
    pub expected_old_oid: Option<ObjectId>,
}

/// Outcome of a single ref update against a local peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// Ref did not exist on the peer and was created.
    New,
    /// Ref existed and was fast-forwarded.
    FastForward,
    /// Ref was force-updated (non-fast-forward).
    Forced,
    /// Ref was deleted.
    Deleted,
    /// Update was refused; holds a human-readable reason.
    Rejected(String),
}

/// Result of a single ref update within [`push_local`].
#[derive(Debug, Clone)]
pub struct PushRefResult {
    pub name: RefName,
    pub outcome: PushOutcome,
}

/// Push ref updates to a local peer.
///
/// For each update this copies every object reachable from the new OID into
/// the peer's object database (skipping what the peer already has, same as
/// [`copy_reachable`]) and then applies the ref update as a CAS transaction
/// against the peer's ref store: the update is rejected if the peer's ref
/// moved since `expected_old_oid` was observed, and rejected as
/// non-fast-forward unless the new tip descends from the peer's current tip
/// or `force` is set.
pub fn push_local(
    repo: &Repository,
    peer: &LocalPeer,
    updates: &[PushUpdate],
) -> Result<Vec<PushRefResult>, ProtocolError> {
    let mut results = Vec::with_capacity(updates.len());

    for update in updates {
        let current = peer.repo().refs().resolve_to_oid(&update.name)?;

        if let Some(expected) = update.expected_old_oid {
            if current != Some(expected) {
                results.push(PushRefResult {
                    name: update.name.clone(),
                    outcome: PushOutcome::Rejected(format!(
                        "stale info: expected {} but peer has {}",
                        expected,
                        current
                            .map(|o| o.to_hex())
                            .unwrap_or_else(|| "(none)".to_string())
                    )),
                });
                continue;
            }
        }

        let outcome = match update.new_oid {
            None => match current {
                Some(old) => {
                    let mut tx = RefTransaction::new();
                    tx.delete(update.name.clone(), old, "push: delete");
                    peer.repo().refs().commit_transaction(tx)?;
                    PushOutcome::Deleted
                }
                None => PushOutcome::Rejected("remote ref does not exist".into()),
            },
            Some(new_oid) => {
                copy_reachable(peer.odb(), repo.odb(), [new_oid])?;

                match current {
                    None => {
                        let mut tx = RefTransaction::new();
                        tx.create(update.name.clone(), new_oid, "push: created");
                        peer.repo().refs().commit_transaction(tx)?;
                        PushOutcome::New
                    }
                    Some(old) if old == new_oid => PushOutcome::FastForward,
                    Some(old) => {
                        let is_ff = git_revwalk::is_ancestor(peer.repo(), &old, &new_oid)?;
                        if !is_ff && !update.force {
                            PushOutcome::Rejected(
                                "non-fast-forward (fetch first or use --force)".into(),
                            )
                        } else {
                            let mut tx = RefTransaction::new();
                            tx.update(update.name.clone(), old, new_oid, "push: updated");
                            peer.repo().refs().commit_transaction(tx)?;
                            if is_ff {
                                PushOutcome::FastForward
                            } else {
                                PushOutcome::Forced
                            }
                        }
                    }
                }
            }
        };

        results.push(PushRefResult {
            name: update.name.clone(),
            outcome,
        });
    }

    Ok(results)
}
