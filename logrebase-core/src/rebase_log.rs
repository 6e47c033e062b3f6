//! Building an interactive rebase pick list from the commit graph alone,
//! without asking git for the log of the range.
//!
//! The walk starts at the head commit and follows first parents down to the
//! target. Anything that can't be written as a plain list of picks (merges,
//! roots, autosquash commits) makes the whole attempt fail with a
//! [`RebaseLogError`], and the caller is expected to fall back to planning
//! through git itself.

use crate::cancel::{CancellationSignal, Cancelled};
use crate::config::{ResolverConfig, RootPolicy};
use crate::entry::{GeneratedEntry, RebaseEntry};
use crate::metadata::{CommitMetadata, MetadataError, MetadataLookup};
use graph::{CommitId, DfsWalk, GraphTraversal};
use std::fmt;
use std::ops::ControlFlow;
use tracing::debug;

/// Why the commit graph could not be used to plan the rebase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    UnresolvedHead,
    Merge,
    UnexpectedHash,
    UnresolvedHash,
    FixupSquash,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Reason::UnresolvedHead => "UNRESOLVED_HEAD",
            Reason::Merge => "MERGE",
            Reason::UnexpectedHash => "UNEXPECTED_HASH",
            Reason::UnresolvedHash => "UNRESOLVED_HASH",
            Reason::FixupSquash => "FIXUP_SQUASH",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RebaseLogError {
    #[error("head reference {head:?} is not in the commit graph")]
    UnresolvedHead { head: String },

    #[error("commit {commit} has {parents} parents")]
    Merge { commit: CommitId, parents: usize },

    #[error("walk ended at {found:?} instead of {expected}")]
    UnexpectedHash {
        expected: CommitId,
        found: Option<CommitId>,
    },

    #[error("couldn't load commit details: {source}")]
    UnresolvedHash {
        #[source]
        source: MetadataError,
    },

    #[error("commit {commit} is an autosquash commit: {subject:?}")]
    FixupSquash { commit: CommitId, subject: String },
}

impl RebaseLogError {
    pub fn reason(&self) -> Reason {
        match self {
            RebaseLogError::UnresolvedHead { .. } => Reason::UnresolvedHead,
            RebaseLogError::Merge { .. } => Reason::Merge,
            RebaseLogError::UnexpectedHash { .. } => Reason::UnexpectedHash,
            RebaseLogError::UnresolvedHash { .. } => Reason::UnresolvedHash,
            RebaseLogError::FixupSquash { .. } => Reason::FixupSquash,
        }
    }
}

/// Outcome of a failed [`LinearHistoryResolver::resolve`].
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("can't rebase using log: {0}")]
    CantRebase(#[from] RebaseLogError),

    #[error("operation cancelled")]
    Cancelled,
}

impl ResolveError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ResolveError::Cancelled)
    }

    pub fn reason(&self) -> Option<Reason> {
        match self {
            ResolveError::CantRebase(e) => Some(e.reason()),
            ResolveError::Cancelled => None,
        }
    }
}

impl From<Cancelled> for ResolveError {
    fn from(_: Cancelled) -> Self {
        ResolveError::Cancelled
    }
}

/// Pick list for the range from the target commit up to head, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHistory {
    entries: Vec<GeneratedEntry>,
}

impl ResolvedHistory {
    pub fn entries(&self) -> &[GeneratedEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<GeneratedEntry> {
        self.entries
    }

    /// Instructions to hand to the rebase, oldest first
    pub fn rebase_entries(&self) -> Vec<RebaseEntry> {
        self.entries.iter().map(|e| e.entry.clone()).collect()
    }

    pub fn commits(&self) -> impl Iterator<Item = &CommitId> {
        self.entries.iter().map(|e| &e.details.id)
    }

    pub fn details(&self) -> impl Iterator<Item = &CommitMetadata> {
        self.entries.iter().map(|e| &e.details)
    }

    /// The commit the range is rebased onto; `None` when the range starts at
    /// a root commit.
    pub fn base(&self) -> Option<&CommitId> {
        self.entries.first()?.details.parents.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a resolved history contains at least the target.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves the linear history between a target commit and head.
#[derive(Debug, Clone, Default)]
pub struct LinearHistoryResolver {
    config: ResolverConfig,
}

impl LinearHistoryResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Build the pick list for `target..=head_ref`.
    ///
    /// Nothing is returned unless every check passes. `cancel` is polled at
    /// each visited commit and around the metadata lookup.
    pub fn resolve<G, M, C>(
        &self,
        graph: &G,
        metadata: &M,
        head_ref: &str,
        target: &CommitId,
        cancel: &C,
    ) -> Result<ResolvedHistory, ResolveError>
    where
        G: GraphTraversal + ?Sized,
        M: MetadataLookup + ?Sized,
        C: CancellationSignal + ?Sized,
    {
        let commits = self.walk(graph, head_ref, target, cancel)?;
        debug!(commits = commits.len(), head = head_ref, %target, "walked linear history");

        cancel.check()?;
        let details = fetch_in_order(metadata, &commits)
            .map_err(|source| RebaseLogError::UnresolvedHash { source })?;
        cancel.check()?;

        if let Some(commit) = details.iter().find(|d| self.config.is_autosquash(&d.subject)) {
            return Err(RebaseLogError::FixupSquash {
                commit: commit.id.clone(),
                subject: commit.subject.clone(),
            }
            .into());
        }

        let entries = details.into_iter().rev().map(GeneratedEntry::new).collect();
        Ok(ResolvedHistory { entries })
    }

    /// Commit ids from head down to the target, newest first.
    fn walk<G, C>(
        &self,
        graph: &G,
        head_ref: &str,
        target: &CommitId,
        cancel: &C,
    ) -> Result<Vec<CommitId>, ResolveError>
    where
        G: GraphTraversal + ?Sized,
        C: CancellationSignal + ?Sized,
    {
        let head = graph
            .resolve_ref(head_ref)
            .filter(|&node| graph.is_loaded(node))
            .ok_or_else(|| RebaseLogError::UnresolvedHead {
                head: head_ref.to_string(),
            })?;

        let mut commits = Vec::new();
        DfsWalk::new(&graph, [head]).walk(|node| -> Result<ControlFlow<()>, ResolveError> {
            cancel.check()?;
            if !graph.is_loaded(node) {
                // Past the loaded history, nothing left to walk.
                return Ok(ControlFlow::Break(()));
            }

            let id = graph.commit_id_of(node);
            let parents = graph.parents_of(node).len();
            let accepted = parents == 1
                || (parents == 0 && self.config.root_policy == RootPolicy::Accept && id == *target);
            if !accepted {
                return Err(RebaseLogError::Merge { commit: id, parents }.into());
            }

            let reached = id == *target;
            commits.push(id);
            Ok(if reached {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            })
        })?;

        if commits.last() != Some(target) {
            return Err(RebaseLogError::UnexpectedHash {
                expected: target.clone(),
                found: commits.last().cloned(),
            }
            .into());
        }

        Ok(commits)
    }
}

/// Batch lookup that insists on getting back exactly what was asked for.
fn fetch_in_order<M>(metadata: &M, ids: &[CommitId]) -> Result<Vec<CommitMetadata>, MetadataError>
where
    M: MetadataLookup + ?Sized,
{
    let details = metadata.fetch_metadata(ids)?;
    let mismatch = ids
        .iter()
        .enumerate()
        .find(|(i, id)| details.get(*i).map(|d| &d.id) != Some(*id));
    match mismatch {
        Some((_, id)) => Err(MetadataError::NotFound(id.clone())),
        None if details.len() != ids.len() => Err(MetadataError::NotFound(details[ids.len()].id.clone())),
        None => Ok(details),
    }
}
