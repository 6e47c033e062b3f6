use graph::{CommitId, GraphTraversal, HEAD};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cancel::{CancellationSignal, Cancelled};
use crate::config::ResolverConfig;
use crate::entry::{GeneratedEntry, RebaseEntry};
use crate::metadata::MetadataLookup;
use crate::rebase_log::{LinearHistoryResolver, Reason, ResolveError};
use crate::repository::Repository;

/// Where a plan's entries came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlanSource {
    /// Built from the commit graph; entries can be checked against git's
    /// todo list before the rebase starts.
    Log { generated: Vec<GeneratedEntry> },
    /// Listed by walking the repository after the graph was rejected.
    Revwalk {
        #[serde(serialize_with = "serialize_reason")]
        reason: Reason,
    },
}

fn serialize_reason<S: serde::Serializer>(reason: &Reason, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(reason)
}

/// Interactive rebase ready to be handed to git
#[derive(Debug, Clone, Serialize)]
pub struct RebasePlan {
    pub target: CommitId,
    /// Upstream passed to `git rebase -i`; `None` means `--root`
    pub base: Option<CommitId>,
    pub entries: Vec<RebaseEntry>,
    pub source: PlanSource,
}

impl RebasePlan {
    pub fn is_from_log(&self) -> bool {
        matches!(self.source, PlanSource::Log { .. })
    }

    /// Entries generated from the commit graph, if that's where the plan
    /// came from
    pub fn generated(&self) -> Option<&[GeneratedEntry]> {
        match &self.source {
            PlanSource::Log { generated } => Some(generated),
            PlanSource::Revwalk { .. } => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    CantRebase(#[from] crate::rebase_log::RebaseLogError),

    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Git(#[from] anyhow::Error),
}

impl From<Cancelled> for PlanError {
    fn from(_: Cancelled) -> Self {
        PlanError::Cancelled
    }
}

/// Plans an interactive rebase from the commit graph, falling back to a
/// revision walk over the repository when the graph can't be used.
pub struct RebasePlanner {
    resolver: LinearHistoryResolver,
}

impl RebasePlanner {
    pub fn new(config: ResolverConfig) -> Self {
        RebasePlanner {
            resolver: LinearHistoryResolver::new(config),
        }
    }

    pub fn resolver(&self) -> &LinearHistoryResolver {
        &self.resolver
    }

    /// Plan editing every commit from `target` up to HEAD
    pub fn plan<G, C>(
        &self,
        repo: &Repository,
        graph: &G,
        target: &CommitId,
        cancel: &C,
    ) -> Result<RebasePlan, PlanError>
    where
        G: GraphTraversal + ?Sized,
        C: CancellationSignal + ?Sized,
    {
        self.plan_with(repo, graph, repo, target, cancel)
    }

    /// Same as [`plan`](Self::plan) with a separate metadata source
    pub fn plan_with<G, M, C>(
        &self,
        repo: &Repository,
        graph: &G,
        metadata: &M,
        target: &CommitId,
        cancel: &C,
    ) -> Result<RebasePlan, PlanError>
    where
        G: GraphTraversal + ?Sized,
        M: MetadataLookup + ?Sized,
        C: CancellationSignal + ?Sized,
    {
        match self.resolver.resolve(graph, metadata, HEAD, target, cancel) {
            Ok(history) => {
                debug!(commits = history.len(), "planned rebase from the commit graph");
                Ok(RebasePlan {
                    target: target.clone(),
                    base: history.base().cloned(),
                    entries: history.rebase_entries(),
                    source: PlanSource::Log {
                        generated: history.into_entries(),
                    },
                })
            }
            Err(ResolveError::Cancelled) => Err(PlanError::Cancelled),
            Err(ResolveError::CantRebase(e)) => {
                warn!("Couldn't use log for rebasing: {}", e);
                if !self.resolver.config().fallback {
                    return Err(e.into());
                }
                let reason = e.reason();
                self.plan_with_revwalk(repo, target, reason, cancel)
            }
        }
    }

    fn plan_with_revwalk<C>(
        &self,
        repo: &Repository,
        target: &CommitId,
        reason: Reason,
        cancel: &C,
    ) -> Result<RebasePlan, PlanError>
    where
        C: CancellationSignal + ?Sized,
    {
        let entries = repo.revwalk_entries(target, cancel).map_err(|e| {
            if e.downcast_ref::<Cancelled>().is_some() {
                PlanError::Cancelled
            } else {
                PlanError::Git(e)
            }
        })?;
        let base = repo.first_parent(target)?;

        debug!(commits = entries.len(), %reason, "planned rebase from a revision walk");
        Ok(RebasePlan {
            target: target.clone(),
            base,
            entries,
            source: PlanSource::Revwalk { reason },
        })
    }
}
