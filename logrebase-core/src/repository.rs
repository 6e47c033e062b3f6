use anyhow::{bail, Context, Result};
use git2::{ErrorCode, Oid, Repository as Git2Repository, Sort};
use graph::{commit_to_node, subject_of, CommitId, Dag, GitWalker};
use std::path::{Path, PathBuf};

use crate::cancel::CancellationSignal;
use crate::entry::RebaseEntry;
use crate::metadata::{CommitMetadata, MetadataError, MetadataLookup};

pub struct Repository {
    path: PathBuf,
    git_repo: Git2Repository,
}

impl Repository {
    /// Open an existing repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let git_repo = Git2Repository::open(&path)
            .with_context(|| format!("Failed to open repository at {}", path.display()))?;

        Ok(Repository {
            path,
            git_repo,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn git(&self) -> &Git2Repository {
        &self.git_repo
    }

    /// Resolve a revision (sha, branch, `HEAD~2`, ...) to a commit
    pub fn resolve_commit(&self, rev: &str) -> Result<CommitId> {
        let object = self.git_repo
            .revparse_single(rev)
            .with_context(|| format!("Unknown revision '{}'", rev))?;
        let commit = object
            .peel_to_commit()
            .with_context(|| format!("'{}' does not point at a commit", rev))?;
        Ok(CommitId::from(commit.id()))
    }

    /// First parent of a commit, `None` for a root commit
    pub fn first_parent(&self, id: &CommitId) -> Result<Option<CommitId>> {
        let commit = self.git_repo.find_commit(Oid::from_str(id.as_str())?)?;
        Ok(commit.parent_ids().next().map(CommitId::from))
    }

    /// Load the commit graph reachable from HEAD and the local branches
    pub fn load_graph(&self, limit: Option<usize>) -> Result<Dag> {
        let repo = Git2Repository::open(self.git_repo.path())?;
        GitWalker::from_repository(repo)
            .into_dag(limit)
            .context("Failed to load commit graph")
    }

    /// Pick list for `target..HEAD` as `git rebase -i` would write it:
    /// oldest first, merge commits left out.
    pub fn revwalk_entries<C>(&self, target: &CommitId, cancel: &C) -> Result<Vec<RebaseEntry>>
    where
        C: CancellationSignal + ?Sized,
    {
        let target = self.git_repo.find_commit(Oid::from_str(target.as_str())?)?;
        let head = self.git_repo.head()?.peel_to_commit()?;
        if head.id() != target.id() && !self.git_repo.graph_descendant_of(head.id(), target.id())? {
            bail!("{} is not an ancestor of HEAD", target.id());
        }

        let mut revwalk = self.git_repo.revwalk()?;
        revwalk.push(head.id())?;
        // Upstream of the rebase; a root target rebases everything.
        if let Some(upstream) = target.parent_ids().next() {
            revwalk.hide(upstream)?;
        }
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;

        let mut entries = Vec::new();
        for oid in revwalk {
            cancel.check()?;
            let commit = self.git_repo.find_commit(oid?)?;
            if commit.parent_count() > 1 {
                continue;
            }
            let message = String::from_utf8_lossy(commit.message_bytes());
            entries.push(RebaseEntry::pick(commit.id().to_string(), subject_of(&message)));
        }

        Ok(entries)
    }
}

impl MetadataLookup for Repository {
    fn fetch_metadata(&self, ids: &[CommitId]) -> Result<Vec<CommitMetadata>, MetadataError> {
        ids.iter()
            .map(|id| -> Result<CommitMetadata, MetadataError> {
                let commit = match self.git_repo.find_commit(Oid::from_str(id.as_str())?) {
                    Ok(commit) => commit,
                    Err(e) if e.code() == ErrorCode::NotFound => {
                        return Err(MetadataError::NotFound(id.clone()))
                    }
                    Err(e) => return Err(e.into()),
                };
                Ok(CommitMetadata::from(&commit_to_node(&commit)?))
            })
            .collect()
    }
}
