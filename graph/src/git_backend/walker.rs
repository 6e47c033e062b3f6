use git2::{BranchType, Commit, Repository, Sort};
use chrono::{DateTime, TimeZone, Utc};
use anyhow::{Result, Context};
use crate::core::{CommitId, CommitNode, Dag};

/// Ref name the walker records for the checked-out commit.
pub const HEAD: &str = "HEAD";

pub struct GitWalker {
    repo: Repository,
}

impl GitWalker {
    pub fn new(repo_path: Option<&str>) -> Result<Self> {
        let repo = match repo_path {
            Some(path) => Repository::open(path),
            None => Repository::open_from_env(),
        }.context("Failed to open repository")?;

        Ok(Self { repo })
    }

    pub fn from_repository(repo: Repository) -> Self {
        Self { repo }
    }

    /// Convert git repository commits to DAG
    ///
    /// `HEAD` and every local branch are recorded as refs of the returned
    /// graph. With a `limit`, commits beyond it stay unloaded but are still
    /// known as parents of the loaded ones.
    pub fn into_dag(&self, limit: Option<usize>) -> Result<Dag> {
        let mut dag = Dag::new();
        let mut revwalk = self.repo.revwalk()?;

        let head = self.head_commit()?;
        if let Some(head) = &head {
            revwalk.push(head.id())?;
        }
        let branches = self.branch_tips()?;
        for (_, target) in &branches {
            revwalk.push(*target)?;
        }

        // Sort by topological order and time
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

        for (count, oid) in revwalk.enumerate() {
            if limit.is_some_and(|limit| count >= limit) {
                break;
            }
            let commit = self.repo.find_commit(oid?)?;
            dag.add_node(commit_to_node(&commit)?);
        }

        if let Some(head) = head {
            dag.set_ref(HEAD, &CommitId::from(head.id()));
        }
        for (name, target) in branches {
            dag.set_ref(name, &CommitId::from(target));
        }

        Ok(dag)
    }

    /// Local branch names and their tips
    fn branch_tips(&self) -> Result<Vec<(String, git2::Oid)>> {
        let mut refs = Vec::new();
        for branch in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            if let (Some(name), Some(target)) = (branch.name()?, branch.get().target()) {
                refs.push((name.to_string(), target));
            }
        }
        Ok(refs)
    }

    /// Commit HEAD points at, `None` on an unborn branch
    fn head_commit(&self) -> Result<Option<Commit<'_>>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit().context("HEAD does not point at a commit")?)),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch || e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Convert a git2::Commit to CommitNode
pub fn commit_to_node(commit: &Commit) -> Result<CommitNode> {
    let id = CommitId::from(commit.id());
    let parents: Vec<CommitId> = commit.parent_ids().map(CommitId::from).collect();

    let author = commit.author();
    let committer = commit.committer();

    let message = String::from_utf8_lossy(commit.message_bytes()).into_owned();

    Ok(CommitNode::new(
        id,
        parents,
        to_utc(author.when())?,
        author.name().unwrap_or("Unknown").to_string(),
        message,
    )
    .with_email(author.email().unwrap_or(""))
    .with_committer(
        committer.name().unwrap_or("Unknown"),
        committer.email().unwrap_or(""),
        to_utc(committer.when())?,
    ))
}

/// Convert git time to DateTime<Utc>
fn to_utc(time: git2::Time) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(time.seconds(), 0)
        .single()
        .context("Invalid commit timestamp")
}
