//! Interactive rebase instructions and the todo-list text git reads them from.

use crate::metadata::CommitMetadata;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Commit-level commands of a rebase todo list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RebaseAction {
    Pick,
    Reword,
    Edit,
    Squash,
    Fixup,
    Drop,
}

impl RebaseAction {
    pub fn command(self) -> &'static str {
        match self {
            RebaseAction::Pick => "pick",
            RebaseAction::Reword => "reword",
            RebaseAction::Edit => "edit",
            RebaseAction::Squash => "squash",
            RebaseAction::Fixup => "fixup",
            RebaseAction::Drop => "drop",
        }
    }
}

impl FromStr for RebaseAction {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pick" | "p" => Ok(RebaseAction::Pick),
            "reword" | "r" => Ok(RebaseAction::Reword),
            "edit" | "e" => Ok(RebaseAction::Edit),
            "squash" | "s" => Ok(RebaseAction::Squash),
            "fixup" | "f" => Ok(RebaseAction::Fixup),
            "drop" | "d" => Ok(RebaseAction::Drop),
            other => Err(TodoError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for RebaseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TodoError {
    #[error("unknown rebase command {0:?}")]
    UnknownAction(String),

    #[error("line {line}: missing commit after {action:?}")]
    MissingCommit { line: usize, action: String },
}

/// One line of a rebase todo list.
///
/// `commit` is kept as written: git abbreviates it in the todo file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebaseEntry {
    pub action: RebaseAction,
    pub commit: String,
    pub subject: String,
}

impl RebaseEntry {
    pub fn new(action: RebaseAction, commit: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            action,
            commit: commit.into(),
            subject: subject.into(),
        }
    }

    pub fn pick(commit: impl Into<String>, subject: impl Into<String>) -> Self {
        Self::new(RebaseAction::Pick, commit, subject)
    }
}

impl fmt::Display for RebaseEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.subject.is_empty() {
            write!(f, "{} {}", self.action, self.commit)
        } else {
            write!(f, "{} {} {}", self.action, self.commit, self.subject)
        }
    }
}

/// Todo commands that don't pick up a commit: `exec`, `break`, the labels
/// of `--rebase-merges`, `update-ref` from `rebase.updateRefs`, `noop`.
const NON_COMMIT_COMMANDS: &[&str] = &[
    "exec", "x", "break", "b", "label", "l", "reset", "t", "update-ref", "u", "noop",
];

/// Parse the todo list git hands to the sequence editor.
///
/// Blank lines, `#` comments and commands that don't name a commit are
/// skipped.
pub fn parse_todo(text: &str) -> Result<Vec<RebaseEntry>, TodoError> {
    let mut entries = Vec::new();

    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (command, rest) = split_word(line);
        if NON_COMMIT_COMMANDS.contains(&command) {
            continue;
        }
        let action: RebaseAction = command.parse()?;
        let (commit, subject) = split_word(rest);
        if commit.is_empty() {
            return Err(TodoError::MissingCommit {
                line: number + 1,
                action: command.to_string(),
            });
        }

        entries.push(RebaseEntry::new(action, commit, subject));
    }

    Ok(entries)
}

fn split_word(s: &str) -> (&str, &str) {
    match s.find(char::is_whitespace) {
        Some(end) => (&s[..end], s[end..].trim_start()),
        None => (s, ""),
    }
}

/// Render entries as todo-list lines, one per entry.
pub fn format_todo(entries: &[RebaseEntry]) -> String {
    entries.iter().map(|entry| format!("{entry}\n")).collect()
}

/// A pick entry built from the commit graph, together with the metadata it
/// was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedEntry {
    pub entry: RebaseEntry,
    pub details: CommitMetadata,
}

impl GeneratedEntry {
    pub fn new(details: CommitMetadata) -> Self {
        let entry = RebaseEntry::pick(details.id.as_str(), details.subject.clone());
        Self { entry, details }
    }

    /// Whether `real`, read back from git's todo list, describes the same
    /// instruction. Either side may carry an abbreviated commit id.
    pub fn equals_with_real(&self, real: &RebaseEntry) -> bool {
        self.entry.action == real.action
            && same_commit(self.details.id.as_str(), &real.commit)
            && self.entry.subject == real.subject
    }
}

/// One id abbreviates the other.
fn same_commit(a: &str, b: &str) -> bool {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    !short.is_empty() && long.as_bytes()[..short.len()].eq_ignore_ascii_case(short.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Signature;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn generated(id: &str, subject: &str) -> GeneratedEntry {
        let signature = Signature {
            name: "Ann".into(),
            email: "ann@example.com".into(),
            time: Utc::now(),
        };
        GeneratedEntry::new(CommitMetadata {
            id: id.parse().unwrap(),
            parents: vec![],
            subject: subject.into(),
            full_message: subject.into(),
            author: signature.clone(),
            committer: signature,
        })
    }

    #[test]
    fn test_parse_todo() {
        let todo = "\
pick abc1234 Fix bug
r def5678 Reword  me

# Rebase 0123456..def5678 onto 0123456 (2 commands)
#
# Commands:
# p, pick <commit> = use commit
";
        let entries = parse_todo(todo).unwrap();

        assert_eq!(
            entries,
            vec![
                RebaseEntry::pick("abc1234", "Fix bug"),
                RebaseEntry::new(RebaseAction::Reword, "def5678", "Reword  me"),
            ]
        );
    }

    #[test]
    fn test_parse_todo_skips_non_commit_commands() {
        let todo = "\
pick abc1234 Fix bug
exec make test
pick def5678 Add test
update-ref refs/heads/topic
break
noop
";
        assert_eq!(
            parse_todo(todo).unwrap(),
            vec![RebaseEntry::pick("abc1234", "Fix bug"), RebaseEntry::pick("def5678", "Add test")]
        );
    }

    #[test]
    fn test_parse_todo_errors() {
        assert_eq!(
            parse_todo("merge -C abc1234 side"),
            Err(TodoError::UnknownAction("merge".to_string()))
        );
        assert_eq!(
            parse_todo("pick abc1234 ok\nfixup   "),
            Err(TodoError::MissingCommit { line: 2, action: "fixup".to_string() })
        );
    }

    #[test]
    fn test_format_todo_reads_back() {
        let entries = vec![
            RebaseEntry::pick("abc1234", "Fix bug"),
            RebaseEntry::new(RebaseAction::Fixup, "def5678", "fixup! Fix bug"),
            RebaseEntry::new(RebaseAction::Drop, "0123abc", ""),
        ];
        let text = format_todo(&entries);

        assert_eq!(text, "pick abc1234 Fix bug\nfixup def5678 fixup! Fix bug\ndrop 0123abc\n");
        assert_eq!(parse_todo(&text).unwrap(), entries);
    }

    #[test]
    fn test_generated_entry_is_pick() {
        let entry = generated("abc1234def", "Fix bug");
        assert_eq!(entry.entry, RebaseEntry::pick("abc1234def", "Fix bug"));
    }

    #[test]
    fn test_equals_with_real_accepts_abbreviated_id() {
        let entry = generated("abc123", "Fix bug");
        assert!(entry.equals_with_real(&RebaseEntry::pick("abc123", "Fix bug")));
        assert!(entry.equals_with_real(&RebaseEntry::pick("abc1234def", "Fix bug")));

        let entry = generated("abc1234def", "Fix bug");
        assert!(entry.equals_with_real(&RebaseEntry::pick("ABC1234", "Fix bug")));
    }

    #[test]
    fn test_equals_with_real_rejects_differences() {
        let entry = generated("abc123", "Fix bug");
        assert!(!entry.equals_with_real(&RebaseEntry::pick("abc123", "Fix bug!")));
        assert!(!entry.equals_with_real(&RebaseEntry::pick("abd123", "Fix bug")));
        assert!(!entry.equals_with_real(&RebaseEntry::new(RebaseAction::Edit, "abc123", "Fix bug")));
        assert!(!entry.equals_with_real(&RebaseEntry::pick("", "Fix bug")));
    }
}
