//! Properties of the pick lists built from randomly shaped histories.

use chrono::Utc;
use graph::{CommitId, CommitNode, Dag, GraphTraversal, HEAD};
use logrebase_core::{LinearHistoryResolver, NeverCancelled, Reason, RebaseAction};
use proptest::prelude::*;

fn oid(n: usize) -> CommitId {
    format!("{:040x}", n + 1).parse().unwrap()
}

/// `len` commits in a chain, the oldest one pointing at an unloaded parent.
/// The commit at `merge` (if any) gets a second, loaded parent.
fn chain(len: usize, merge: Option<usize>, fixup: Option<usize>) -> Dag {
    let mut dag = Dag::new();
    let side = oid(10_000);
    dag.add_node(CommitNode::new(side.clone(), vec![oid(20_000)], Utc::now(), "Side".into(), "Side".into()));

    for i in 0..len {
        let mut parents = vec![oid(if i == 0 { 30_000 } else { i - 1 })];
        if merge == Some(i) {
            parents.push(side.clone());
        }
        let subject = if fixup == Some(i) {
            format!("fixup! Commit {}", i.saturating_sub(1))
        } else {
            format!("Commit {i}")
        };
        dag.add_node(CommitNode::new(oid(i), parents, Utc::now(), "Author".into(), subject));
    }
    dag.set_ref(HEAD, &oid(len - 1));
    dag
}

proptest! {
    #[test]
    fn linear_range_resolves_oldest_first(len in 1usize..40, target in 0usize..40) {
        let target = target % len;
        let dag = chain(len, None, None);

        let history = LinearHistoryResolver::default()
            .resolve(&dag, &dag, HEAD, &oid(target), &NeverCancelled)
            .unwrap();

        let commits: Vec<_> = history.commits().cloned().collect();
        let expected: Vec<_> = (target..len).map(oid).collect();
        prop_assert_eq!(&commits, &expected);

        for pair in commits.windows(2) {
            let node = dag.node_of(&pair[1]).unwrap();
            let parents = dag.parents_of(node);
            prop_assert_eq!(parents.len(), 1);
            prop_assert_eq!(dag.commit_id_of(parents[0]), pair[0].clone());
        }
        prop_assert!(history.entries().iter().all(|e| e.entry.action == RebaseAction::Pick));
    }

    #[test]
    fn merge_in_range_is_rejected(len in 1usize..40, target in 0usize..40, merge in 0usize..40) {
        let (target, merge) = (target % len, merge % len);
        let dag = chain(len, Some(merge), None);

        let result = LinearHistoryResolver::default()
            .resolve(&dag, &dag, HEAD, &oid(target), &NeverCancelled);

        if merge >= target {
            prop_assert_eq!(result.unwrap_err().reason(), Some(Reason::Merge));
        } else {
            prop_assert_eq!(result.unwrap().len(), len - target);
        }
    }

    #[test]
    fn autosquash_in_range_is_rejected(len in 1usize..40, target in 0usize..40, fixup in 0usize..40) {
        let (target, fixup) = (target % len, fixup % len);
        let dag = chain(len, None, Some(fixup));

        let result = LinearHistoryResolver::default()
            .resolve(&dag, &dag, HEAD, &oid(target), &NeverCancelled);

        if fixup >= target {
            prop_assert_eq!(result.unwrap_err().reason(), Some(Reason::FixupSquash));
        } else {
            prop_assert!(result.is_ok());
        }
    }

    #[test]
    fn target_outside_history_is_unexpected(len in 1usize..40) {
        let dag = chain(len, None, None);

        let err = LinearHistoryResolver::default()
            .resolve(&dag, &dag, HEAD, &oid(5_000), &NeverCancelled)
            .unwrap_err();

        prop_assert_eq!(err.reason(), Some(Reason::UnexpectedHash));
    }

    #[test]
    fn resolving_twice_gives_the_same_list(len in 1usize..20, target in 0usize..20) {
        let target = target % len;
        let dag = chain(len, None, None);
        let resolver = LinearHistoryResolver::default();

        let first = resolver.resolve(&dag, &dag, HEAD, &oid(target), &NeverCancelled).unwrap();
        let second = resolver.resolve(&dag, &dag, HEAD, &oid(target), &NeverCancelled).unwrap();
        prop_assert_eq!(first, second);
    }
}
