use crate::common::{Sandbox, sandbox, to_paths};
use mgit::areas::refs::Head;
use mgit::artifacts::status::file_change::{IndexChangeType, WorkspaceChangeType};
use mgit::artifacts::status::status_info::HeadState;
use mgit::errors::{Error, ErrorKind};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn the_first_commit_has_no_parent_and_empties_the_index(
    sandbox: Sandbox,
) -> Result<(), Box<dyn std::error::Error>> {
    let repo = &sandbox.repository;
    sandbox.write("notes.txt", "hello\n");
    sandbox.write("src/lib.txt", "nested\n");

    let staged = repo.stage(&to_paths(&["."]))?;
    let commit_id = repo.seal_commit("first")?;

    let commit = repo.database().parse_object_as_commit(&commit_id)?;
    assert_eq!(staged, vec!["notes.txt", "src/lib.txt"]);
    assert_eq!(commit.parent(), None);
    assert_eq!(commit.message(), "first");
    assert_eq!(commit.manifest().len(), 2);
    assert!(repo.index().is_empty());
    assert_eq!(repo.refs().resolve_head(repo.database())?, commit_id);

    Ok(())
}

#[rstest]
fn a_commit_carries_forward_unstaged_paths(
    sandbox: Sandbox,
) -> Result<(), Box<dyn std::error::Error>> {
    let repo = &sandbox.repository;
    sandbox.write("a.txt", "a\n");
    sandbox.write("b.txt", "b\n");
    let first = sandbox.commit_paths(&["a.txt", "b.txt"], "first");

    sandbox.write("b.txt", "b2\n");
    let second = sandbox.commit_paths(&["b.txt"], "second");

    let first_manifest = repo.database().load_manifest(Some(&first))?;
    let second_manifest = repo.database().load_manifest(Some(&second))?;
    assert_eq!(first_manifest.get("a.txt"), second_manifest.get("a.txt"));
    assert_ne!(first_manifest.get("b.txt"), second_manifest.get("b.txt"));
    assert_eq!(
        repo.database().parse_object_as_commit(&second)?.parent(),
        Some(&first)
    );

    Ok(())
}

#[rstest]
fn identical_content_is_stored_once(sandbox: Sandbox) -> Result<(), Box<dyn std::error::Error>> {
    let repo = &sandbox.repository;
    sandbox.write("one.txt", "same bytes");
    sandbox.write("two.txt", "same bytes");

    repo.stage(&to_paths(&["one.txt", "two.txt"]))?;
    let manifest = repo.staged_manifest()?;

    assert_eq!(manifest.get("one.txt"), manifest.get("two.txt"));

    Ok(())
}

#[rstest]
fn committing_without_changes_fails(sandbox: Sandbox) -> Result<(), Box<dyn std::error::Error>> {
    let repo = &sandbox.repository;

    assert!(matches!(repo.seal_commit("empty"), Err(Error::NothingToCommit)));

    sandbox.write("a.txt", "a\n");
    sandbox.commit_paths(&["a.txt"], "first");
    // re-staging unchanged content changes nothing
    repo.stage(&to_paths(&["a.txt"]))?;

    assert!(matches!(repo.seal_commit("again"), Err(Error::NothingToCommit)));

    Ok(())
}

#[rstest]
#[case("")]
#[case("   \n")]
fn blank_messages_are_rejected(sandbox: Sandbox, #[case] message: &str) {
    sandbox.write("a.txt", "a\n");
    sandbox
        .repository
        .stage(&to_paths(&["a.txt"]))
        .expect("Failed to stage");

    let error = sandbox.repository.seal_commit(message).unwrap_err();

    assert!(matches!(error, Error::EmptyMessage));
    assert_eq!(error.kind(), ErrorKind::InvalidInput);
}

#[rstest]
fn staging_a_missing_path_fails(sandbox: Sandbox) {
    let error = sandbox
        .repository
        .stage(&to_paths(&["nowhere.txt"]))
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::NotFound);
}

#[rstest]
fn paths_outside_the_repository_are_rejected(sandbox: Sandbox) {
    let error = sandbox
        .repository
        .stage(&to_paths(&["../escape.txt"]))
        .unwrap_err();

    assert!(matches!(error, Error::PathOutsideRepository { .. }));
}

#[rstest]
fn adding_a_directory_stages_deletions_beneath_it(
    sandbox: Sandbox,
) -> Result<(), Box<dyn std::error::Error>> {
    let repo = &sandbox.repository;
    sandbox.write("docs/a.md", "a\n");
    sandbox.write("docs/b.md", "b\n");
    sandbox.commit_paths(&["docs"], "docs");

    std::fs::remove_file(sandbox.dir.path().join("docs").join("b.md"))?;
    let staged = repo.stage(&to_paths(&["docs"]))?;

    assert_eq!(staged, vec!["docs/a.md", "docs/b.md"]);
    assert!(!repo.staged_manifest()?.contains("docs/b.md"));

    Ok(())
}

#[rstest]
fn removing_a_file_stages_its_deletion(sandbox: Sandbox) -> Result<(), Box<dyn std::error::Error>> {
    let repo = &sandbox.repository;
    sandbox.write("keep.txt", "keep\n");
    sandbox.write("drop.txt", "drop\n");
    sandbox.commit_paths(&["keep.txt", "drop.txt"], "first");

    let removed = repo.remove(&to_paths(&["drop.txt"]), false)?;
    let commit_id = repo.seal_commit("drop")?;

    assert_eq!(removed, vec!["drop.txt"]);
    assert!(!sandbox.exists("drop.txt"));
    let manifest = repo.database().load_manifest(Some(&commit_id))?;
    assert_eq!(manifest.paths().cloned().collect::<Vec<_>>(), vec!["keep.txt"]);

    Ok(())
}

#[rstest]
fn removing_a_locally_modified_file_is_refused(
    sandbox: Sandbox,
) -> Result<(), Box<dyn std::error::Error>> {
    let repo = &sandbox.repository;
    sandbox.write("a.txt", "a\n");
    sandbox.commit_paths(&["a.txt"], "first");
    sandbox.write("a.txt", "edited\n");

    let error = repo.remove(&to_paths(&["a.txt"]), false).unwrap_err();

    assert!(matches!(error, Error::WorkingCopyConflict { .. }));
    assert_eq!(sandbox.read("a.txt"), "edited\n");

    // --cached keeps the file and only untracks it
    repo.remove(&to_paths(&["a.txt"]), true)?;
    assert_eq!(sandbox.read("a.txt"), "edited\n");
    assert!(!repo.staged_manifest()?.contains("a.txt"));

    Ok(())
}

#[rstest]
fn checkout_rewrites_only_differing_paths(
    sandbox: Sandbox,
) -> Result<(), Box<dyn std::error::Error>> {
    let repo = &sandbox.repository;
    sandbox.write("shared.txt", "shared\n");
    sandbox.write("f.txt", "master\n");
    sandbox.commit_paths(&["shared.txt", "f.txt"], "base");
    repo.create_branch("topic", None)?;

    repo.switch_to("topic")?;
    sandbox.write("f.txt", "topic\n");
    sandbox.write("only-topic.txt", "topic only\n");
    sandbox.commit_paths(&["f.txt", "only-topic.txt"], "topic work");
    sandbox.write("scratch.txt", "untracked\n");

    let manifest = repo.switch_to("master")?;

    assert_eq!(manifest.len(), 2);
    assert_eq!(sandbox.read("f.txt"), "master\n");
    assert!(!sandbox.exists("only-topic.txt"));
    assert_eq!(sandbox.read("scratch.txt"), "untracked\n");
    assert_eq!(
        repo.refs().current_branch()?.map(|name| name.to_string()),
        Some("master".to_string())
    );

    Ok(())
}

#[rstest]
fn restaging_head_content_does_not_block_checkout(
    sandbox: Sandbox,
) -> Result<(), Box<dyn std::error::Error>> {
    let repo = &sandbox.repository;
    sandbox.write("f.txt", "base\n");
    sandbox.commit_paths(&["f.txt"], "base");
    repo.create_branch("topic", None)?;
    repo.switch_to("topic")?;
    sandbox.write("f.txt", "topic\n");
    sandbox.commit_paths(&["f.txt"], "topic");
    repo.switch_to("master")?;

    sandbox.write("f.txt", "edited\n");
    repo.stage(&to_paths(&["f.txt"]))?;
    sandbox.write("f.txt", "base\n");
    repo.stage(&to_paths(&["f.txt"]))?;

    assert!(repo.index().is_empty());
    repo.switch_to("topic")?;
    assert_eq!(sandbox.read("f.txt"), "topic\n");

    Ok(())
}

#[rstest]
fn removing_a_freshly_added_file_leaves_no_entry(
    sandbox: Sandbox,
) -> Result<(), Box<dyn std::error::Error>> {
    let repo = &sandbox.repository;
    sandbox.write("f.txt", "base\n");
    sandbox.commit_paths(&["f.txt"], "base");

    sandbox.write("new.txt", "new\n");
    repo.stage(&to_paths(&["new.txt"]))?;
    repo.remove(&to_paths(&["new.txt"]), true)?;

    assert!(repo.index().is_empty());
    assert_eq!(
        repo.current_status()?.untracked_files.into_iter().collect::<Vec<_>>(),
        vec!["new.txt".to_string()]
    );

    Ok(())
}

#[rstest]
fn checkout_refuses_to_clobber_local_edits(
    sandbox: Sandbox,
) -> Result<(), Box<dyn std::error::Error>> {
    let repo = &sandbox.repository;
    sandbox.write("f.txt", "base\n");
    sandbox.commit_paths(&["f.txt"], "base");
    repo.create_branch("topic", None)?;
    repo.switch_to("topic")?;
    sandbox.write("f.txt", "topic\n");
    sandbox.commit_paths(&["f.txt"], "topic");

    sandbox.write("f.txt", "unsaved\n");
    let error = repo.switch_to("master").unwrap_err();

    match error {
        Error::WorkingCopyConflict { conflicts } => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].1, "f.txt");
        }
        other => panic!("expected WorkingCopyConflict, got {other:?}"),
    }
    assert_eq!(sandbox.read("f.txt"), "unsaved\n");
    assert_eq!(
        repo.refs().current_branch()?.map(|name| name.to_string()),
        Some("topic".to_string())
    );

    Ok(())
}

#[rstest]
fn checking_out_a_commit_detaches_head(sandbox: Sandbox) -> Result<(), Box<dyn std::error::Error>> {
    let repo = &sandbox.repository;
    sandbox.write("f.txt", "one\n");
    let first = sandbox.commit_paths(&["f.txt"], "one");
    sandbox.write("f.txt", "two\n");
    sandbox.commit_paths(&["f.txt"], "two");

    repo.switch_to("HEAD^")?;

    assert_eq!(repo.refs().head()?, Head::Detached(first.clone()));
    assert_eq!(sandbox.read("f.txt"), "one\n");

    // commits on a detached HEAD advance HEAD itself
    sandbox.write("f.txt", "experiment\n");
    let experiment = sandbox.commit_paths(&["f.txt"], "experiment");
    assert_eq!(repo.refs().head()?, Head::Detached(experiment));

    Ok(())
}

#[rstest]
fn branches_cannot_be_created_twice_or_before_the_first_commit(
    sandbox: Sandbox,
) -> Result<(), Box<dyn std::error::Error>> {
    let repo = &sandbox.repository;

    assert_eq!(
        repo.create_branch("early", None).unwrap_err().kind(),
        ErrorKind::DanglingRef
    );

    sandbox.write("f.txt", "one\n");
    sandbox.commit_paths(&["f.txt"], "one");
    repo.create_branch("topic", None)?;

    assert!(matches!(
        repo.create_branch("topic", None),
        Err(Error::BranchExists { .. })
    ));
    assert!(matches!(
        repo.create_branch("bad..name", None),
        Err(Error::InvalidBranchName { .. })
    ));

    Ok(())
}

#[rstest]
fn status_reports_each_kind_of_change(sandbox: Sandbox) -> Result<(), Box<dyn std::error::Error>> {
    let repo = &sandbox.repository;
    sandbox.write("modified.txt", "v1\n");
    sandbox.write("deleted.txt", "gone soon\n");
    sandbox.write("staged.txt", "v1\n");
    sandbox.commit_paths(&["modified.txt", "deleted.txt", "staged.txt"], "first");

    sandbox.write("modified.txt", "v2\n");
    std::fs::remove_file(sandbox.dir.path().join("deleted.txt"))?;
    sandbox.write("staged.txt", "v2\n");
    sandbox.write("added.txt", "new\n");
    sandbox.write("untracked.txt", "?\n");
    repo.stage(&to_paths(&["staged.txt", "added.txt"]))?;

    let status = repo.current_status()?;

    assert!(matches!(status.head, HeadState::Branch { .. }));
    assert_eq!(status.staged_paths(), vec!["added.txt", "staged.txt"]);
    assert_eq!(
        status.changed_files["added.txt"].index_change,
        IndexChangeType::Added
    );
    assert_eq!(
        status.changed_files["staged.txt"].index_change,
        IndexChangeType::Modified
    );
    assert_eq!(
        status.changed_files["modified.txt"].workspace_change,
        WorkspaceChangeType::Modified
    );
    assert_eq!(
        status.changed_files["deleted.txt"].workspace_change,
        WorkspaceChangeType::Deleted
    );
    assert_eq!(
        status.untracked_files.iter().collect::<Vec<_>>(),
        vec!["untracked.txt"]
    );

    Ok(())
}

#[rstest]
fn status_of_a_new_repository_names_the_unborn_branch(
    sandbox: Sandbox,
) -> Result<(), Box<dyn std::error::Error>> {
    let status = sandbox.repository.current_status()?;

    match &status.head {
        HeadState::Unborn { name } => assert_eq!(name.to_string(), "master"),
        other => panic!("expected an unborn branch, got {other:?}"),
    }
    assert!(status.is_clean());

    Ok(())
}
