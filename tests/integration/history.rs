use crate::common::{Sandbox, sandbox};
use mgit::artifacts::diff::diff_algorithm::Edit;
use mgit::commands::porcelain::log::LogOptions;
use mgit::commands::porcelain::merge::MergeOptions;
use mgit::errors::{Error, ErrorKind};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::path::Path;

fn messages(sandbox: &Sandbox, start: Option<&str>) -> Vec<String> {
    sandbox
        .repository
        .history(start)
        .expect("Failed to resolve history start")
        .iter()
        .map(|entry| entry.expect("Failed to load commit").1.message().to_string())
        .collect()
}

#[rstest]
fn history_walks_first_parents_newest_first(sandbox: Sandbox) {
    for (index, message) in ["one", "two", "three"].iter().enumerate() {
        sandbox.write("f.txt", &format!("{index}\n"));
        sandbox.commit_paths(&["f.txt"], message);
    }

    assert_eq!(messages(&sandbox, None), vec!["three", "two", "one"]);
    assert_eq!(messages(&sandbox, Some("HEAD~1")), vec!["two", "one"]);
    assert_eq!(messages(&sandbox, Some("master^^")), vec!["one"]);
}

#[rstest]
fn history_of_an_unborn_branch_is_empty(sandbox: Sandbox) {
    assert!(messages(&sandbox, None).is_empty());
}

#[rstest]
fn history_after_a_merge_follows_the_current_side(
    sandbox: Sandbox,
) -> Result<(), Box<dyn std::error::Error>> {
    let repo = &sandbox.repository;
    sandbox.write("a.txt", "a\n");
    sandbox.commit_paths(&["a.txt"], "base");
    repo.create_branch("topic", None)?;
    sandbox.write("b.txt", "b\n");
    sandbox.commit_paths(&["b.txt"], "master work");
    repo.switch_to("topic")?;
    sandbox.write("c.txt", "c\n");
    sandbox.commit_paths(&["c.txt"], "topic work");
    repo.switch_to("master")?;
    repo.begin_merge("topic", &MergeOptions::default())?;

    assert_eq!(
        messages(&sandbox, None),
        vec!["Merge branch 'topic'", "master work", "base"]
    );

    Ok(())
}

#[rstest]
fn log_prints_the_medium_format(sandbox: Sandbox) -> Result<(), Box<dyn std::error::Error>> {
    sandbox.write("f.txt", "one\n");
    let first = sandbox.commit_paths(&["f.txt"], "first line\n\nbody");
    let (repo, output) = sandbox.with_output();

    repo.log(None, &LogOptions::default())?;

    assert_eq!(
        output.text(),
        format!(
            "commit {first}\nAuthor: fake_user <fake_email@email.com>\nDate:   Sun Jan 1 12:00:00 2023 +0000\n\n    first line\n    \n    body\n"
        )
    );

    Ok(())
}

#[rstest]
fn log_oneline_abbreviates_ids(sandbox: Sandbox) -> Result<(), Box<dyn std::error::Error>> {
    sandbox.write("f.txt", "one\n");
    let first = sandbox.commit_paths(&["f.txt"], "first");
    sandbox.write("f.txt", "two\n");
    let second = sandbox.commit_paths(&["f.txt"], "second");
    let (repo, output) = sandbox.with_output();

    let opts = LogOptions {
        oneline: true,
        ..LogOptions::default()
    };
    repo.log(None, &opts)?;

    assert_eq!(
        output.text(),
        format!(
            "{} second\n{} first\n",
            second.to_short_oid(),
            first.to_short_oid()
        )
    );

    Ok(())
}

#[rstest]
fn commits_resolve_from_unambiguous_prefixes(
    sandbox: Sandbox,
) -> Result<(), Box<dyn std::error::Error>> {
    sandbox.write("f.txt", "one\n");
    sandbox.commit_paths(&["f.txt"], "first");
    sandbox.write("f.txt", "two\n");
    let second = sandbox.commit_paths(&["f.txt"], "second");
    let prefix = &second.as_ref()[..8];

    assert_eq!(messages(&sandbox, Some(prefix)), vec!["second", "first"]);

    Ok(())
}

#[rstest]
#[case("missing-branch", ErrorKind::NotFound)]
#[case("HEAD~5", ErrorKind::NotFound)]
#[case("master^^^", ErrorKind::NotFound)]
#[case("bad..name", ErrorKind::InvalidInput)]
fn unresolvable_revisions_fail(
    sandbox: Sandbox,
    #[case] revision: &str,
    #[case] expected: ErrorKind,
) {
    sandbox.write("f.txt", "one\n");
    sandbox.commit_paths(&["f.txt"], "first");

    let error = sandbox.repository.history(Some(revision)).unwrap_err();

    assert_eq!(error.kind(), expected);
}

#[rstest]
fn diffing_two_files_aligns_their_lines(
    sandbox: Sandbox,
) -> Result<(), Box<dyn std::error::Error>> {
    sandbox.write("a.txt", "a\nb\nc\n");
    sandbox.write("b.txt", "a\nx\nc\n");

    let edits = sandbox
        .repository
        .diff_files(Path::new("a.txt"), Path::new("b.txt"))?;

    assert_eq!(
        edits,
        vec![
            Edit::Equal {
                value: "a".to_string()
            },
            Edit::Delete {
                value: "b".to_string()
            },
            Edit::Insert {
                value: "x".to_string()
            },
            Edit::Equal {
                value: "c".to_string()
            },
        ]
    );

    Ok(())
}

#[rstest]
fn diffing_against_head_reports_working_edits(
    sandbox: Sandbox,
) -> Result<(), Box<dyn std::error::Error>> {
    sandbox.write("f.txt", "keep\nold\n");
    sandbox.commit_paths(&["f.txt"], "first");
    sandbox.write("f.txt", "keep\nnew\n");
    sandbox.write("fresh.txt", "brand new\n");
    let (repo, output) = sandbox.with_output();

    let edits = repo.diff_head(Path::new("f.txt"))?;
    repo.print_diff("f.txt", "f.txt", &edits)?;
    let untracked = repo.diff_head(Path::new("fresh.txt"))?;

    assert_eq!(output.text(), "--- a/f.txt\n+++ b/f.txt\n keep\n-old\n+new\n");
    assert_eq!(
        untracked,
        vec![Edit::Insert {
            value: "brand new".to_string()
        }]
    );

    Ok(())
}

#[rstest]
fn diff_prints_nothing_for_a_clean_tree(
    sandbox: Sandbox,
) -> Result<(), Box<dyn std::error::Error>> {
    sandbox.write("f.txt", "same\n");
    sandbox.commit_paths(&["f.txt"], "first");
    let (repo, output) = sandbox.with_output();

    repo.diff(false)?;
    repo.diff(true)?;

    assert_eq!(output.text(), "");

    Ok(())
}

#[rstest]
fn cached_diff_shows_staged_content_against_head(
    sandbox: Sandbox,
) -> Result<(), Box<dyn std::error::Error>> {
    sandbox.write("f.txt", "one\n");
    sandbox.commit_paths(&["f.txt"], "first");
    sandbox.write("f.txt", "two\n");
    let (repo, output) = sandbox.with_output();
    repo.stage(&[Path::new("f.txt").to_path_buf()])?;

    repo.diff(true)?;

    assert_eq!(output.text(), "--- a/f.txt\n+++ b/f.txt\n-one\n+two\n");

    Ok(())
}

#[rstest]
fn hashed_blobs_can_be_printed_back(sandbox: Sandbox) -> Result<(), Box<dyn std::error::Error>> {
    sandbox.write("blob.txt", "raw content");
    let (repo, output) = sandbox.with_output();

    let oid = repo.hash_object(Path::new("blob.txt"), true)?;
    repo.cat_file(&oid.as_ref()[..6])?;

    assert_eq!(output.text(), format!("{oid}\nraw content"));

    Ok(())
}

#[rstest]
fn printing_an_unknown_object_fails(sandbox: Sandbox) {
    let error = sandbox.repository.cat_file("deadbeef").unwrap_err();

    assert!(matches!(error, Error::ObjectNotFound { .. }));
}
