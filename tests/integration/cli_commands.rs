use crate::common::command::{
    commit_all, generate_random_author, get_branch_tip, get_head_commit_sha,
    get_parent_commit_ids, init_repository_dir, mgit_commit, mgit_merge, repository_dir,
    run_mgit_command,
};
use crate::common::file::{FileSpec, read_file, write_file, write_generated_files};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn init_reports_the_metadata_directory(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir_absolute_path = repository_dir.path().canonicalize()?.display().to_string();

    run_mgit_command(repository_dir.path(), &["init"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(
            r"^Initialized empty mgit repository in .+\.mgit\n$",
        )?)
        .stdout(predicate::str::contains(dir_absolute_path));

    assert_eq!(
        read_file(&repository_dir.path().join(".mgit").join("HEAD")),
        "ref: refs/heads/master\n"
    );

    Ok(())
}

#[rstest]
fn commands_outside_a_repository_fail(repository_dir: TempDir) {
    run_mgit_command(repository_dir.path(), &["status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not an mgit repository"));
}

#[rstest]
fn the_root_commit_is_announced(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_mgit_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    write_generated_files(repository_dir.path(), 3);
    run_mgit_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();

    let assert = mgit_commit(repository_dir.path(), "Initial commit")
        .assert()
        .success();

    let head = get_head_commit_sha(repository_dir.path())?;
    assert.stdout(format!("[master (root-commit) {}] Initial commit\n", &head[..7]));

    Ok(())
}

#[rstest]
fn commit_uses_the_author_from_the_environment(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let author = generate_random_author();
    run_mgit_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    write_generated_files(repository_dir.path(), 1);
    run_mgit_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();

    run_mgit_command(repository_dir.path(), &["commit", "-m", "authored"])
        .env("MGIT_AUTHOR_NAME", &author.name)
        .env("MGIT_AUTHOR_EMAIL", &author.email)
        .assert()
        .success();

    run_mgit_command(repository_dir.path(), &["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "Author: {} <{}>",
            author.name, author.email
        )));

    Ok(())
}

#[rstest]
fn committing_without_an_identity_fails(repository_dir: TempDir) {
    run_mgit_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    write_generated_files(repository_dir.path(), 1);
    run_mgit_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();

    run_mgit_command(repository_dir.path(), &["commit", "-m", "anonymous"])
        .env_remove("MGIT_AUTHOR_NAME")
        .env_remove("MGIT_AUTHOR_EMAIL")
        .assert()
        .failure()
        .stderr(predicate::str::contains("author identity unknown"));
}

#[rstest]
fn committing_with_nothing_staged_fails(init_repository_dir: TempDir) {
    mgit_commit(init_repository_dir.path(), "again")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing staged to commit"));
}

#[rstest]
fn porcelain_status_lists_codes_in_path_order(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(FileSpec::new(dir.join("1.txt"), "changed\n".to_string()));
    write_file(FileSpec::new(dir.join("new.txt"), "new\n".to_string()));
    write_file(FileSpec::new(dir.join("z.txt"), "untracked\n".to_string()));
    std::fs::remove_file(dir.join("a").join("2.txt")).expect("Failed to delete file");
    run_mgit_command(dir, &["add", "new.txt"]).assert().success();

    run_mgit_command(dir, &["status", "--porcelain"])
        .assert()
        .success()
        .stdout(" M 1.txt\n D a/2.txt\nA  new.txt\n?? z.txt\n");
}

#[rstest]
fn long_status_of_a_clean_tree(init_repository_dir: TempDir) {
    run_mgit_command(init_repository_dir.path(), &["status"])
        .assert()
        .success()
        .stdout("On branch master\n\nnothing to commit, working tree clean\n");
}

#[rstest]
fn paths_are_relative_to_the_current_directory(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(FileSpec::new(
        dir.join("a").join("b").join("3.txt"),
        "three, edited\n".to_string(),
    ));

    run_mgit_command(&dir.join("a").join("b"), &["add", "3.txt"])
        .assert()
        .success();

    run_mgit_command(dir, &["status", "--porcelain"])
        .assert()
        .success()
        .stdout("M  a/b/3.txt\n");
}

#[rstest]
fn rm_untracks_and_deletes(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();

    run_mgit_command(dir, &["rm", "a"]).assert().success();

    assert!(!dir.join("a").exists());
    run_mgit_command(dir, &["status", "--porcelain"])
        .assert()
        .success()
        .stdout("D  a/2.txt\nD  a/b/3.txt\n");
}

#[rstest]
fn branches_are_listed_with_the_current_one_marked(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_mgit_command(dir, &["branch", "feature/login"])
        .assert()
        .success();
    run_mgit_command(dir, &["branch", "alpha", "HEAD"])
        .assert()
        .success();

    run_mgit_command(dir, &["branch"])
        .assert()
        .success()
        .stdout("  alpha\n  feature/login\n* master\n");
}

#[rstest]
fn invalid_branch_names_are_rejected(init_repository_dir: TempDir) {
    run_mgit_command(init_repository_dir.path(), &["branch", "bad..name"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid branch name 'bad..name'"));
}

#[rstest]
fn checkout_switches_branches_and_reports_it(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_mgit_command(dir, &["branch", "topic"])
        .assert()
        .success();

    run_mgit_command(dir, &["checkout", "topic"])
        .assert()
        .success()
        .stdout("Switched to branch 'topic'\n");
    run_mgit_command(dir, &["checkout", "topic"])
        .assert()
        .success()
        .stdout("Already on 'topic'\n");

    assert_eq!(
        read_file(&dir.join(".mgit").join("HEAD")),
        "ref: refs/heads/topic\n"
    );
}

#[rstest]
fn checking_out_a_commit_detaches_head(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    let head = get_head_commit_sha(dir)?;

    run_mgit_command(dir, &["checkout", &head[..8]])
        .assert()
        .success()
        .stdout(predicate::str::contains("You are in 'detached HEAD' state."))
        .stdout(predicate::str::contains(format!(
            "HEAD is now at {} Initial commit",
            &head[..7]
        )));

    run_mgit_command(dir, &["status"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!(
            "HEAD detached at {}",
            &head[..7]
        )));

    Ok(())
}

#[rstest]
fn log_oneline_lists_commits_newest_first(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    let first = get_head_commit_sha(dir)?;
    write_file(FileSpec::new(dir.join("1.txt"), "uno\n".to_string()));
    commit_all(dir, "Second commit");
    let second = get_head_commit_sha(dir)?;

    run_mgit_command(dir, &["log", "--oneline"])
        .assert()
        .success()
        .stdout(format!(
            "{} Second commit\n{} Initial commit\n",
            &second[..7],
            &first[..7]
        ));

    run_mgit_command(dir, &["log", "--oneline", "HEAD^"])
        .assert()
        .success()
        .stdout(format!("{} Initial commit\n", &first[..7]));

    Ok(())
}

#[rstest]
fn diff_compares_two_working_files(repository_dir: TempDir) {
    let dir = repository_dir.path();
    run_mgit_command(dir, &["init"]).assert().success();
    write_file(FileSpec::new(dir.join("a.txt"), "a\nb\nc\n".to_string()));
    write_file(FileSpec::new(dir.join("b.txt"), "a\nx\nc\n".to_string()));

    run_mgit_command(dir, &["diff", "a.txt", "b.txt"])
        .assert()
        .success()
        .stdout("--- a/a.txt\n+++ b/b.txt\n a\n-b\n+x\n c\n");
}

#[rstest]
fn diff_shows_unstaged_edits(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(FileSpec::new(dir.join("1.txt"), "one\nmore\n".to_string()));

    run_mgit_command(dir, &["diff"])
        .assert()
        .success()
        .stdout("--- a/1.txt\n+++ b/1.txt\n one\n+more\n");
}

#[rstest]
fn hash_object_and_cat_file_round_trip_a_blob(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir.path();
    run_mgit_command(dir, &["init"]).assert().success();
    let files = write_generated_files(dir, 1);
    let file_name = files[0]
        .path
        .file_name()
        .expect("generated files have names")
        .to_string_lossy()
        .to_string();

    let output = run_mgit_command(dir, &["hash-object", "-w", &file_name]).output()?;
    let oid = String::from_utf8(output.stdout)?.trim().to_string();

    run_mgit_command(dir, &["cat-file", "-p", &oid])
        .assert()
        .success()
        .stdout(files[0].content.clone());

    Ok(())
}

/// History:
///   A (f = "hello") <- master
///    \
///     B (f = "world") <- topic
#[rstest]
fn merging_a_descendant_branch_fast_forwards(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir.path();
    run_mgit_command(dir, &["init"]).assert().success();
    write_file(FileSpec::new(dir.join("f"), "hello".to_string()));
    commit_all(dir, "first");
    let first = get_head_commit_sha(dir)?;

    run_mgit_command(dir, &["branch", "topic"]).assert().success();
    run_mgit_command(dir, &["checkout", "topic"]).assert().success();
    write_file(FileSpec::new(dir.join("f"), "world".to_string()));
    commit_all(dir, "second");
    let second = get_head_commit_sha(dir)?;
    run_mgit_command(dir, &["checkout", "master"]).assert().success();

    mgit_merge(dir, "topic")
        .assert()
        .success()
        .stdout(format!(
            "Updating {}..{}\nFast-forward\n",
            &first[..7],
            &second[..7]
        ));

    assert_eq!(read_file(&dir.join("f")), "world");
    assert_eq!(get_branch_tip(dir, "master")?, second);

    Ok(())
}

#[rstest]
fn merging_diverged_branches_records_both_parents(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    run_mgit_command(dir, &["branch", "topic"]).assert().success();
    write_file(FileSpec::new(dir.join("1.txt"), "one on master\n".to_string()));
    commit_all(dir, "master change");
    let master_tip = get_head_commit_sha(dir)?;

    run_mgit_command(dir, &["checkout", "topic"]).assert().success();
    write_file(FileSpec::new(dir.join("a").join("2.txt"), "two on topic\n".to_string()));
    commit_all(dir, "topic change");
    let topic_tip = get_head_commit_sha(dir)?;
    run_mgit_command(dir, &["checkout", "master"]).assert().success();

    mgit_merge(dir, "topic")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Merge made by the 'three-way' strategy.\n",
        ));

    let merge_id = get_head_commit_sha(dir)?;
    assert_eq!(get_parent_commit_ids(dir, &merge_id)?, vec![master_tip, topic_tip]);
    assert_eq!(read_file(&dir.join("1.txt")), "one on master\n");
    assert_eq!(read_file(&dir.join("a").join("2.txt")), "two on topic\n");

    Ok(())
}

#[rstest]
fn conflicting_merge_exits_with_failure_and_keeps_the_tip(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    run_mgit_command(dir, &["branch", "topic"]).assert().success();
    write_file(FileSpec::new(dir.join("1.txt"), "ours\n".to_string()));
    commit_all(dir, "ours");
    let master_tip = get_head_commit_sha(dir)?;

    run_mgit_command(dir, &["checkout", "topic"]).assert().success();
    write_file(FileSpec::new(dir.join("1.txt"), "theirs\n".to_string()));
    commit_all(dir, "theirs");
    run_mgit_command(dir, &["checkout", "master"]).assert().success();

    mgit_merge(dir, "topic")
        .assert()
        .failure()
        .stdout(
            "CONFLICT (content): Merge conflict in 1.txt\n\
             Automatic merge failed; fix conflicts and then commit the result.\n",
        );

    assert_eq!(get_branch_tip(dir, "master")?, master_tip);
    assert_eq!(read_file(&dir.join("1.txt")), "ours\n");
    assert!(dir.join(".mgit").join("MERGE_HEAD").exists());

    run_mgit_command(dir, &["merge", "--abort"])
        .assert()
        .success();
    assert!(!dir.join(".mgit").join("MERGE_HEAD").exists());

    Ok(())
}

#[rstest]
fn a_conflicted_merge_is_concluded_by_commit(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    run_mgit_command(dir, &["branch", "topic"]).assert().success();
    write_file(FileSpec::new(dir.join("1.txt"), "ours\n".to_string()));
    commit_all(dir, "ours");

    run_mgit_command(dir, &["checkout", "topic"]).assert().success();
    write_file(FileSpec::new(dir.join("1.txt"), "theirs\n".to_string()));
    commit_all(dir, "theirs");
    run_mgit_command(dir, &["checkout", "master"]).assert().success();
    mgit_merge(dir, "topic").assert().failure();

    write_file(FileSpec::new(dir.join("1.txt"), "both\n".to_string()));
    run_mgit_command(dir, &["add", "1.txt"]).assert().success();
    mgit_commit(dir, "")
        .assert()
        .success()
        .stdout(predicate::str::ends_with("] Merge branch 'topic'\n"));

    let merge_id = get_head_commit_sha(dir)?;
    assert_eq!(get_parent_commit_ids(dir, &merge_id)?.len(), 2);
    assert!(!dir.join(".mgit").join("MERGE_HEAD").exists());

    Ok(())
}
