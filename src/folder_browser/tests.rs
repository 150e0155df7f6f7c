use std::fs;
use std::sync::Arc;

use tempfile::tempdir;

use crate::test_support::FakeVcs;
use crate::vcs::ADM_DIR_NAME;

use super::*;

const REPO: &str = "https://svn.example.org/repos/project";

fn browser_with(paths: &[&str], client: FakeVcs) -> FolderBrowser {
    let mut bookmarks = Bookmarks::new();
    for path in paths {
        bookmarks.add(path);
    }
    FolderBrowser::new(bookmarks, Arc::new(client))
}

fn labels(browser: &FolderBrowser, id: NodeId) -> Vec<String> {
    browser
        .children(id)
        .iter()
        .filter_map(|child| browser.item(*child))
        .map(|data| data.label.clone())
        .collect()
}

#[test]
fn short_paths_are_unchanged() {
    let exact = "x".repeat(MAX_LABEL_LEN);
    for path in ["", "/", "/home/user/work", "svn://host/repo", exact.as_str()] {
        assert_eq!(beautify_path(path), path);
    }
}

#[test]
fn long_paths_are_shortened_to_exact_length_with_original_suffix() {
    let samples = [
        "/home/users/xela/work/rapidsvn/src/svncpp",
        r"d:\Documents and Settings\alex\Application Data",
        "https://svn.collab.net/repos/rapidsvn/trunk/src/svncpp",
        "relative/path/without/any/scheme/or/root/at/all",
        "averyveryveryveryverylongfoldernamewithoutseparators",
        "odd:path/with/a/colon/placed/much/later/than/usual/here",
        "/home/ünïcödé/dïrëctörÿ/nämes/thät/äre/löng",
    ];
    for path in samples {
        let shown = beautify_path(path);
        assert_eq!(shown.chars().count(), MAX_LABEL_LEN, "{shown}");
        let tail: String = shown.chars().skip_while(|c| *c != '.').skip(3).collect();
        assert!(path.ends_with(&tail), "{path} -> {shown}");
    }
}

#[test]
fn shortening_keeps_root_prefix() {
    assert!(beautify_path("/home/users/xela/work/rapidsvn/src/svncpp").starts_with("/..."));
    assert!(beautify_path(r"d:\Documents and Settings\alex\Application Data").starts_with(r"D:\..."));
    assert!(beautify_path("https://svn.collab.net/repos/rapidsvn/trunk/src/svncpp").starts_with("https://..."));
    assert!(beautify_path("relative/path/without/any/scheme/or/root/at/all").starts_with("..."));
}

#[test]
fn root_expands_to_sorted_bookmarks() {
    let long = "https://svn.example.org/repos/a/very/long/project/trunk";
    let mut browser = browser_with(&["/zeta", long, "/Alpha"], FakeVcs::new());
    let root = browser.root();
    assert_eq!(browser.expand(root).unwrap(), 3);
    assert_eq!(
        labels(&browser, root),
        vec!["/Alpha".to_string(), "/zeta".to_string(), beautify_path(long)]
    );
    let bookmark = browser.children(root)[2];
    let data = browser.item(bookmark).unwrap();
    assert_eq!(data.folder_type, FolderType::Bookmark);
    assert_eq!(data.path, long);
    assert!(data.is_real);
    assert_eq!(browser.node(bookmark).unwrap().icon(), FolderIcon::Repository);
}

#[test]
fn empty_bookmark_list_retracts_root_expander_until_collapse() {
    let mut browser = browser_with(&[], FakeVcs::new());
    let root = browser.root();
    assert_eq!(browser.expand(root).unwrap(), 0);
    assert!(!browser.node(root).unwrap().is_expandable());
    assert!(browser.collapse(root));
    assert!(browser.node(root).unwrap().is_expandable());
}

#[test]
fn local_scan_hides_admin_dir_and_files() {
    let dir = tempdir().unwrap();
    let base = dir.path();
    fs::create_dir(base.join(ADM_DIR_NAME)).unwrap();
    fs::create_dir_all(base.join("src/nested")).unwrap();
    fs::create_dir_all(base.join("docs").join(ADM_DIR_NAME)).unwrap();
    fs::write(base.join("README.txt"), "hello").unwrap();

    let wc = base.to_string_lossy().into_owned();
    let mut browser = browser_with(&[&wc], FakeVcs::new());
    browser.expand(browser.root()).unwrap();
    let bookmark = browser.children(browser.root())[0];
    assert_eq!(browser.node(bookmark).unwrap().icon(), FolderIcon::Folder);
    assert_eq!(browser.expand(bookmark).unwrap(), 2);
    assert_eq!(labels(&browser, bookmark), vec!["docs", "src"]);

    let docs = browser.children(bookmark)[0];
    let src = browser.children(bookmark)[1];
    assert!(!browser.node(docs).unwrap().is_expandable());
    assert!(browser.node(src).unwrap().is_expandable());
    assert_eq!(browser.node(src).unwrap().icon(), FolderIcon::Folder);
    assert_eq!(
        std::path::Path::new(&browser.item(src).unwrap().path),
        base.join("src")
    );
}

#[test]
fn unversioned_children_inside_a_working_copy_are_classified_individually() {
    let dir = tempdir().unwrap();
    let base = dir.path();
    fs::create_dir(base.join(ADM_DIR_NAME)).unwrap();
    fs::create_dir(base.join("src")).unwrap();
    fs::create_dir(base.join("build")).unwrap();
    fs::create_dir_all(base.join("build").join("vendor").join(ADM_DIR_NAME)).unwrap();

    let wc = base.to_string_lossy().into_owned();
    let client = FakeVcs::new().with_unversioned(base.join("build"));
    let mut browser = browser_with(&[&wc], client);
    browser.expand(browser.root()).unwrap();
    let bookmark = browser.children(browser.root())[0];
    browser.expand(bookmark).unwrap();
    assert_eq!(labels(&browser, bookmark), vec!["build", "src"]);

    let build = browser.children(bookmark)[0];
    let src = browser.children(bookmark)[1];
    assert_eq!(browser.node(build).unwrap().icon(), FolderIcon::NonVersionedFolder);
    assert_eq!(browser.node(src).unwrap().icon(), FolderIcon::Folder);

    // a checkout nested in an unversioned folder is versioned again
    browser.expand(build).unwrap();
    let vendor = browser.children(build)[0];
    assert_eq!(browser.node(vendor).unwrap().icon(), FolderIcon::Folder);
}

#[test]
fn unversioned_local_folders_get_their_own_icon() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("plain")).unwrap();
    let path = dir.path().to_string_lossy().into_owned();
    let mut browser = browser_with(&[&path], FakeVcs::new());
    browser.expand(browser.root()).unwrap();
    let bookmark = browser.children(browser.root())[0];
    assert_eq!(browser.node(bookmark).unwrap().icon(), FolderIcon::NonVersionedFolder);
    browser.expand(bookmark).unwrap();
    let plain = browser.children(bookmark)[0];
    assert_eq!(browser.node(plain).unwrap().icon(), FolderIcon::NonVersionedFolder);
}

#[test]
fn repository_scan_keeps_only_directories() {
    let client = FakeVcs::new().with_listing(REPO, &["trunk", "branches", "tags"], &["README", "LICENSE"]);
    let mut browser = browser_with(&[REPO], client);
    browser.expand(browser.root()).unwrap();
    let bookmark = browser.children(browser.root())[0];
    assert_eq!(browser.expand(bookmark).unwrap(), 3);
    assert_eq!(labels(&browser, bookmark), vec!["branches", "tags", "trunk"]);
    for child in browser.children(bookmark) {
        let node = browser.node(*child).unwrap();
        assert!(node.is_expandable());
        assert_eq!(node.icon(), FolderIcon::Repository);
        assert!(node.data().path.starts_with(REPO));
    }
}

#[test]
fn expand_then_collapse_leaves_node_expandable_and_empty() {
    let client = FakeVcs::new().with_listing(REPO, &["trunk"], &[]);
    let mut browser = browser_with(&[REPO], client);
    browser.expand(browser.root()).unwrap();
    let bookmark = browser.children(browser.root())[0];
    let before = browser.node_count();

    browser.expand(bookmark).unwrap();
    let trunk = browser.children(bookmark)[0];
    assert!(browser.collapse(bookmark));

    let node = browser.node(bookmark).unwrap();
    assert_eq!(node.state(), NodeState::Collapsed);
    assert!(node.is_expandable());
    assert!(browser.children(bookmark).is_empty());
    assert!(!browser.contains(trunk));
    assert_eq!(browser.node_count(), before);
    assert!(!browser.collapse(bookmark));
}

#[test]
fn every_expand_re_reads_the_repository() {
    let client = Arc::new(FakeVcs::new().with_listing(REPO, &["trunk"], &[]));
    let mut bookmarks = Bookmarks::new();
    bookmarks.add(REPO);
    let mut browser = FolderBrowser::new(bookmarks, client.clone());
    browser.expand(browser.root()).unwrap();
    let bookmark = browser.children(browser.root())[0];
    browser.expand(bookmark).unwrap();
    browser.collapse(bookmark);
    browser.expand(bookmark).unwrap();
    let lists = client.calls().iter().filter(|call| call.op == "list").count();
    assert_eq!(lists, 2);
}

#[test]
fn failed_listing_leaves_node_collapsed_with_expander() {
    let mut browser = browser_with(&["svn://host/missing"], FakeVcs::new());
    browser.expand(browser.root()).unwrap();
    let bookmark = browser.children(browser.root())[0];
    assert!(matches!(
        browser.expand(bookmark),
        Err(BrowseError::Listing { .. })
    ));
    let node = browser.node(bookmark).unwrap();
    assert_eq!(node.state(), NodeState::Collapsed);
    assert!(node.is_expandable());
}

#[test]
fn collapse_moves_nested_selection_to_collapsed_node() {
    let client = FakeVcs::new().with_listing(REPO, &["trunk"], &[]);
    let mut browser = browser_with(&[REPO], client);
    browser.expand(browser.root()).unwrap();
    let bookmark = browser.children(browser.root())[0];
    browser.expand(bookmark).unwrap();
    let trunk = browser.children(bookmark)[0];
    assert!(browser.select(trunk));
    browser.collapse(bookmark);
    assert_eq!(browser.selection(), Some(bookmark));
}

#[test]
fn select_bookmark_and_folder_by_exact_path() {
    let client = FakeVcs::new().with_listing(REPO, &["trunk", "tags"], &[]);
    let mut browser = browser_with(&[REPO, "/elsewhere"], client);
    browser.expand(browser.root()).unwrap();

    assert!(!browser.select_bookmark("https://svn.example.org/repos"));
    assert_eq!(browser.selection(), None);
    assert!(browser.select_bookmark(REPO));
    let bookmark = browser.selection().unwrap();

    let missing = format!("{REPO}/branches");
    assert!(!browser.select_folder(&missing));
    assert_eq!(browser.selection(), Some(bookmark));
    assert!(browser.is_expanded(bookmark));

    let trunk = format!("{REPO}/trunk");
    assert!(browser.select_folder(&trunk));
    assert_eq!(browser.get_path(), Some(trunk.as_str()));
}

#[test]
fn select_folder_needs_a_real_selection() {
    let mut browser = browser_with(&[REPO], FakeVcs::new());
    assert!(!browser.select_folder(REPO));
    browser.select(browser.root());
    assert!(!browser.select_folder(REPO));
}

#[test]
fn context_is_resolved_from_the_enclosing_bookmark() {
    let client = FakeVcs::new()
        .with_listing(REPO, &["trunk"], &[])
        .with_listing(&format!("{REPO}/trunk"), &["src"], &[]);
    let mut browser = browser_with(&[REPO], client);
    browser
        .bookmarks_mut()
        .set_context(REPO, AuthContext::new("alice", Some("pw".into())));
    browser.expand(browser.root()).unwrap();
    let bookmark = browser.children(browser.root())[0];
    browser.expand(bookmark).unwrap();
    let trunk = browser.children(bookmark)[0];
    browser.expand(trunk).unwrap();
    let src = browser.children(trunk)[0];

    browser.select(src);
    assert_eq!(browser.get_context().map(|c| c.username.as_str()), Some("alice"));
    browser.select(browser.root());
    assert!(browser.get_context().is_none());

    browser.set_auth_per_bookmark(false);
    browser.select(src);
    assert!(browser.get_context().is_none());
}

#[test]
fn repository_listing_uses_bookmark_login() {
    let client = Arc::new(
        FakeVcs::new()
            .with_listing(REPO, &["trunk"], &[])
            .with_listing(&format!("{REPO}/trunk"), &[], &[]),
    );
    let mut bookmarks = Bookmarks::new();
    bookmarks.add(REPO);
    bookmarks.set_context(REPO, AuthContext::new("bob", None));
    let mut browser = FolderBrowser::new(bookmarks, client.clone());
    browser.expand(browser.root()).unwrap();
    let bookmark = browser.children(browser.root())[0];
    browser.expand(bookmark).unwrap();
    let trunk = browser.children(bookmark)[0];
    assert_eq!(browser.expand(trunk).unwrap(), 0);
    assert!(!browser.node(trunk).unwrap().is_expandable());
    assert!(
        client
            .calls()
            .iter()
            .all(|call| call.username.as_deref() == Some("bob"))
    );
}

#[test]
fn remove_bookmark_drops_node_and_entry() {
    let mut browser = browser_with(&[REPO, "/work"], FakeVcs::new());
    browser.expand(browser.root()).unwrap();
    assert!(!browser.remove_bookmark());
    browser.select(browser.root());
    assert!(!browser.remove_bookmark());

    assert!(browser.select_bookmark("/work"));
    assert!(browser.remove_bookmark());
    assert_eq!(browser.bookmarks().count(), 1);
    assert_eq!(browser.children(browser.root()).len(), 1);
    assert_eq!(browser.selection(), None);
    assert!(!browser.select_bookmark("/work"));
}

#[test]
fn refresh_shows_added_bookmarks() {
    let mut browser = browser_with(&["/a"], FakeVcs::new());
    browser.expand(browser.root()).unwrap();
    assert!(browser.add_bookmark("/b"));
    assert!(!browser.add_bookmark("/b"));
    assert_eq!(browser.children(browser.root()).len(), 1);
    browser.refresh().unwrap();
    assert_eq!(labels(&browser, browser.root()), vec!["/a", "/b"]);
}

#[test]
fn refresh_node_ignores_collapsed_and_dead_nodes() {
    let client = FakeVcs::new().with_listing(REPO, &["trunk"], &[]);
    let mut browser = browser_with(&[REPO], client);
    browser.expand(browser.root()).unwrap();
    let bookmark = browser.children(browser.root())[0];
    browser.refresh_node(bookmark).unwrap();
    assert!(!browser.is_expanded(bookmark));

    browser.expand(bookmark).unwrap();
    let old_trunk = browser.children(bookmark)[0];
    browser.refresh_node(bookmark).unwrap();
    assert!(browser.is_expanded(bookmark));
    assert!(!browser.contains(old_trunk));
    assert_eq!(browser.children(bookmark).len(), 1);

    browser.collapse(browser.root());
    browser.refresh_node(bookmark).unwrap();
}

#[test]
fn context_menu_matches_node_kind() {
    let local = "/home/alice/work";
    let mut browser = browser_with(&[REPO, local], FakeVcs::new());
    browser
        .bookmarks_mut()
        .set_context(local, AuthContext::new("alice", None));
    browser.expand(browser.root()).unwrap();

    let commands = |entries: Vec<MenuEntry>| -> Vec<MenuCommand> {
        entries.iter().filter_map(MenuEntry::command).collect()
    };

    assert_eq!(
        commands(browser.context_menu(browser.root())),
        vec![MenuCommand::AddWcBookmark, MenuCommand::AddRepoBookmark]
    );

    let local_id = browser.children(browser.root())[0];
    let menu = browser.context_menu(local_id);
    assert!(menu.contains(&MenuEntry::Item {
        command: MenuCommand::Logout,
        label: "Logout 'alice'".into(),
        enabled: true,
    }));
    assert!(commands(menu).contains(&MenuCommand::Commit));

    let repo_id = browser.children(browser.root())[1];
    let menu = browser.context_menu(repo_id);
    assert!(menu.contains(&MenuEntry::Item {
        command: MenuCommand::Logout,
        label: "Logout".into(),
        enabled: false,
    }));
    let repo_commands = commands(menu);
    assert!(!repo_commands.contains(&MenuCommand::Update));
    assert!(repo_commands.contains(&MenuCommand::Export));
}
