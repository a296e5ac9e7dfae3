use posts_core::{
    open_db_in_memory, NewPost, PostsRepository, PostsValidationError, RepoError,
    SqlitePostsRepository,
};

#[test]
fn insert_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePostsRepository::new(&conn);

    let id = repo
        .insert(&NewPost::new("hello", "first body").with_author("jojo"))
        .unwrap();

    let loaded = repo.get_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.title, "hello");
    assert_eq!(loaded.content, "first body");
    assert_eq!(loaded.author.as_deref(), Some("jojo"));
    assert!(loaded.created_at > 0);
    assert_eq!(loaded.created_at, loaded.updated_at);
}

#[test]
fn get_missing_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePostsRepository::new(&conn);

    assert!(repo.get_by_id(42).unwrap().is_none());
    assert!(!repo.exists_by_id(42).unwrap());
}

#[test]
fn ids_are_assigned_in_increasing_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePostsRepository::new(&conn);

    let first = repo.insert(&NewPost::new("a", "")).unwrap();
    let second = repo.insert(&NewPost::new("b", "")).unwrap();
    assert!(second > first);
    assert!(repo.exists_by_id(first).unwrap());
}

#[test]
fn ids_are_not_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePostsRepository::new(&conn);

    let first = repo.insert(&NewPost::new("a", "")).unwrap();
    repo.delete(first).unwrap();
    let second = repo.insert(&NewPost::new("b", "")).unwrap();
    assert!(second > first);
}

#[test]
fn update_existing_post() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePostsRepository::new(&conn);

    let id = repo.insert(&NewPost::new("draft", "body")).unwrap();
    let mut post = repo.get_by_id(id).unwrap().unwrap();
    post.title = "published".to_string();
    post.content = "final body".to_string();
    post.author = Some("editor".to_string());
    repo.update(&post).unwrap();

    let loaded = repo.get_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.title, "published");
    assert_eq!(loaded.content, "final body");
    assert_eq!(loaded.author.as_deref(), Some("editor"));
    assert_eq!(loaded.created_at, post.created_at);
    assert!(loaded.updated_at >= post.updated_at);
}

#[test]
fn update_missing_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePostsRepository::new(&conn);

    let id = repo.insert(&NewPost::new("gone", "")).unwrap();
    let mut post = repo.get_by_id(id).unwrap().unwrap();
    repo.delete(id).unwrap();

    post.title = "still gone".to_string();
    let err = repo.update(&post).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(missing) if missing == id));
}

#[test]
fn delete_missing_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePostsRepository::new(&conn);

    let err = repo.delete(7).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(7)));
}

#[test]
fn count_and_delete_all_track_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePostsRepository::new(&conn);
    assert_eq!(repo.count().unwrap(), 0);

    for title in ["one", "two", "three"] {
        repo.insert(&NewPost::new(title, "")).unwrap();
    }
    assert_eq!(repo.count().unwrap(), 3);

    assert_eq!(repo.delete_all().unwrap(), 3);
    assert_eq!(repo.count().unwrap(), 0);
    assert!(repo.list_all().unwrap().is_empty());
}

#[test]
fn list_all_is_ascending_by_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePostsRepository::new(&conn);

    let ids: Vec<_> = ["a", "b", "c"]
        .into_iter()
        .map(|title| repo.insert(&NewPost::new(title, "")).unwrap())
        .collect();

    let listed: Vec<_> = repo.list_all().unwrap().into_iter().map(|p| p.id).collect();
    assert_eq!(listed, ids);
}

#[test]
fn validation_failure_blocks_insert_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePostsRepository::new(&conn);

    let err = repo.insert(&NewPost::new("  ", "body")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(PostsValidationError::EmptyTitle)
    ));
    assert_eq!(repo.count().unwrap(), 0);

    let id = repo.insert(&NewPost::new("valid", "body")).unwrap();
    let mut post = repo.get_by_id(id).unwrap().unwrap();
    post.title = "x".repeat(posts_core::TITLE_MAX_CHARS + 1);
    let err = repo.update(&post).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(PostsValidationError::TitleTooLong { .. })
    ));
    assert_eq!(repo.get_by_id(id).unwrap().unwrap().title, "valid");
}

#[test]
fn invalid_persisted_row_is_reported_on_read() {
    let conn = open_db_in_memory().unwrap();
    let long_title = "x".repeat(posts_core::TITLE_MAX_CHARS + 1);
    conn.execute("INSERT INTO posts (title) VALUES (?1);", [long_title.as_str()])
        .unwrap();
    let repo = SqlitePostsRepository::new(&conn);

    let err = repo.list_all().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn posts_serialize_with_plain_field_names() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePostsRepository::new(&conn);
    let id = repo.insert(&NewPost::new("json", "body")).unwrap();

    let post = repo.get_by_id(id).unwrap().unwrap();
    let value = serde_json::to_value(&post).unwrap();
    assert_eq!(value["id"], id);
    assert_eq!(value["title"], "json");
    assert!(value["author"].is_null());
}
