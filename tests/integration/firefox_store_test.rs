#[cfg(test)]
mod firefox_store_tests {
    use std::path::Path;

    use rusqlite::{params, Connection};
    use tempfile::tempdir;

    use xcookies::core::export::merge_cookies;
    use xcookies::core::FirefoxStore;

    fn create_cookie_db(path: &Path) -> Connection {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE moz_cookies (
                id INTEGER PRIMARY KEY,
                host TEXT NOT NULL,
                name TEXT NOT NULL,
                value TEXT NOT NULL,
                path TEXT NOT NULL,
                expiry INTEGER NOT NULL,
                isSecure INTEGER NOT NULL,
                isHttpOnly INTEGER NOT NULL
            );",
        )
        .unwrap();
        conn
    }

    fn insert_row(
        conn: &Connection,
        host: &str,
        name: &str,
        value: &str,
        expiry: i64,
        http_only: bool,
    ) {
        conn.execute(
            "INSERT INTO moz_cookies (host, name, value, path, expiry, isSecure, isHttpOnly) \
             VALUES (?1, ?2, ?3, '/', ?4, 1, ?5)",
            params![host, name, value, expiry, http_only],
        )
        .unwrap();
    }

    #[test]
    fn test_reads_rows_for_suffix_in_store_order() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("cookies.sqlite");
        let conn = create_cookie_db(&db);
        insert_row(&conn, ".x.com", "auth_token", "tok", 1_800_000_000, true);
        insert_row(&conn, "www.x.com", "lang", "en", 0, false);
        insert_row(&conn, ".elsewhere.org", "other", "x", 0, false);
        drop(conn);

        let store = FirefoxStore::with_database(db);
        let cookies = store.cookies_for_domain(".x.com").unwrap();

        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].name, "auth_token");
        assert_eq!(cookies[0].expires, Some(1_800_000_000));
        assert_eq!(cookies[0].http_only, Some(true));
        assert_eq!(cookies[1].name, "lang");
        assert_eq!(cookies[1].expires, None);
        assert_eq!(cookies[1].http_only, Some(false));
    }

    #[test]
    fn test_firefox_rows_feed_the_same_pipeline() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("cookies.sqlite");
        let conn = create_cookie_db(&db);
        insert_row(&conn, ".x.com", "auth_token", "apex", 0, true);
        insert_row(&conn, ".twitter.com", "auth_token", "legacy", 0, true);
        drop(conn);

        let store = FirefoxStore::with_database(db);
        let apex = store.cookies_for_domain(".x.com").unwrap();
        let legacy = store.cookies_for_domain(".twitter.com").unwrap();

        let merged = merge_cookies(apex, legacy);

        // Different domains, so both survive deduplication.
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].value, "apex");
        assert_eq!(merged[1].value, "legacy");
    }

    #[test]
    fn test_missing_database_is_a_snapshot_error() {
        let store = FirefoxStore::with_database(Path::new("/nonexistent/cookies.sqlite").into());

        let err = store.cookies_for_domain(".x.com").unwrap_err();

        assert!(err.to_string().contains("cannot snapshot"), "{err}");
    }
}
