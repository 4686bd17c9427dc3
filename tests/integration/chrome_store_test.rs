#[cfg(test)]
mod chrome_store_tests {
    use std::path::Path;

    use rusqlite::{params, Connection};
    use tempfile::tempdir;

    use xcookies::core::browser::ChromeDecryptor;
    use xcookies::core::{ChromeStore, ChromiumBrowser};

    fn create_cookie_db(path: &Path) -> Connection {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE cookies (
                creation_utc INTEGER NOT NULL,
                host_key TEXT NOT NULL,
                name TEXT NOT NULL,
                value TEXT NOT NULL,
                encrypted_value BLOB NOT NULL,
                path TEXT NOT NULL,
                expires_utc INTEGER NOT NULL,
                is_secure INTEGER NOT NULL,
                is_httponly INTEGER NOT NULL
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
        encrypted: &[u8],
        secure: bool,
        http_only: bool,
    ) {
        conn.execute(
            "INSERT INTO cookies (creation_utc, host_key, name, value, encrypted_value, \
                                  path, expires_utc, is_secure, is_httponly) \
             VALUES (0, ?1, ?2, ?3, ?4, '/', 0, ?5, ?6)",
            params![host, name, value, encrypted, secure, http_only],
        )
        .unwrap();
    }

    fn store_for(path: &Path) -> ChromeStore {
        ChromeStore::with_database(
            ChromiumBrowser::Chrome,
            path.to_path_buf(),
            ChromeDecryptor::plaintext_only(),
        )
    }

    #[test]
    fn test_suffix_match_follows_store_semantics() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("Cookies");
        let conn = create_cookie_db(&db);
        insert_row(&conn, ".x.com", "a", "1", b"", true, false);
        insert_row(&conn, "www.x.com", "b", "2", b"", true, false);
        // Neither the bare apex nor a lookalike suffix may match '%.x.com'.
        insert_row(&conn, "x.com", "c", "3", b"", true, false);
        insert_row(&conn, ".notx.com", "d", "4", b"", true, false);
        drop(conn);

        let cookies = store_for(&db).cookies_for_domain(".x.com").unwrap();

        let domains: Vec<&str> = cookies.iter().map(|c| c.domain.as_str()).collect();
        assert_eq!(domains, vec![".x.com", "www.x.com"]);
    }

    #[test]
    fn test_flags_map_through() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("Cookies");
        let conn = create_cookie_db(&db);
        insert_row(&conn, ".x.com", "locked", "1", b"", true, true);
        insert_row(&conn, ".x.com", "open", "2", b"", false, false);
        drop(conn);

        let cookies = store_for(&db).cookies_for_domain(".x.com").unwrap();

        assert!(cookies[0].secure);
        assert_eq!(cookies[0].http_only, Some(true));
        assert!(!cookies[1].secure);
        assert_eq!(cookies[1].http_only, Some(false));
    }

    #[test]
    fn test_plain_value_wins_over_encrypted_column() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("Cookies");
        let conn = create_cookie_db(&db);
        // Both columns populated: the plaintext column is authoritative and
        // the decryptor must not even be consulted.
        insert_row(&conn, ".x.com", "a", "plain", b"v10garbage-not-decryptable", true, false);
        drop(conn);

        let cookies = store_for(&db).cookies_for_domain(".x.com").unwrap();

        assert_eq!(cookies[0].value, "plain");
    }

    #[test]
    fn test_both_columns_empty_yields_empty_value() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("Cookies");
        let conn = create_cookie_db(&db);
        insert_row(&conn, ".x.com", "empty", "", b"", true, false);
        drop(conn);

        let cookies = store_for(&db).cookies_for_domain(".x.com").unwrap();

        assert_eq!(cookies[0].value, "");
    }

    #[test]
    fn test_unencrypted_fixture_rows_decrypt_via_plaintext_path() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("Cookies");
        let conn = create_cookie_db(&db);
        insert_row(&conn, ".x.com", "a", "", b"legacy_plaintext_value", true, false);
        drop(conn);

        let cookies = store_for(&db).cookies_for_domain(".x.com").unwrap();

        assert_eq!(cookies[0].value, "legacy_plaintext_value");
    }

    #[test]
    fn test_malformed_database_is_a_query_error() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("Cookies");
        std::fs::write(&db, b"this is not a sqlite database").unwrap();

        let err = store_for(&db).cookies_for_domain(".x.com").unwrap_err();

        assert!(err.to_string().contains("query failed"), "{err}");
    }
}
