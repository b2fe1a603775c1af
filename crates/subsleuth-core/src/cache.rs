//! Local cache of the EventSub listing and resolved users.
//!
//! Two files live in the cache directory:
//! - `subs.json`: the raw `eventsub/subscriptions` response, downloaded once.
//!   Deleting it is the only way to refresh.
//! - `users.json`: the user directory, written through after every lookup
//!   that returned new users.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::models::{SubscriptionSnapshot, User, UserDirectory, UserResponse};
use crate::twitch::{self, CliRunner};

/// Shown in place of a display name that could not be resolved.
pub const UNKNOWN_USER_GLYPH: &str = "\u{1f47e}";

pub const SUBSCRIPTIONS_FILE: &str = "subs.json";
pub const USERS_FILE: &str = "users.json";

/// Cache store context, constructed once at startup.
#[derive(Debug)]
pub struct Cache<R> {
    subs_path: PathBuf,
    users_path: PathBuf,
    users: UserDirectory,
    runner: R,
}

impl<R: CliRunner> Cache<R> {
    /// Open (creating if needed) the cache directory. The user directory
    /// starts empty until [`Cache::load_users`] is called.
    pub fn open(dir: impl Into<PathBuf>, runner: R) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            info!(dir = %dir.display(), "cache directory not found, creating");
        }
        std::fs::create_dir_all(&dir).map_err(|e| {
            Error::CacheDir(format!("failed to create {}: {e}", dir.display()))
        })?;
        Ok(Self {
            subs_path: dir.join(SUBSCRIPTIONS_FILE),
            users_path: dir.join(USERS_FILE),
            users: UserDirectory::default(),
            runner,
        })
    }

    pub fn subscriptions_path(&self) -> &Path {
        &self.subs_path
    }

    pub fn users_path(&self) -> &Path {
        &self.users_path
    }

    pub const fn users(&self) -> &UserDirectory {
        &self.users
    }

    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// Download the subscription listing unless `subs.json` already exists.
    ///
    /// The payload is written verbatim; it is only parsed for logging, so a
    /// malformed response still lands on disk.
    pub fn ensure_subscriptions_cached(&self) -> Result<()> {
        if self.subs_path.exists() {
            debug!(path = %self.subs_path.display(), "subscriptions already cached");
            return Ok(());
        }

        info!("downloading and caching subscriptions from twitch");
        let raw = self.runner.run(&twitch::subscriptions_args())?;

        match serde_json::from_slice::<SubscriptionSnapshot>(&raw) {
            Ok(snap) => debug!(
                count = snap.data.len(),
                total = snap.total,
                "downloaded subscriptions"
            ),
            Err(e) => warn!(%e, "downloaded subscriptions did not parse, caching anyway"),
        }

        std::fs::write(&self.subs_path, &raw)?;
        debug!(bytes = raw.len(), "wrote subscriptions cache");
        Ok(())
    }

    /// Read and decode `subs.json`.
    pub fn load_snapshot(&self) -> Result<SubscriptionSnapshot> {
        let raw = std::fs::read(&self.subs_path)?;
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Load `users.json` into memory. Unreadable or corrupt files leave the
    /// directory empty.
    pub fn load_users(&mut self) {
        if !self.users_path.exists() {
            self.users = UserDirectory::default();
            return;
        }
        self.users = std::fs::read(&self.users_path)
            .map_err(Error::from)
            .and_then(|raw| serde_json::from_slice(&raw).map_err(Error::from))
            .unwrap_or_else(|e| {
                error!(%e, path = %self.users_path.display(), "failed to load user cache");
                UserDirectory::default()
            });
        debug!(count = self.users.len(), "users loaded");
    }

    /// Overwrite `users.json` with the in-memory directory.
    ///
    /// Serialization failure is returned; write failure is only logged.
    pub fn flush_users(&self) -> Result<()> {
        let data = serde_json::to_vec(&self.users)?;
        if let Err(e) = std::fs::write(&self.users_path, data) {
            warn!(%e, path = %self.users_path.display(), "failed to write user cache");
        }
        Ok(())
    }

    /// Linear lookup by id; an empty [`User`] when absent.
    pub fn user_by_id(&self, id: &str) -> User {
        self.users.find_by_id(id).cloned().unwrap_or_default()
    }

    /// Linear lookup by login name; an empty [`User`] when absent.
    pub fn user_by_login(&self, login: &str) -> User {
        self.users.find_by_login(login).cloned().unwrap_or_default()
    }

    /// Look up several ids in one CLI call, store every returned user
    /// (replacing entries with the same id) and persist the directory.
    /// Returns the users the CLI sent back.
    pub fn fetch_users<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<Vec<User>> {
        let raw = self.runner.run(&twitch::users_args(ids))?;
        let response: UserResponse = serde_json::from_slice(&raw)?;
        if response.data.is_empty() {
            return Ok(response.data);
        }
        self.users.upsert(response.data.iter().cloned());
        self.flush_users()?;
        Ok(response.data)
    }

    /// Resolve a broadcaster id to a display name, consulting the CLI on a
    /// miss. Never fails: unresolved ids map to [`UNKNOWN_USER_GLYPH`].
    pub fn resolve_display_name(&mut self, broadcaster_id: &str) -> String {
        if let Some(user) = self.users.find_by_id(broadcaster_id) {
            return user.display_name.clone();
        }

        match self.fetch_users(&[broadcaster_id]) {
            Ok(users) => match users.into_iter().next() {
                Some(user) => user.display_name,
                None => {
                    warn!(broadcaster_id, "user lookup returned no users");
                    UNKNOWN_USER_GLYPH.to_string()
                }
            },
            Err(e) => {
                error!(%e, broadcaster_id, "failed to get broadcaster username");
                UNKNOWN_USER_GLYPH.to_string()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;

    /// Runner returning queued responses and recording every call.
    #[derive(Debug, Default)]
    pub struct FakeRunner {
        responses: RefCell<VecDeque<Result<Vec<u8>>>>,
        pub calls: RefCell<Vec<Vec<String>>>,
    }

    impl FakeRunner {
        pub fn respond(self, body: &str) -> Self {
            self.responses
                .borrow_mut()
                .push_back(Ok(body.as_bytes().to_vec()));
            self
        }

        pub fn fail(self) -> Self {
            self.responses.borrow_mut().push_back(Err(Error::ToolExecution {
                command: "twitch".into(),
                reason: "exit status: 1".into(),
            }));
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl CliRunner for FakeRunner {
        fn run(&self, args: &[String]) -> Result<Vec<u8>> {
            self.calls.borrow_mut().push(args.to_vec());
            self.responses
                .borrow_mut()
                .pop_front()
                .expect("unexpected CLI call")
        }
    }

    fn user(id: &str, login: &str, name: &str) -> User {
        User {
            id: id.into(),
            login: login.into(),
            display_name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn open_creates_nested_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a").join("subsleuth");
        let cache = Cache::open(&dir, FakeRunner::default()).unwrap();
        assert!(dir.is_dir());
        assert_eq!(cache.subscriptions_path(), dir.join("subs.json"));
        assert_eq!(cache.users_path(), dir.join("users.json"));
    }

    #[test]
    fn open_on_file_is_cache_dir_error() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("taken");
        std::fs::write(&file, "x").unwrap();
        let err = Cache::open(&file, FakeRunner::default()).unwrap_err();
        assert!(matches!(err, Error::CacheDir(_)));
    }

    #[test]
    fn ensure_downloads_once_and_writes_verbatim() {
        let tmp = tempfile::tempdir().unwrap();
        let body = r#"{"data":[],"pagination":{"cursor":""},"total":0}"#;
        let cache = Cache::open(tmp.path(), FakeRunner::default().respond(body)).unwrap();

        cache.ensure_subscriptions_cached().unwrap();
        cache.ensure_subscriptions_cached().unwrap();

        assert_eq!(cache.runner().call_count(), 1);
        assert_eq!(
            cache.runner().calls.borrow()[0],
            twitch::subscriptions_args()
        );
        assert_eq!(
            std::fs::read_to_string(cache.subscriptions_path()).unwrap(),
            body
        );
    }

    #[test]
    fn ensure_writes_malformed_payload_as_is() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = Cache::open(tmp.path(), FakeRunner::default().respond("not json")).unwrap();
        cache.ensure_subscriptions_cached().unwrap();
        assert_eq!(
            std::fs::read_to_string(cache.subscriptions_path()).unwrap(),
            "not json"
        );
        assert!(cache.load_snapshot().is_err());
    }

    #[test]
    fn ensure_propagates_cli_failure_without_writing() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = Cache::open(tmp.path(), FakeRunner::default().fail()).unwrap();
        assert!(cache.ensure_subscriptions_cached().is_err());
        assert!(!cache.subscriptions_path().exists());
    }

    #[test]
    fn load_users_missing_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cache = Cache::open(tmp.path(), FakeRunner::default()).unwrap();
        cache.load_users();
        assert!(cache.users().is_empty());
    }

    #[test]
    fn load_users_corrupt_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(USERS_FILE), "{ not valid json !!!").unwrap();
        let mut cache = Cache::open(tmp.path(), FakeRunner::default()).unwrap();
        cache.load_users();
        assert!(cache.users().is_empty());
    }

    #[test]
    fn lookups_return_empty_user_on_miss() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cache = Cache::open(tmp.path(), FakeRunner::default()).unwrap();
        cache.users.upsert([user("1", "acme", "Acme")]);

        assert_eq!(cache.user_by_id("1").display_name, "Acme");
        assert_eq!(cache.user_by_login("acme").id, "1");
        assert!(cache.user_by_id("2").is_empty());
        assert!(cache.user_by_login("Acme").is_empty());
    }

    #[test]
    fn resolve_miss_fetches_appends_and_flushes() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = FakeRunner::default()
            .respond(r#"{"data":[{"id":"123","login":"acme","display_name":"Acme"}]}"#);
        let mut cache = Cache::open(tmp.path(), runner).unwrap();

        assert_eq!(cache.resolve_display_name("123"), "Acme");
        assert_eq!(cache.runner().call_count(), 1);
        assert_eq!(
            cache.runner().calls.borrow()[0],
            twitch::users_args(&["123"])
        );
        assert!(!cache.user_by_id("123").is_empty());

        assert_eq!(cache.resolve_display_name("123"), "Acme");
        assert_eq!(cache.runner().call_count(), 1);

        let persisted: UserDirectory =
            serde_json::from_slice(&std::fs::read(cache.users_path()).unwrap()).unwrap();
        assert_eq!(persisted.users[0].id, "123");
    }

    #[test]
    fn resolve_hit_makes_no_cli_call() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cache = Cache::open(tmp.path(), FakeRunner::default()).unwrap();
        cache.users.upsert([user("7", "seven", "Seven")]);
        assert_eq!(cache.resolve_display_name("7"), "Seven");
        assert_eq!(cache.runner().call_count(), 0);
    }

    #[test]
    fn resolve_cli_failure_yields_glyph() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cache = Cache::open(tmp.path(), FakeRunner::default().fail()).unwrap();
        assert_eq!(cache.resolve_display_name("9"), UNKNOWN_USER_GLYPH);
        assert!(cache.users().is_empty());
        assert!(!cache.users_path().exists());
    }

    #[test]
    fn resolve_empty_result_stays_unresolved() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = FakeRunner::default()
            .respond(r#"{"data":[]}"#)
            .respond(r#"{"data":[]}"#);
        let mut cache = Cache::open(tmp.path(), runner).unwrap();

        assert_eq!(cache.resolve_display_name("404"), UNKNOWN_USER_GLYPH);
        assert!(cache.users().is_empty());
        assert!(!cache.users_path().exists());

        // Still a miss, so the next call asks again.
        assert_eq!(cache.resolve_display_name("404"), UNKNOWN_USER_GLYPH);
        assert_eq!(cache.runner().call_count(), 2);
    }

    #[test]
    fn resolve_garbage_response_yields_glyph() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = FakeRunner::default().respond("Error: unauthorized");
        let mut cache = Cache::open(tmp.path(), runner).unwrap();
        assert_eq!(cache.resolve_display_name("1"), UNKNOWN_USER_GLYPH);
        assert!(cache.users().is_empty());
    }

    #[test]
    fn fetch_users_stores_every_returned_user() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = FakeRunner::default().respond(
            r#"{"data":[{"id":"1","display_name":"One"},{"id":"2","display_name":"Two"}]}"#,
        );
        let mut cache = Cache::open(tmp.path(), runner).unwrap();

        let users = cache.fetch_users(&["1", "2"]).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(cache.users().len(), 2);
        assert_eq!(
            cache.runner().calls.borrow()[0],
            vec!["api", "get", "users", "-q", "id=1", "-q", "id=2"]
        );
        assert_eq!(cache.resolve_display_name("2"), "Two");
        assert_eq!(cache.runner().call_count(), 1);
    }

    #[test]
    fn refetching_cached_id_keeps_one_entry() {
        let body = r#"{"data":[{"id":"1","display_name":"One"}]}"#;
        let tmp = tempfile::tempdir().unwrap();
        let runner = FakeRunner::default().respond(body).respond(body);
        let mut cache = Cache::open(tmp.path(), runner).unwrap();

        cache.fetch_users(&["1"]).unwrap();
        cache.fetch_users(&["1"]).unwrap();
        assert_eq!(cache.users().len(), 1);

        cache.load_users();
        assert_eq!(cache.users().len(), 1);
    }

    #[test]
    fn mismatched_lookup_reply_does_not_grow_directory() {
        let body = r#"{"data":[{"id":"999","display_name":"Other"}]}"#;
        let tmp = tempfile::tempdir().unwrap();
        let runner = FakeRunner::default().respond(body).respond(body).respond(body);
        let mut cache = Cache::open(tmp.path(), runner).unwrap();

        for _ in 0..3 {
            cache.resolve_display_name("1");
        }
        assert_eq!(cache.runner().call_count(), 3);
        assert_eq!(cache.users().len(), 1);
        assert!(cache.user_by_id("1").is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn flush_write_failure_is_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cache = Cache::open(tmp.path(), FakeRunner::default()).unwrap();
        cache.users.upsert([user("1", "a", "A")]);
        // A directory where the file should be makes the write fail.
        std::fs::create_dir(cache.users_path()).unwrap();
        assert!(cache.flush_users().is_ok());
    }
}
