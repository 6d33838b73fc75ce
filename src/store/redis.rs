//! Redis-backed lock store (optional).
//!
//! Uses `SET key value NX` for acquisition, so mutual exclusion is enforced
//! by the server in a single round trip. Keys carry no expiry.

use super::{LockStore, StoreResult};
use crate::key::LockKey;
use redis::Commands;
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Deletes the key only while it still holds the caller's value.
const COMPARE_AND_DELETE: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

/// Lock store talking to a Redis server.
///
/// One connection is opened lazily and reused for every operation. A
/// connection that drops is discarded and the next operation reconnects.
pub struct RedisStore {
    client: redis::Client,
    conn: Mutex<Option<redis::Connection>>,
}

impl RedisStore {
    pub fn open(redis_url: impl AsRef<str>) -> StoreResult<Self> {
        let client = redis::Client::open(redis_url.as_ref())?;
        Ok(Self {
            client,
            conn: Mutex::new(None),
        })
    }

    fn with_connection<T>(
        &self,
        op: impl FnOnce(&mut redis::Connection) -> redis::RedisResult<T>,
    ) -> StoreResult<T> {
        let mut slot = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut conn = match slot.take() {
            Some(conn) => conn,
            None => {
                tracing::debug!("opening redis connection");
                self.client.get_connection()?
            }
        };

        let result = op(&mut conn);
        match &result {
            Err(e) if e.is_connection_dropped() || e.is_io_error() => {
                tracing::debug!(error = %e, "dropping broken redis connection");
            }
            _ => *slot = Some(conn),
        }
        Ok(result?)
    }
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl LockStore for RedisStore {
    fn set_if_absent(&self, key: &LockKey, value: &[u8]) -> StoreResult<bool> {
        let reply: Option<String> = self.with_connection(|conn| {
            redis::cmd("SET")
                .arg(key.as_str())
                .arg(value)
                .arg("NX")
                .query(conn)
        })?;
        tracing::trace!(key = %key, acquired = reply.is_some(), "redis SET NX");
        Ok(reply.is_some())
    }

    fn delete(&self, key: &LockKey) -> StoreResult<()> {
        let _: i64 = self.with_connection(|conn| conn.del(key.as_str()))?;
        Ok(())
    }

    fn delete_if_value(&self, key: &LockKey, expected: &[u8]) -> StoreResult<bool> {
        let removed: i64 = self.with_connection(|conn| {
            redis::Script::new(COMPARE_AND_DELETE)
                .key(key.as_str())
                .arg(expected)
                .invoke(conn)
        })?;
        Ok(removed == 1)
    }

    fn exists(&self, key: &LockKey) -> StoreResult<bool> {
        self.with_connection(|conn| conn.exists(key.as_str()))
    }

    fn get(&self, key: &LockKey) -> StoreResult<Option<Vec<u8>>> {
        self.with_connection(|conn| conn.get(key.as_str()))
    }

    fn keys(&self, prefix: &str) -> StoreResult<Vec<LockKey>> {
        let pattern = format!("{}*", escape_glob(prefix));
        let found: Vec<String> = self.with_connection(|conn| {
            Ok(conn.scan_match::<_, String>(pattern)?.collect())
        })?;
        let mut keys: Vec<LockKey> = found.into_iter().map(LockKey::new).collect();
        keys.sort();
        keys.dedup();
        Ok(keys)
    }
}

/// Escape Redis glob metacharacters so the prefix matches literally.
fn escape_glob(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
