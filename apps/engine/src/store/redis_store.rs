use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError, Script};
use tracing::{info, warn};

use super::{GameStore, Keyspace, StoreError};
use crate::domain::ids::GameId;

// KEYS[1] game key, KEYS[2] active set; ARGV[1] snapshot, ARGV[2] game id
const INSERT_LUA: &str = r#"
if redis.call('SET', KEYS[1], ARGV[1], 'NX') then
  redis.call('SADD', KEYS[2], ARGV[2])
  return 1
end
return 0
"#;

// KEYS[1] game key; ARGV[1] expected version, ARGV[2] snapshot.
// KEEPTTL leaves external expiry of the snapshot untouched.
const CAS_LUA: &str = r#"
local current = redis.call('GET', KEYS[1])
if not current then
  return 0
end
local ok, doc = pcall(cjson.decode, current)
if not ok or type(doc) ~= 'table' or tonumber(doc['version']) ~= tonumber(ARGV[1]) then
  return 0
end
redis.call('SET', KEYS[1], ARGV[2], 'KEEPTTL')
return 1
"#;

impl From<RedisError> for StoreError {
    fn from(err: RedisError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Redis-backed store. Version checks run inside Lua scripts so the
/// read-compare-write is atomic on the server.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    keys: Keyspace,
    insert_script: Script,
    cas_script: Script,
}

impl RedisStore {
    pub async fn connect(redis_url: &str, namespace: &str) -> Result<Self, StoreError> {
        let client = Client::open(redis_url)
            .map_err(|err| StoreError::Unavailable(format!("Invalid redis url: {err}")))?;
        let conn = ConnectionManager::new(client).await?;
        info!(namespace, "Connected to redis game store");

        Ok(Self {
            conn,
            keys: Keyspace::new(namespace),
            insert_script: Script::new(INSERT_LUA),
            cas_script: Script::new(CAS_LUA),
        })
    }
}

#[async_trait]
impl GameStore for RedisStore {
    async fn insert(&self, id: &GameId, _version: u64, snapshot: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let inserted: i64 = self
            .insert_script
            .key(self.keys.game_key(id))
            .key(self.keys.active_key())
            .arg(snapshot)
            .arg(id.as_str())
            .invoke_async(&mut conn)
            .await?;
        Ok(inserted == 1)
    }

    async fn get(&self, id: &GameId) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.keys.game_key(id)).await?;
        Ok(raw)
    }

    async fn compare_and_swap(
        &self,
        id: &GameId,
        expected: u64,
        _version: u64,
        snapshot: &str,
    ) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let swapped: i64 = self
            .cas_script
            .key(self.keys.game_key(id))
            .arg(expected)
            .arg(snapshot)
            .invoke_async(&mut conn)
            .await?;
        Ok(swapped == 1)
    }

    async fn active_games(&self) -> Result<Vec<GameId>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Vec<String> = conn.smembers(self.keys.active_key()).await?;

        let mut ids = Vec::with_capacity(raw.len());
        for member in raw {
            match GameId::parse(member.clone()) {
                Ok(id) => ids.push(id),
                Err(err) => warn!(member, error = %err, "Skipping unusable id in active registry"),
            }
        }
        ids.sort();
        Ok(ids)
    }

    async fn deactivate(&self, id: &GameId) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.srem(self.keys.active_key(), id.as_str()).await?;
        Ok(())
    }
}
