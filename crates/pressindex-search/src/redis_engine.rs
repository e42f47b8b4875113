//! RediSearch engine over a single blocking Redis connection.

use std::sync::{Mutex, MutexGuard};

use redis::Value;
use tracing::{debug, info};

use crate::engine::{EngineCommand, IndexEngine, IndexInfo};
use crate::error::SearchError;

/// Engine backed by a Redis server with the RediSearch module loaded.
///
/// Commands are serialized over one connection.
pub struct RedisEngine {
    connection: Mutex<redis::Connection>,
}

impl RedisEngine {
    /// Connect to `url` (e.g. `redis://127.0.0.1:6379/`).
    pub fn connect(url: &str) -> Result<Self, SearchError> {
        info!(url, "Connecting to index engine");
        let client = redis::Client::open(url)?;
        let connection = client.get_connection()?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, redis::Connection>, SearchError> {
        self.connection
            .lock()
            .map_err(|e| SearchError::Engine(format!("connection lock poisoned: {}", e)))
    }

    fn run(conn: &mut redis::Connection, command: &EngineCommand) -> Result<Value, SearchError> {
        let mut cmd = redis::cmd(command.name());
        for arg in command.args() {
            cmd.arg(arg);
        }
        Ok(cmd.query::<Value>(conn)?)
    }
}

impl IndexEngine for RedisEngine {
    fn execute(&self, command: &EngineCommand) -> Result<(), SearchError> {
        let mut conn = self.conn()?;

        // FT.CREATE fails on an existing index; creation replaces it.
        if let EngineCommand::Create(schema) = command {
            let drop_cmd = EngineCommand::Drop {
                index_name: schema.index_name.clone(),
            };
            match Self::run(&mut conn, &drop_cmd) {
                Ok(_) => debug!(index = %schema.index_name, "Dropped existing index before create"),
                Err(e) if is_unknown_index(&e) => {}
                Err(e) => return Err(e),
            }
        }

        Self::run(&mut conn, command).map_err(|e| match (command, e) {
            (EngineCommand::Add(add), SearchError::Engine(msg))
                if msg.to_ascii_lowercase().contains("document already exists") =>
            {
                SearchError::DocumentExists(add.doc_id)
            }
            (_, e) => e,
        })?;
        debug!(command = command.name(), "Engine command executed");
        Ok(())
    }

    fn info(&self, index_name: &str) -> Result<Option<IndexInfo>, SearchError> {
        let mut conn = self.conn()?;
        let reply = redis::cmd("FT.INFO").arg(index_name).query::<Value>(&mut *conn);

        match reply {
            Ok(value) => Ok(Some(IndexInfo {
                num_docs: parse_num_docs(&value).unwrap_or(0),
            })),
            Err(e) => {
                let err = SearchError::from(e);
                if is_unknown_index(&err) {
                    Ok(None)
                } else {
                    Err(err)
                }
            }
        }
    }
}

fn is_unknown_index(err: &SearchError) -> bool {
    match err {
        SearchError::Engine(msg) => {
            let msg = msg.to_ascii_lowercase();
            msg.contains("unknown index") || msg.contains("no such index")
        }
        _ => false,
    }
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::BulkString(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        Value::SimpleString(s) => Some(s.clone()),
        Value::Int(n) => Some(n.to_string()),
        Value::Double(d) => Some(d.to_string()),
        _ => None,
    }
}

/// Extract `num_docs` from an `FT.INFO` reply (flat key/value array or map).
fn parse_num_docs(reply: &Value) -> Option<u64> {
    let raw = match reply {
        Value::Array(items) => items
            .chunks(2)
            .find(|pair| value_as_string(&pair[0]).as_deref() == Some("num_docs"))
            .and_then(|pair| pair.get(1))
            .and_then(value_as_string),
        Value::Map(pairs) => pairs
            .iter()
            .find(|(k, _)| value_as_string(k).as_deref() == Some("num_docs"))
            .and_then(|(_, v)| value_as_string(v)),
        _ => None,
    }?;

    raw.parse::<u64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().map(|f| f as u64))
}
