//! Namespaced entry storage.
//!
//! A namespace is a named generation of cached responses. Namespaces are
//! created by their first write and destroyed as a whole, either by the
//! activation sweep or by an explicit purge. Every operation below is one
//! atomic statement or transaction; nothing spans namespaces.

use super::connection::CacheDb;
use crate::Error;
use crate::request::{RequestDescriptor, Response};
use bytes::Bytes;
use tokio_rusqlite::{params, rusqlite};

/// An immutable snapshot of a successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub request_key: String,
    pub url: String,
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub stored_at: String,
}

impl CacheEntry {
    /// Capture `response` as the entry for `request`.
    pub fn capture(request: &RequestDescriptor, response: &Response) -> Self {
        Self {
            request_key: request.cache_key(),
            url: request.url.to_string(),
            status_code: response.status,
            headers: response.headers.clone(),
            body: response.body.clone(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn to_response(&self) -> Response {
        Response::new(self.status_code, self.headers.clone(), self.body.clone())
    }
}

impl From<CacheEntry> for Response {
    fn from(entry: CacheEntry) -> Self {
        Response::new(entry.status_code, entry.headers, entry.body)
    }
}

/// Handle to a single namespace.
///
/// Opening a handle does not touch the store; the namespace comes into
/// existence with its first `put`.
#[derive(Clone, Debug)]
pub struct Namespace {
    db: CacheDb,
    name: String,
}

impl Namespace {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up the entry stored under `request_key` in this namespace.
    pub async fn get(&self, request_key: &str) -> Result<Option<CacheEntry>, Error> {
        let name = self.name.clone();
        let key = request_key.to_string();
        self.db
            .conn
            .call(move |conn| -> Result<Option<CacheEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT request_key, url, status_code, headers_json, body, stored_at
                     FROM entries WHERE namespace = ?1 AND request_key = ?2",
                )?;
                let result = stmt.query_row(params![name, key], read_entry);
                optional(result)
            })
            .await
            .map_err(Error::from)
    }

    /// Write `entry`, replacing any previous entry under the same key.
    pub async fn put(&self, entry: &CacheEntry) -> Result<(), Error> {
        let name = self.name.clone();
        let entry = entry.clone();
        let headers_json = serde_json::to_string(&entry.headers)
            .map_err(|e| Error::InvalidInput(format!("unserializable headers: {e}")))?;

        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO namespaces (name, created_at) VALUES (?1, ?2)",
                    params![&name, chrono::Utc::now().to_rfc3339()],
                )?;
                tx.execute(
                    "INSERT OR REPLACE INTO entries (
                        namespace, request_key, url, status_code, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        &name,
                        &entry.request_key,
                        &entry.url,
                        entry.status_code,
                        &headers_json,
                        entry.body.as_ref(),
                        &entry.stored_at,
                    ],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries currently stored in this namespace.
    pub async fn len(&self) -> Result<u64, Error> {
        let name = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE namespace = ?1", params![name], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

impl CacheDb {
    /// Open a handle to the namespace called `name`.
    pub fn open_namespace(&self, name: impl Into<String>) -> Namespace {
        Namespace { db: self.clone(), name: name.into() }
    }

    /// Match `request_key` across every namespace.
    ///
    /// When several namespaces hold the key, the most recently written
    /// entry wins.
    pub async fn match_any(&self, request_key: &str) -> Result<Option<CacheEntry>, Error> {
        let key = request_key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CacheEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT request_key, url, status_code, headers_json, body, stored_at
                     FROM entries WHERE request_key = ?1
                     ORDER BY seq DESC LIMIT 1",
                )?;
                let result = stmt.query_row(params![key], read_entry);
                optional(result)
            })
            .await
            .map_err(Error::from)
    }

    /// Names of every namespace currently in the store, oldest first.
    pub async fn namespace_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM namespaces ORDER BY created_at, name")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a namespace and all of its entries.
    ///
    /// Returns false if no namespace with that name existed.
    pub async fn delete_namespace(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM namespaces WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }
}

fn read_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<(CacheEntry, String)> {
    let headers_json: String = row.get(3)?;
    let body: Vec<u8> = row.get(4)?;
    let entry = CacheEntry {
        request_key: row.get(0)?,
        url: row.get(1)?,
        status_code: row.get(2)?,
        headers: Vec::new(),
        body: Bytes::from(body),
        stored_at: row.get(5)?,
    };
    Ok((entry, headers_json))
}

fn optional(result: rusqlite::Result<(CacheEntry, String)>) -> Result<Option<CacheEntry>, Error> {
    match result {
        Ok((mut entry, headers_json)) => {
            entry.headers = serde_json::from_str(&headers_json)
                .map_err(|e| Error::InvalidInput(format!("corrupt headers for {}: {e}", entry.url)))?;
            Ok(Some(entry))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
