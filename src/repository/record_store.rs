// ==========================================
// 动力电池供应链账本 - 分区键值存储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: put_batch 原子提交；scan 为 [start, end) 区间，end 为空表示无上界
// ==========================================

use crate::db::open_partition_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex};

// ==========================================
// 存储键
// ==========================================
pub mod keys {
    pub const MATERIAL: &str = "material/";
    pub const USAGE: &str = "usage/";
    pub const BATTERY: &str = "battery/";
    pub const PASSPORT: &str = "passport/";
    pub const CONSUMPTION: &str = "consumption/";
    pub const EXTRACTION: &str = "extraction/";

    pub fn material(id: &str) -> String {
        format!("{}{}", MATERIAL, id)
    }

    pub fn usage(id: &str) -> String {
        format!("{}{}", USAGE, id)
    }

    pub fn battery(id: &str) -> String {
        format!("{}{}", BATTERY, id)
    }

    pub fn passport(passport_id: &str) -> String {
        format!("{}{}", PASSPORT, passport_id)
    }

    pub fn consumption(request_id: &str) -> String {
        format!("{}{}", CONSUMPTION, request_id)
    }

    pub fn extraction(battery_id: &str) -> String {
        format!("{}{}", EXTRACTION, battery_id)
    }

    /// 前缀扫描区间: [prefix, prefix 末字符 +1)
    pub fn prefix_range(prefix: &str) -> (String, String) {
        let mut end: Vec<char> = prefix.chars().collect();
        match end.pop() {
            Some(last) => {
                let next = char::from_u32(last as u32 + 1).unwrap_or(char::MAX);
                end.push(next);
                (prefix.to_string(), end.into_iter().collect())
            }
            None => (String::new(), String::new()),
        }
    }
}

// ==========================================
// WriteBatch - 原子写入批次
// ==========================================
#[derive(Debug, Default, Clone)]
pub struct WriteBatch {
    entries: Vec<(String, Vec<u8>)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<String>, value: Vec<u8>) {
        self.entries.push((key.into(), value));
    }

    /// 以 JSON 编码写入
    pub fn put_json<T: Serialize>(&mut self, key: impl Into<String>, value: &T) -> RepositoryResult<()> {
        let key = key.into();
        let bytes = serde_json::to_vec(value).map_err(|e| RepositoryError::SerializationError {
            key: key.clone(),
            message: e.to_string(),
        })?;
        self.entries.push((key, bytes));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(String, Vec<u8>)] {
        &self.entries
    }
}

// ==========================================
// RecordStore - 分区存储接口
// ==========================================
pub trait RecordStore: Send + Sync {
    fn get(&self, key: &str) -> RepositoryResult<Option<Vec<u8>>>;

    fn put(&self, key: &str, value: &[u8]) -> RepositoryResult<()>;

    /// 原子写入：全部成功或全部不生效
    fn put_batch(&self, batch: &WriteBatch) -> RepositoryResult<usize>;

    /// 区间扫描，按 key 升序；("", "") 为全量
    fn scan(&self, start: &str, end: &str) -> RepositoryResult<Vec<(String, Vec<u8>)>>;
}

/// 读取并解码 JSON 记录
pub fn get_json<T: DeserializeOwned>(store: &dyn RecordStore, key: &str) -> RepositoryResult<Option<T>> {
    match store.get(key)? {
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| RepositoryError::CorruptRecord {
                key: key.to_string(),
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// 扫描前缀下全部记录并解码，损坏记录跳过并告警
pub fn scan_json<T: DeserializeOwned>(store: &dyn RecordStore, prefix: &str) -> RepositoryResult<Vec<T>> {
    let (start, end) = keys::prefix_range(prefix);
    let rows = store.scan(&start, &end)?;

    let mut records = Vec::with_capacity(rows.len());
    for (key, bytes) in rows {
        match serde_json::from_slice::<T>(&bytes) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(key = %key, error = %e, "跳过无法解析的记录"),
        }
    }
    Ok(records)
}

// ==========================================
// SqliteRecordStore - SQLite 实现（ledger_state 表）
// ==========================================
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    /// 打开分区数据库并建表
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_partition_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（调用方负责 init_schema）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 共享底层连接（配置管理器复用同一数据库）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl RecordStore for SqliteRecordStore {
    fn get(&self, key: &str) -> RepositoryResult<Option<Vec<u8>>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM ledger_state WHERE key = ?1",
                params![key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &[u8]) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO ledger_state (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    fn put_batch(&self, batch: &WriteBatch) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut count = 0;
        for (key, value) in batch.entries() {
            tx.execute(
                r#"
                INSERT INTO ledger_state (key, value, updated_at)
                VALUES (?1, ?2, datetime('now'))
                ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                "#,
                params![key, value],
            )?;
            count += 1;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }

    fn scan(&self, start: &str, end: &str) -> RepositoryResult<Vec<(String, Vec<u8>)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT key, value FROM ledger_state
            WHERE key >= ?1 AND (?2 = '' OR key < ?2)
            ORDER BY key
            "#,
        )?;
        let rows = stmt
            .query_map(params![start, end], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
