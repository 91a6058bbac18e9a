//! A pooled SQLite view on a GeoPackage file.
//!
//! Every component of this crate receives a `&StorageView` explicitly. The
//! helpers here log each statement at trace level and return `anyhow` errors,
//! which [`ErrorKind::of`](gpkgtiles_core::ErrorKind::of) classifies as
//! storage failures.

use anyhow::{Result, ensure};
use gpkgtiles_derive::context;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::{
	SqliteConnectionManager,
	rusqlite::{OptionalExtension, Params, Row, Transaction, types::FromSql},
};
use std::path::Path;

pub type Connection = PooledConnection<SqliteConnectionManager>;

pub struct StorageView {
	name: String,
	pool: Pool<SqliteConnectionManager>,
}

impl StorageView {
	/// Opens an existing SQLite file.
	#[context("opening SQLite database '{}'", path.display())]
	pub fn open(path: &Path, pool_size: u32) -> Result<StorageView> {
		log::debug!("open {path:?}");
		ensure!(path.exists(), "file {path:?} does not exist");
		StorageView::connect(path, pool_size)
	}

	/// Creates a new, empty SQLite file.
	#[context("creating SQLite database '{}'", path.display())]
	pub fn create(path: &Path, pool_size: u32) -> Result<StorageView> {
		log::debug!("create {path:?}");
		ensure!(!path.exists(), "file {path:?} already exists");
		StorageView::connect(path, pool_size)
	}

	fn connect(path: &Path, pool_size: u32) -> Result<StorageView> {
		ensure!(pool_size > 0, "pool size must be greater than 0");
		let manager = SqliteConnectionManager::file(path);
		let pool = Pool::builder().max_size(pool_size).build(manager)?;
		Ok(StorageView {
			name: path.to_string_lossy().to_string(),
			pool,
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn connection(&self) -> Result<Connection> {
		Ok(self.pool.get()?)
	}

	/// Runs `f` inside a transaction that is committed if `f` succeeds.
	///
	/// If `f` or the commit fails, the transaction is dropped and thereby
	/// rolled back.
	pub fn transaction<T>(&self, f: impl FnOnce(&Transaction) -> Result<T>) -> Result<T> {
		let mut conn = self.connection()?;
		let tx = conn.transaction()?;
		let result = f(&tx)?;
		tx.commit()?;
		Ok(result)
	}

	pub fn execute(&self, sql: &str, params: impl Params) -> Result<usize> {
		log::trace!("SQL: {sql}");
		Ok(self.connection()?.execute(sql, params)?)
	}

	pub fn execute_batch(&self, sql: &str) -> Result<()> {
		log::trace!("SQL: {sql}");
		self.connection()?.execute_batch(sql)?;
		Ok(())
	}

	/// Returns `true` if a table or view of that name exists.
	pub fn table_or_view_exists(&self, name: &str) -> Result<bool> {
		let count = self.query_value::<i64>(
			"SELECT COUNT(*) FROM sqlite_master WHERE (type = 'table' OR type = 'view') AND name = ?1",
			[name],
		)?;
		Ok(count.unwrap_or(0) > 0)
	}

	/// Maps every result row with `f`.
	pub fn query_rows<T>(
		&self,
		sql: &str,
		params: impl Params,
		f: impl FnMut(&Row<'_>) -> r2d2_sqlite::rusqlite::Result<T>,
	) -> Result<Vec<T>> {
		log::trace!("SQL: {sql}");
		let conn = self.connection()?;
		let mut stmt = conn.prepare(sql)?;
		let rows = stmt.query_map(params, f)?.collect::<Result<Vec<T>, _>>()?;
		Ok(rows)
	}

	/// Returns the first column of every result row.
	pub fn query_column<T: FromSql>(&self, sql: &str, params: impl Params) -> Result<Vec<T>> {
		self.query_rows(sql, params, |row| row.get::<_, T>(0))
	}

	/// Returns the first column of the first result row.
	///
	/// `None` if there is no row or the value is NULL, so aggregates such as
	/// `MIN()` over an empty table yield `None`.
	pub fn query_value<T: FromSql>(&self, sql: &str, params: impl Params) -> Result<Option<T>> {
		log::trace!("SQL: {sql}");
		let conn = self.connection()?;
		let value = conn
			.query_row(sql, params, |row| row.get::<_, Option<T>>(0))
			.optional()?;
		Ok(value.flatten())
	}
}

impl std::fmt::Debug for StorageView {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("StorageView").field("name", &self.name).finish()
	}
}

/// Quotes an SQL identifier, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
	format!("\"{}\"", name.replace('"', "\"\""))
}
