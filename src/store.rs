use std::{fmt, str::FromStr};

use chrono::Utc;
use sqlx::{
	migrate::{MigrateError, Migrator},
	sqlite::{SqliteConnectOptions, SqlitePoolOptions},
	Sqlite, Transaction,
};

use crate::{
	route::post::model::{Post, PostSummary},
	Config, Database,
};

pub static MIGRATOR: Migrator = sqlx::migrate!();

/// A store operation, used to describe what failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
	Create,
	Get,
	List,
	Update,
	Delete,
}

impl fmt::Display for Operation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Create => "failed to create post",
			Self::Get => "failed to fetch post",
			Self::List => "failed to list posts",
			Self::Update => "failed to update post",
			Self::Delete => "failed to delete post",
		})
	}
}

impl Operation {
	fn wrap(self) -> impl FnOnce(sqlx::Error) -> Error {
		move |source| Error::Storage {
			operation: self,
			source,
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("post {0} does not exist")]
	NotFound(i64),
	#[error("{operation}: {source}")]
	Storage {
		operation: Operation,
		#[source]
		source: sqlx::Error,
	},
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
	#[error("failed to open database: {0}")]
	Open(#[from] sqlx::Error),
	#[error("failed to apply schema: {0}")]
	Migrate(#[from] MigrateError),
}

/// Owns every read and write of the `post` table.
///
/// Mutations run in their own transaction, which is committed on success
/// and rolled back before the error is returned otherwise.
#[derive(Debug, Clone)]
pub struct PostStore {
	database: Database,
}

impl PostStore {
	pub fn new(database: Database) -> Self {
		Self { database }
	}

	/// Opens (creating if necessary) the database named by the configuration
	/// and brings its schema up to date.
	pub async fn connect(config: &Config) -> Result<Self, ConnectError> {
		let options =
			SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);

		// in-memory databases vanish with their last connection
		let database = SqlitePoolOptions::new()
			.max_connections(config.max_connections)
			.idle_timeout(None)
			.max_lifetime(None)
			.connect_with(options)
			.await?;

		MIGRATOR.run(&database).await?;
		tracing::info!(url = %config.database_url, "database ready");

		Ok(Self::new(database))
	}

	pub async fn create(&self, title: &str, content: &str) -> Result<Post, Error> {
		let operation = Operation::Create;
		let mut tx = self.database.begin().await.map_err(operation.wrap())?;

		let result = sqlx::query_as::<_, Post>(
			r"
				INSERT INTO post (title, content, created_at)
				VALUES (?1, ?2, ?3)
				RETURNING id, title, content, created_at
			",
		)
		.bind(title)
		.bind(content)
		.bind(Utc::now())
		.fetch_one(&mut *tx)
		.await
		.map_err(operation.wrap());

		let post = finish(tx, operation, result).await?;
		tracing::info!(post_id = post.id, "created post");

		Ok(post)
	}

	pub async fn get(&self, id: i64) -> Result<Post, Error> {
		let post = sqlx::query_as::<_, Post>(
			r"
				SELECT id, title, content, created_at FROM post
				WHERE id = ?1
			",
		)
		.bind(id)
		.fetch_optional(&self.database)
		.await
		.map_err(Operation::Get.wrap())?;

		post.ok_or(Error::NotFound(id))
	}

	/// Returns every post in insertion order.
	pub async fn list(&self) -> Result<Vec<PostSummary>, Error> {
		sqlx::query_as::<_, PostSummary>(
			r"
				SELECT id, title FROM post
				ORDER BY id ASC
			",
		)
		.fetch_all(&self.database)
		.await
		.map_err(Operation::List.wrap())
	}

	/// Replaces the fields that are `Some`, leaving the others untouched.
	pub async fn update(
		&self,
		id: i64,
		title: Option<&str>,
		content: Option<&str>,
	) -> Result<Post, Error> {
		let operation = Operation::Update;
		let mut tx = self.database.begin().await.map_err(operation.wrap())?;

		let result = sqlx::query_as::<_, Post>(
			r"
				UPDATE post
				SET title = COALESCE(?1, title), content = COALESCE(?2, content)
				WHERE id = ?3
				RETURNING id, title, content, created_at
			",
		)
		.bind(title)
		.bind(content)
		.bind(id)
		.fetch_optional(&mut *tx)
		.await
		.map_err(operation.wrap())
		.and_then(|post| post.ok_or(Error::NotFound(id)));

		let post = finish(tx, operation, result).await?;
		tracing::info!(post_id = post.id, "updated post");

		Ok(post)
	}

	pub async fn delete(&self, id: i64) -> Result<(), Error> {
		let operation = Operation::Delete;
		let mut tx = self.database.begin().await.map_err(operation.wrap())?;

		let result = sqlx::query("DELETE FROM post WHERE id = ?1")
			.bind(id)
			.execute(&mut *tx)
			.await
			.map_err(operation.wrap())
			.and_then(|status| {
				if status.rows_affected() == 0 {
					Err(Error::NotFound(id))
				} else {
					Ok(())
				}
			});

		finish(tx, operation, result).await?;
		tracing::info!(post_id = id, "deleted post");

		Ok(())
	}
}

/// Commits the transaction if `result` is a success, otherwise rolls it back
/// and passes the error through.
async fn finish<T>(
	tx: Transaction<'static, Sqlite>,
	operation: Operation,
	result: Result<T, Error>,
) -> Result<T, Error> {
	match result {
		Ok(value) => {
			tx.commit().await.map_err(operation.wrap())?;
			Ok(value)
		}
		Err(error) => {
			if let Err(rollback) = tx.rollback().await {
				tracing::warn!(%operation, error = %rollback, "rollback failed");
			} else {
				tracing::debug!(%operation, "rolled back");
			}

			Err(error)
		}
	}
}

#[cfg(test)]
mod test {
	use super::{Error, Operation, PostStore};
	use crate::test::*;

	#[tokio::test]
	async fn test_create_then_get() {
		let store = PostStore::new(database().await);

		let created = store.create("T", "C").await.unwrap();
		let fetched = store.get(created.id).await.unwrap();

		assert_eq!(fetched.id, created.id);
		assert_eq!(fetched.title, "T");
		assert_eq!(fetched.content, "C");
		assert_eq!(fetched.created_at, created.created_at);
	}

	#[tokio::test]
	async fn test_ids_are_unique() {
		let store = PostStore::new(database().await);

		let first = store.create("a", "a").await.unwrap();
		let second = store.create("b", "b").await.unwrap();

		assert_ne!(first.id, second.id);
	}

	#[tokio::test]
	async fn test_update_keeps_omitted_fields() {
		let store = PostStore::new(database().await);
		let post = store.create("old title", "body").await.unwrap();

		let updated = store.update(post.id, Some("new title"), None).await.unwrap();
		assert_eq!(updated.title, "new title");
		assert_eq!(updated.content, "body");
		assert_eq!(updated.created_at, post.created_at);

		let updated = store.update(post.id, None, Some("new body")).await.unwrap();
		assert_eq!(updated.title, "new title");
		assert_eq!(updated.content, "new body");

		let fetched = store.get(post.id).await.unwrap();
		assert_eq!(fetched.title, "new title");
		assert_eq!(fetched.content, "new body");
	}

	#[tokio::test]
	async fn test_delete_is_terminal() {
		let store = PostStore::new(database().await);
		let post = store.create("gone", "soon").await.unwrap();

		store.delete(post.id).await.unwrap();

		assert!(matches!(store.get(post.id).await, Err(Error::NotFound(id)) if id == post.id));
		assert!(matches!(store.delete(post.id).await, Err(Error::NotFound(..))));
	}

	#[tokio::test]
	async fn test_missing_post() {
		let store = PostStore::new(database().await);

		assert!(matches!(store.get(999_999).await, Err(Error::NotFound(999_999))));
		assert!(matches!(
			store.update(999_999, Some("x"), None).await,
			Err(Error::NotFound(999_999))
		));
		assert!(matches!(store.delete(999_999).await, Err(Error::NotFound(999_999))));
	}

	#[tokio::test]
	async fn test_list_in_insertion_order() {
		let store = PostStore::new(database().await);
		assert!(store.list().await.unwrap().is_empty());

		let a = store.create("A", "1").await.unwrap();
		let b = store.create("B", "2").await.unwrap();
		let c = store.create("C", "3").await.unwrap();

		let listed = store
			.list()
			.await
			.unwrap()
			.into_iter()
			.map(|post| (post.id, post.title))
			.collect::<Vec<_>>();

		assert_eq!(
			listed,
			vec![(a.id, "A".into()), (b.id, "B".into()), (c.id, "C".into())]
		);
	}

	#[tokio::test]
	async fn test_failed_update_is_storage_error() {
		let database = database().await;
		let store = PostStore::new(database.clone());
		let post = store.create("title", "content").await.unwrap();

		sqlx::query("DROP TABLE post")
			.execute(&database)
			.await
			.unwrap();

		let error = store.update(post.id, Some("x"), None).await.unwrap_err();
		assert!(matches!(
			error,
			Error::Storage {
				operation: Operation::Update,
				..
			}
		));
		assert!(error.to_string().starts_with("failed to update post: "));
	}

	#[tokio::test]
	async fn test_closed_database_is_storage_error() {
		let database = database().await;
		let store = PostStore::new(database.clone());

		database.close().await;

		assert!(matches!(
			store.create("title", "content").await,
			Err(Error::Storage {
				operation: Operation::Create,
				..
			})
		));
		assert!(matches!(
			store.list().await,
			Err(Error::Storage {
				operation: Operation::List,
				..
			})
		));
		assert!(matches!(
			store.get(1).await,
			Err(Error::Storage {
				operation: Operation::Get,
				..
			})
		));
	}

	#[tokio::test]
	async fn test_connect_applies_schema() {
		let config = Config {
			database_url: "sqlite::memory:".into(),
			max_connections: 1,
			..Config::default()
		};

		let store = PostStore::connect(&config).await.unwrap();
		let post = store.create("hello", "world").await.unwrap();

		assert_eq!(store.get(post.id).await.unwrap().title, "hello");
	}
}
