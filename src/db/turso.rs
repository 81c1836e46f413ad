use super::traits::{NewTask, PrincipalDirectory, TaskStore};
use crate::types::{AppError, Comment, Principal, Priority, Result, Status, Task};
use async_trait::async_trait;
use libsql::{Builder, Connection, Database, Row, Transaction};
use std::collections::BTreeSet;
use std::path::Path;
use tokio::sync::{Mutex, MutexGuard};

/// libsql-backed storage for principals, tasks and comments.
///
/// Holds a single connection for its whole life: an in-memory database only
/// exists for the connection that created it. Writes take `write_lock`, so a
/// multi-statement write never shares the connection's transaction with
/// another request.
pub struct TursoClient {
    _db: Database,
    conn: Connection,
    write_lock: Mutex<()>,
}

impl TursoClient {
    /// Ephemeral database, used by tests and `database.url = ":memory:"`.
    pub async fn new_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open in-memory database: {}", e)))?;
        Self::from_database(db).await
    }

    pub async fn new_local(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Database(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database {}: {}", path, e)))?;
        Self::from_database(db).await
    }

    async fn from_database(db: Database) -> Result<Self> {
        let conn = db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?;

        let client = Self {
            _db: db,
            conn,
            write_lock: Mutex::new(()),
        };
        client.initialize_schema().await?;

        Ok(client)
    }

    async fn initialize_schema(&self) -> Result<()> {
        self.conn
            .execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| AppError::Database(format!("Failed to enable foreign keys: {}", e)))?;

        // Users table
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    email TEXT UNIQUE NOT NULL,
                    password_hash TEXT NOT NULL,
                    created_at INTEGER NOT NULL
                )",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to create users table: {}", e)))?;

        // Tasks table
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS tasks (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL,
                    status TEXT NOT NULL,
                    priority TEXT NOT NULL,
                    author_id INTEGER NOT NULL,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL,
                    FOREIGN KEY (author_id) REFERENCES users(id)
                )",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to create tasks table: {}", e)))?;

        // Task executors (many-to-many)
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS task_executors (
                    task_id INTEGER NOT NULL,
                    user_id INTEGER NOT NULL,
                    PRIMARY KEY (task_id, user_id),
                    FOREIGN KEY (task_id) REFERENCES tasks(id),
                    FOREIGN KEY (user_id) REFERENCES users(id)
                )",
                (),
            )
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to create task_executors table: {}", e))
            })?;

        // Comments table
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS comments (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    task_id INTEGER NOT NULL,
                    user_id INTEGER NOT NULL,
                    text TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    FOREIGN KEY (task_id) REFERENCES tasks(id),
                    FOREIGN KEY (user_id) REFERENCES users(id)
                )",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to create comments table: {}", e)))?;

        Ok(())
    }

    async fn query_principals(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Vec<Principal>> {
        let mut rows = self
            .conn
            .query(sql, params)
            .await
            .map_err(|e| AppError::Database(format!("Failed to query users: {}", e)))?;

        let mut principals = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            principals.push(Principal {
                id: row.get(0).map_err(db_err)?,
                email: row.get(1).map_err(db_err)?,
                password_hash: row.get(2).map_err(db_err)?,
            });
        }

        Ok(principals)
    }

    async fn executors_of(&self, task_id: i64) -> Result<BTreeSet<i64>> {
        let mut rows = self
            .conn
            .query(
                "SELECT user_id FROM task_executors WHERE task_id = ?",
                [task_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query executors: {}", e)))?;

        let mut executors = BTreeSet::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            executors.insert(row.get::<i64>(0).map_err(db_err)?);
        }

        Ok(executors)
    }

    async fn begin(&self) -> Result<(MutexGuard<'_, ()>, Transaction)> {
        let guard = self.write_lock.lock().await;
        let tx = self
            .conn
            .transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;
        Ok((guard, tx))
    }

    /// Commits on success; rolls back and returns the original error otherwise.
    async fn finish<T>(tx: Transaction, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                tx.commit()
                    .await
                    .map_err(|e| AppError::Database(format!("Failed to commit: {}", e)))?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!("Rollback failed after {}: {}", e, rollback);
                }
                Err(e)
            }
        }
    }

    async fn replace_executors(
        conn: &Connection,
        task_id: i64,
        executor_ids: &BTreeSet<i64>,
    ) -> Result<()> {
        conn.execute("DELETE FROM task_executors WHERE task_id = ?", [task_id])
            .await
            .map_err(|e| AppError::Database(format!("Failed to clear executors: {}", e)))?;

        for user_id in executor_ids {
            conn.execute(
                "INSERT INTO task_executors (task_id, user_id) VALUES (?, ?)",
                (task_id, *user_id),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to add executor: {}", e)))?;
        }

        Ok(())
    }

    async fn query_tasks(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Vec<Task>> {
        let mut rows = self
            .conn
            .query(sql, params)
            .await
            .map_err(|e| AppError::Database(format!("Failed to query tasks: {}", e)))?;

        let mut tasks = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            tasks.push(task_from_row(&row)?);
        }

        for task in tasks.iter_mut() {
            task.executor_ids = self.executors_of(task.id).await?;
        }

        Ok(tasks)
    }
}

#[async_trait]
impl PrincipalDirectory for TursoClient {
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>> {
        let mut found = self
            .query_principals(
                "SELECT id, email, password_hash FROM users WHERE email = ?",
                [email],
            )
            .await?;
        Ok(found.pop())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Principal>> {
        let mut found = self
            .query_principals("SELECT id, email, password_hash FROM users WHERE id = ?", [id])
            .await?;
        Ok(found.pop())
    }

    async fn create_principal(&self, email: &str, password_hash: &str) -> Result<Principal> {
        let now = chrono::Utc::now().timestamp();
        let _guard = self.write_lock.lock().await;

        let mut rows = self
            .conn
            .query(
                "INSERT INTO users (email, password_hash, created_at) VALUES (?, ?, ?)
                 RETURNING id",
                (email, password_hash, now),
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    duplicate_subject()
                } else {
                    AppError::Database(format!("Failed to create user: {}", e))
                }
            })?;

        let row = rows
            .next()
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    duplicate_subject()
                } else {
                    db_err(e)
                }
            })?
            .ok_or_else(|| AppError::Database("Insert returned no id".to_string()))?;

        Ok(Principal {
            id: row.get(0).map_err(db_err)?,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        })
    }

    async fn list_principals(&self) -> Result<Vec<Principal>> {
        self.query_principals("SELECT id, email, password_hash FROM users ORDER BY id", ())
            .await
    }
}

#[async_trait]
impl TaskStore for TursoClient {
    async fn insert_task(&self, task: NewTask) -> Result<Task> {
        let now = chrono::Utc::now().timestamp();
        let (_guard, tx) = self.begin().await?;

        let result: Result<i64> = async {
            let mut rows = tx
                .query(
                    "INSERT INTO tasks (name, description, status, priority, author_id, created_at, updated_at)
                     VALUES (?, ?, ?, ?, ?, ?, ?)
                     RETURNING id",
                    (
                        task.name.as_str(),
                        task.description.as_str(),
                        task.status.as_str(),
                        task.priority.as_str(),
                        task.author_id,
                        now,
                        now,
                    ),
                )
                .await
                .map_err(|e| AppError::Database(format!("Failed to create task: {}", e)))?;

            let id: i64 = rows
                .next()
                .await
                .map_err(db_err)?
                .ok_or_else(|| AppError::Database("Insert returned no id".to_string()))?
                .get(0)
                .map_err(db_err)?;
            drop(rows);

            Self::replace_executors(&tx, id, &task.executor_ids).await?;
            Ok::<_, AppError>(id)
        }
        .await;
        let id = Self::finish(tx, result).await?;

        Ok(Task {
            id,
            name: task.name,
            description: task.description,
            status: task.status,
            priority: task.priority,
            author_id: task.author_id,
            executor_ids: task.executor_ids,
        })
    }

    async fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let mut found = self
            .query_tasks(
                "SELECT id, name, description, status, priority, author_id FROM tasks WHERE id = ?",
                [id],
            )
            .await?;
        Ok(found.pop())
    }

    async fn update_task(&self, task: &Task) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let (_guard, tx) = self.begin().await?;

        let result: Result<()> = async {
            tx.execute(
                "UPDATE tasks SET name = ?, description = ?, status = ?, priority = ?, updated_at = ?
                 WHERE id = ?",
                (
                    task.name.as_str(),
                    task.description.as_str(),
                    task.status.as_str(),
                    task.priority.as_str(),
                    now,
                    task.id,
                ),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to update task: {}", e)))?;

            Self::replace_executors(&tx, task.id, &task.executor_ids).await
        }
        .await;
        Self::finish(tx, result).await
    }

    async fn delete_task(&self, id: i64) -> Result<()> {
        let (_guard, tx) = self.begin().await?;

        let result: Result<()> = async {
            tx.execute("DELETE FROM comments WHERE task_id = ?", [id])
                .await
                .map_err(|e| AppError::Database(format!("Failed to delete comments: {}", e)))?;
            tx.execute("DELETE FROM task_executors WHERE task_id = ?", [id])
                .await
                .map_err(|e| AppError::Database(format!("Failed to delete executors: {}", e)))?;
            tx.execute("DELETE FROM tasks WHERE id = ?", [id])
                .await
                .map_err(|e| AppError::Database(format!("Failed to delete task: {}", e)))?;
            Ok::<_, AppError>(())
        }
        .await;
        Self::finish(tx, result).await
    }

    async fn tasks_by_author(&self, author_id: i64) -> Result<Vec<Task>> {
        self.query_tasks(
            "SELECT id, name, description, status, priority, author_id FROM tasks
             WHERE author_id = ? ORDER BY id",
            [author_id],
        )
        .await
    }

    async fn tasks_by_executor(&self, executor_id: i64) -> Result<Vec<Task>> {
        self.query_tasks(
            "SELECT t.id, t.name, t.description, t.status, t.priority, t.author_id
             FROM tasks t JOIN task_executors e ON e.task_id = t.id
             WHERE e.user_id = ? ORDER BY t.id",
            [executor_id],
        )
        .await
    }

    async fn insert_comment(&self, task_id: i64, user_id: i64, text: &str) -> Result<Comment> {
        let now = chrono::Utc::now().timestamp();
        let _guard = self.write_lock.lock().await;

        let mut rows = self
            .conn
            .query(
                "INSERT INTO comments (task_id, user_id, text, created_at) VALUES (?, ?, ?, ?)
                 RETURNING id",
                (task_id, user_id, text, now),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to add comment: {}", e)))?;

        let id: i64 = rows
            .next()
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::Database("Insert returned no id".to_string()))?
            .get(0)
            .map_err(db_err)?;

        Ok(Comment {
            id,
            task_id,
            user_id,
            text: text.to_string(),
        })
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, task_id, user_id, text FROM comments WHERE id = ?",
                [id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query comment: {}", e)))?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(Some(comment_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn comments_for_task(&self, task_id: i64) -> Result<Vec<Comment>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, task_id, user_id, text FROM comments WHERE task_id = ? ORDER BY id",
                [task_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query comments: {}", e)))?;

        let mut comments = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            comments.push(comment_from_row(&row)?);
        }

        Ok(comments)
    }
}

fn task_from_row(row: &Row) -> Result<Task> {
    let status: String = row.get(3).map_err(db_err)?;
    let priority: String = row.get(4).map_err(db_err)?;

    Ok(Task {
        id: row.get(0).map_err(db_err)?,
        name: row.get(1).map_err(db_err)?,
        description: row.get(2).map_err(db_err)?,
        status: Status::parse(&status)
            .ok_or_else(|| AppError::Database(format!("Unknown task status '{}'", status)))?,
        priority: Priority::parse(&priority)
            .ok_or_else(|| AppError::Database(format!("Unknown task priority '{}'", priority)))?,
        author_id: row.get(5).map_err(db_err)?,
        executor_ids: BTreeSet::new(),
    })
}

fn comment_from_row(row: &Row) -> Result<Comment> {
    Ok(Comment {
        id: row.get(0).map_err(db_err)?,
        task_id: row.get(1).map_err(db_err)?,
        user_id: row.get(2).map_err(db_err)?,
        text: row.get(3).map_err(db_err)?,
    })
}

fn db_err(e: libsql::Error) -> AppError {
    AppError::Database(e.to_string())
}

fn is_unique_violation(e: &libsql::Error) -> bool {
    e.to_string().contains("UNIQUE constraint failed")
}

fn duplicate_subject() -> AppError {
    AppError::DuplicateSubject(
        "User with this email already exists. Please use a different email address.".to_string(),
    )
}
