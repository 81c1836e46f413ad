//! Task and comment operations.
//!
//! Every operation that needs the caller receives it explicitly as a
//! `&Principal`; nothing reads ambient state. Mutations load the task first
//! (`NotFound`) and only then consult [`crate::auth::policy`].

use crate::auth::policy;
use crate::db::{NewTask, PrincipalDirectory, TaskStore};
use crate::types::{
    AppError, Comment, CommentResponse, Principal, Result, Status, Task, TaskRequest, TaskResponse,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

pub struct TaskService {
    store: Arc<dyn TaskStore>,
    directory: Arc<dyn PrincipalDirectory>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>, directory: Arc<dyn PrincipalDirectory>) -> Self {
        Self { store, directory }
    }

    pub async fn create(&self, principal: &Principal, request: TaskRequest) -> Result<TaskResponse> {
        policy::ensure_can_create(Some(principal), request.author)?;
        self.ensure_users_exist(&request.executors).await?;

        let task = self
            .store
            .insert_task(NewTask {
                name: request.name,
                description: request.description,
                status: request.status,
                priority: request.priority,
                author_id: principal.id,
                executor_ids: request.executors,
            })
            .await?;

        info!(task_id = task.id, author_id = principal.id, "Task created");
        Ok(to_response(task, Vec::new()))
    }

    /// Replaces name, description, status, priority and executors. The author
    /// never changes.
    pub async fn update(
        &self,
        principal: &Principal,
        task_id: i64,
        request: TaskRequest,
    ) -> Result<TaskResponse> {
        let mut task = self.load(task_id).await?;
        policy::ensure_can_modify(Some(principal), &task)?;
        self.ensure_users_exist(&request.executors).await?;

        task.name = request.name;
        task.description = request.description;
        task.status = request.status;
        task.priority = request.priority;
        task.executor_ids = request.executors;
        self.store.update_task(&task).await?;

        self.with_comments(task).await
    }

    pub async fn delete(&self, principal: &Principal, task_id: i64) -> Result<()> {
        let task = self.load(task_id).await?;
        policy::ensure_can_modify(Some(principal), &task)?;

        self.store.delete_task(task.id).await?;
        info!(task_id, user_id = principal.id, "Task deleted");
        Ok(())
    }

    pub async fn change_status(
        &self,
        principal: &Principal,
        task_id: i64,
        status: Status,
    ) -> Result<TaskResponse> {
        let mut task = self.load(task_id).await?;
        policy::ensure_can_change_status(Some(principal), &task)?;

        task.status = status;
        self.store.update_task(&task).await?;

        self.with_comments(task).await
    }

    /// Any authenticated user may comment on an existing task.
    pub async fn add_comment(
        &self,
        principal: &Principal,
        task_id: i64,
        text: &str,
    ) -> Result<CommentResponse> {
        let task = self.load(task_id).await?;
        let comment = self.store.insert_comment(task.id, principal.id, text).await?;
        Ok(comment.into())
    }

    pub async fn get_comment(&self, comment_id: i64) -> Result<Comment> {
        self.store
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment not found with id: {}", comment_id)))
    }

    pub async fn get(&self, task_id: i64) -> Result<TaskResponse> {
        let task = self.load(task_id).await?;
        self.with_comments(task).await
    }

    pub async fn list_by_author(&self, author_id: i64) -> Result<Vec<TaskResponse>> {
        let tasks = self.store.tasks_by_author(author_id).await?;
        self.all_with_comments(tasks).await
    }

    pub async fn list_by_executor(&self, executor_id: i64) -> Result<Vec<TaskResponse>> {
        self.ensure_users_exist(&BTreeSet::from([executor_id])).await?;
        let tasks = self.store.tasks_by_executor(executor_id).await?;
        self.all_with_comments(tasks).await
    }

    async fn load(&self, task_id: i64) -> Result<Task> {
        self.store
            .get_task(task_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Task not found with id: {}", task_id)))
    }

    async fn ensure_users_exist(&self, ids: &BTreeSet<i64>) -> Result<()> {
        for id in ids {
            if self.directory.find_by_id(*id).await?.is_none() {
                return Err(AppError::NotFound(format!("User not found with id: {}", id)));
            }
        }
        Ok(())
    }

    async fn with_comments(&self, task: Task) -> Result<TaskResponse> {
        let comments = self.store.comments_for_task(task.id).await?;
        Ok(to_response(task, comments))
    }

    async fn all_with_comments(&self, tasks: Vec<Task>) -> Result<Vec<TaskResponse>> {
        let mut responses = Vec::with_capacity(tasks.len());
        for task in tasks {
            responses.push(self.with_comments(task).await?);
        }
        Ok(responses)
    }
}

fn to_response(task: Task, comments: Vec<Comment>) -> TaskResponse {
    TaskResponse {
        id: task.id,
        name: task.name,
        description: task.description,
        status: task.status,
        priority: task.priority,
        author: task.author_id,
        executors: task.executor_ids,
        comments: comments.into_iter().map(CommentResponse::from).collect(),
    }
}
