//! Partitioning of task lists for board and worker views.

use super::{Task, TaskStatus};
use serde::Serialize;

/// Tasks split into one column per status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusBoard {
    /// Tasks with status `todo`.
    pub todo: Vec<Task>,
    /// Tasks with status `in_progress`.
    pub in_progress: Vec<Task>,
    /// Tasks with status `needs_review`.
    pub needs_review: Vec<Task>,
    /// Tasks with status `done`.
    pub done: Vec<Task>,
}

impl StatusBoard {
    /// Distributes tasks into status columns, preserving input order within
    /// each column.
    #[must_use]
    pub fn partition(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut board = Self::default();
        for task in tasks {
            board.column_mut(task.status()).push(task);
        }
        board
    }

    /// Returns the tasks in one column.
    #[must_use]
    pub fn column(&self, status: TaskStatus) -> &[Task] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::NeedsReview => &self.needs_review,
            TaskStatus::Done => &self.done,
        }
    }

    /// Returns the total number of tasks on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.needs_review.len() + self.done.len()
    }

    /// Returns `true` when no column holds a task.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    const fn column_mut(&mut self, status: TaskStatus) -> &mut Vec<Task> {
        match status {
            TaskStatus::Todo => &mut self.todo,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::NeedsReview => &mut self.needs_review,
            TaskStatus::Done => &mut self.done,
        }
    }
}

/// A worker's tasks split by completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkerTaskGroups {
    /// Tasks still open.
    pub incomplete: Vec<Task>,
    /// Tasks flagged complete or in status `done`.
    pub completed: Vec<Task>,
    /// Set when the worker has no tasks at all.
    pub no_tasks: bool,
}

impl WorkerTaskGroups {
    /// Groups tasks by [`Task::is_finished`].
    #[must_use]
    pub fn group(tasks: impl IntoIterator<Item = Task>) -> Self {
        let (completed, incomplete): (Vec<Task>, Vec<Task>) =
            tasks.into_iter().partition(Task::is_finished);
        let no_tasks = completed.is_empty() && incomplete.is_empty();
        Self {
            incomplete,
            completed,
            no_tasks,
        }
    }
}
