//! Kanban board: three fixed columns derived from the task list, plus
//! drag-and-drop.
//!
//! Status is a closed enum, so partitioning cannot drop a task: a
//! record with an unknown status never deserializes in the first
//! place. Same-column drags are visual only and vanish on the next
//! fetch; cross-column drags persist the status change through the
//! cache and are rolled back if the server says no.

use thiserror::Error;
use uuid::Uuid;

use crate::client::api::ClientError;
use crate::client::cache::TaskCache;
use crate::model::task::{Task, TaskPatch, TaskStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    pub todo: Vec<Task>,
    pub in_progress: Vec<Task>,
    pub completed: Vec<Task>,
}

/// One drag gesture: card `from_index` of column `from`, dropped at
/// `to_index` of column `to`. Indices beyond the destination length
/// clamp to the end, as a drop below the last card should.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragMove {
    pub from: TaskStatus,
    pub from_index: usize,
    pub to: TaskStatus,
    pub to_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// Same-column reorder; nothing to persist.
    Reordered,
    /// The card changed columns and its new status must be persisted.
    Moved { task: Uuid, status: TaskStatus },
}

#[derive(Debug, Error)]
pub enum DragError {
    #[error("no card at index {index} of the {column} column")]
    BadSourceIndex { column: TaskStatus, index: usize },

    /// The server rejected the status change; the board was restored
    /// to its pre-drag state.
    #[error("status update failed: {0}")]
    Update(#[source] ClientError),
}

impl Board {
    /// Single-pass partition of a task snapshot into the three columns,
    /// keeping the snapshot's order within each.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut board = Board::default();
        for task in tasks {
            board.column_mut(task.status).push(task.clone());
        }
        board
    }

    pub fn column(&self, status: TaskStatus) -> &[Task] {
        match status {
            TaskStatus::ToDo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Completed => &self.completed,
        }
    }

    fn column_mut(&mut self, status: TaskStatus) -> &mut Vec<Task> {
        match status {
            TaskStatus::ToDo => &mut self.todo,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::Completed => &mut self.completed,
        }
    }

    pub fn len(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply a drag to the columns only. The board is untouched when
    /// the source index is invalid.
    pub fn apply(&mut self, mv: &DragMove) -> Result<DragOutcome, DragError> {
        if mv.from_index >= self.column(mv.from).len() {
            return Err(DragError::BadSourceIndex {
                column: mv.from,
                index: mv.from_index,
            });
        }

        if mv.from == mv.to {
            let column = self.column_mut(mv.from);
            let card = column.remove(mv.from_index);
            let at = mv.to_index.min(column.len());
            column.insert(at, card);
            return Ok(DragOutcome::Reordered);
        }

        let mut card = self.column_mut(mv.from).remove(mv.from_index);
        card.status = mv.to;
        let task = card.id;

        let destination = self.column_mut(mv.to);
        let at = mv.to_index.min(destination.len());
        destination.insert(at, card);

        Ok(DragOutcome::Moved { task, status: mv.to })
    }

    /// Apply a drag and persist it. A cross-column move issues exactly
    /// one status update through the cache; when that fails, the board
    /// reverts to its pre-drag state and the cache error slot holds
    /// the failure.
    pub async fn drag(
        &mut self,
        cache: &mut TaskCache,
        mv: DragMove,
    ) -> Result<DragOutcome, DragError> {
        let snapshot = self.clone();
        let outcome = self.apply(&mv)?;

        if let DragOutcome::Moved { task, status } = outcome {
            if let Err(e) = cache.update_task(task, TaskPatch::with_status(status)).await {
                *self = snapshot;
                return Err(DragError::Update(e));
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn task(title: &str, status: TaskStatus) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            status,
            priority: Default::default(),
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn titles(column: &[Task]) -> Vec<&str> {
        column.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn partitions_every_task_into_its_column() {
        let tasks = [
            task("a", TaskStatus::ToDo),
            task("b", TaskStatus::Completed),
            task("c", TaskStatus::ToDo),
            task("d", TaskStatus::InProgress),
        ];

        let board = Board::from_tasks(&tasks);

        assert_eq!(titles(&board.todo), ["a", "c"]);
        assert_eq!(titles(&board.in_progress), ["d"]);
        assert_eq!(titles(&board.completed), ["b"]);
        assert_eq!(board.len(), tasks.len());
    }

    #[test]
    fn same_column_drag_reorders_without_status_change() {
        let tasks = [
            task("a", TaskStatus::ToDo),
            task("b", TaskStatus::ToDo),
            task("c", TaskStatus::ToDo),
        ];
        let mut board = Board::from_tasks(&tasks);

        let outcome = board
            .apply(&DragMove {
                from: TaskStatus::ToDo,
                from_index: 0,
                to: TaskStatus::ToDo,
                to_index: 2,
            })
            .unwrap();

        assert_eq!(outcome, DragOutcome::Reordered);
        assert_eq!(titles(&board.todo), ["b", "c", "a"]);
        assert!(board.todo.iter().all(|t| t.status == TaskStatus::ToDo));
    }

    #[test]
    fn cross_column_drag_moves_card_and_reports_status() {
        let tasks = [
            task("a", TaskStatus::ToDo),
            task("b", TaskStatus::InProgress),
        ];
        let mut board = Board::from_tasks(&tasks);
        let moved_id = board.todo[0].id;

        let outcome = board
            .apply(&DragMove {
                from: TaskStatus::ToDo,
                from_index: 0,
                to: TaskStatus::Completed,
                to_index: 0,
            })
            .unwrap();

        assert_eq!(
            outcome,
            DragOutcome::Moved {
                task: moved_id,
                status: TaskStatus::Completed,
            }
        );
        assert!(board.todo.is_empty());
        assert_eq!(titles(&board.completed), ["a"]);
        assert_eq!(board.completed[0].status, TaskStatus::Completed);
        // the card lives in exactly one column
        assert_eq!(board.len(), tasks.len());
    }

    #[test]
    fn drop_index_beyond_the_column_clamps_to_the_end() {
        let tasks = [
            task("a", TaskStatus::ToDo),
            task("b", TaskStatus::Completed),
        ];
        let mut board = Board::from_tasks(&tasks);

        board
            .apply(&DragMove {
                from: TaskStatus::ToDo,
                from_index: 0,
                to: TaskStatus::Completed,
                to_index: 99,
            })
            .unwrap();

        assert_eq!(titles(&board.completed), ["b", "a"]);
    }

    #[test]
    fn invalid_source_index_leaves_the_board_untouched() {
        let tasks = [task("a", TaskStatus::ToDo)];
        let mut board = Board::from_tasks(&tasks);
        let before = board.clone();

        let result = board.apply(&DragMove {
            from: TaskStatus::InProgress,
            from_index: 0,
            to: TaskStatus::Completed,
            to_index: 0,
        });

        assert!(matches!(result, Err(DragError::BadSourceIndex { .. })));
        assert_eq!(board, before);
    }
}
