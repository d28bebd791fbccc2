// SPDX-License-Identifier: MIT
//! Controller for the task-list view.
//!
//! Owns everything the UI renders: the input buffer, focus, list
//! selection, load state, and per-mutation request states. API calls run
//! as spawned tokio tasks; their results come back over an unbounded
//! channel as [`AppEvent`]s and are applied between renders, so all state
//! transitions happen on the UI loop.
//!
//! Reconciliation after a successful mutation is two-phase:
//!
//! 1. Speculative: patch the cached collection atomically
//!    ([`QueryCache::transform`]). Pure latency hiding.
//! 2. Authoritative: invalidate the collection key. The next tick's
//!    [`TaskApp::ensure_fresh`] refetches, and the refetched data is what
//!    the UI ends up showing.
//!
//! Phase 2 alone is sufficient for correctness; the displayed truth is
//! always the latest successful refetch.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError, NewTask, Task, TaskId, TaskPatch};
use crate::cache::QueryCache;
use crate::mutation::MutationState;

/// Cache key of the collection query.
pub const TASKS_KEY: &str = "tasks";

/// Rendering cap: at most this many tasks are shown.
pub const VISIBLE_TASKS: usize = 10;

/// Resolved API calls, delivered over the app-event channel.
#[derive(Debug)]
pub enum AppEvent {
    TasksFetched(Result<Vec<Task>, ApiError>),
    Created(Result<Task, ApiError>),
    Updated(Result<Task, ApiError>),
    /// Delete reconciliation is keyed by the submitted id, never by the
    /// response body — the collaborator does not reliably echo it.
    Deleted {
        id: TaskId,
        result: Result<(), ApiError>,
    },
}

/// State of the collection query, as the view sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    /// A fetch failed; replaces the whole view with an error message.
    Failed(String),
    Ready,
}

/// Which zone keyboard input goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    List,
}

/// View-model for the task list.
pub struct TaskApp {
    api: ApiClient,
    cache: Arc<QueryCache<Vec<Task>>>,
    tx: UnboundedSender<AppEvent>,
    rx: UnboundedReceiver<AppEvent>,

    input: String,
    focus: Focus,
    selected: usize,
    load: LoadState,

    create_state: MutationState,
    update_state: MutationState,
    delete_state: MutationState,
    /// Id submitted to the in-flight delete. Compared by identity against
    /// each row's id to decide which row shows as delete-pending.
    pending_delete: Option<TaskId>,
    fetch_in_flight: bool,
}

impl TaskApp {
    pub fn new(api: ApiClient, cache: Arc<QueryCache<Vec<Task>>>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api,
            cache,
            tx,
            rx,
            input: String::new(),
            focus: Focus::Input,
            selected: 0,
            load: LoadState::Loading,
            create_state: MutationState::default(),
            update_state: MutationState::default(),
            delete_state: MutationState::default(),
            pending_delete: None,
            fetch_in_flight: false,
        }
    }

    // ─── Collection query ─────────────────────────────────────────────────────

    /// Re-issue the collection query when the cached entry is absent or
    /// stale and no fetch is already in flight. Called every UI tick; a
    /// tick counts as an access, so a stale entry refreshes in the
    /// background while the old value stays on screen.
    ///
    /// A failed query is terminal: the error page replaces the view and
    /// no further fetches are issued (there are no retries).
    pub fn ensure_fresh(&mut self) {
        if self.fetch_in_flight || matches!(self.load, LoadState::Failed(_)) {
            return;
        }
        let needs_fetch = match self.cache.read(TASKS_KEY) {
            None => true,
            Some(read) => read.is_stale,
        };
        if !needs_fetch {
            return;
        }

        self.fetch_in_flight = true;
        let api = self.api.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(AppEvent::TasksFetched(api.list_tasks().await));
        });
    }

    // ─── Input editing ────────────────────────────────────────────────────────

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input => Focus::List,
            Focus::List => Focus::Input,
        };
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    // ─── Mutations ────────────────────────────────────────────────────────────

    /// Submit the add-task form. An empty input issues no request (the
    /// only input validation there is). The buffer clears as soon as the
    /// request is issued, regardless of how it later resolves.
    pub fn submit_input(&mut self) {
        if self.input.is_empty() || self.create_state.is_pending() {
            return;
        }
        let task = NewTask {
            title: std::mem::take(&mut self.input),
            completed: false,
        };

        self.create_state.begin();
        let api = self.api.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(AppEvent::Created(api.create_task(&task).await));
        });
    }

    /// Toggle the selected row's `completed` flag. Refused while any
    /// update is in flight (every checkbox is disabled during an update).
    /// Sends only the negated flag, nothing else.
    pub fn toggle_selected(&mut self) {
        if self.update_state.is_pending() {
            return;
        }
        let Some(task) = self.visible_tasks().get(self.selected).cloned() else {
            return;
        };
        let patch = TaskPatch::set_completed(!task.completed);

        self.update_state.begin();
        let api = self.api.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(AppEvent::Updated(api.update_task(task.id, &patch).await));
        });
    }

    /// Delete the selected row. One delete may be in flight at a time;
    /// the submitted id is carried through the event for reconciliation.
    pub fn delete_selected(&mut self) {
        if self.delete_state.is_pending() {
            return;
        }
        let Some(task) = self.visible_tasks().get(self.selected).cloned() else {
            return;
        };

        self.pending_delete = Some(task.id);
        self.delete_state.begin();
        let api = self.api.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.delete_task(task.id).await;
            let _ = tx.send(AppEvent::Deleted {
                id: task.id,
                result,
            });
        });
    }

    // ─── Event application ────────────────────────────────────────────────────

    /// Apply one resolved API call to the view state.
    ///
    /// Mutation failures are logged and swallowed: no user-visible error
    /// state, no retry, no rollback — the control simply re-enables and
    /// the cache keeps its pre-mutation value.
    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::TasksFetched(Ok(tasks)) => {
                self.fetch_in_flight = false;
                debug!(count = tasks.len(), "collection query resolved");
                self.cache.replace(TASKS_KEY, tasks);
                self.load = LoadState::Ready;
                self.clamp_selection();
            }
            AppEvent::TasksFetched(Err(err)) => {
                self.fetch_in_flight = false;
                self.load = LoadState::Failed(err.to_string());
            }
            AppEvent::Created(Ok(task)) => {
                self.create_state.finish(true);
                self.cache.transform(TASKS_KEY, |mut tasks| {
                    tasks.push(task);
                    tasks
                });
                self.cache.invalidate(TASKS_KEY);
            }
            AppEvent::Created(Err(err)) => {
                self.create_state.finish(false);
                warn!(error = %err, "create task failed");
            }
            AppEvent::Updated(Ok(updated)) => {
                self.update_state.finish(true);
                self.cache.transform(TASKS_KEY, |tasks| {
                    tasks
                        .into_iter()
                        .map(|t| if t.id == updated.id { updated.clone() } else { t })
                        .collect()
                });
                self.cache.invalidate(TASKS_KEY);
            }
            AppEvent::Updated(Err(err)) => {
                self.update_state.finish(false);
                warn!(error = %err, "update task failed");
            }
            AppEvent::Deleted { id, result: Ok(()) } => {
                self.delete_state.finish(true);
                self.pending_delete = None;
                self.cache
                    .transform(TASKS_KEY, |tasks| tasks.into_iter().filter(|t| t.id != id).collect());
                self.cache.invalidate(TASKS_KEY);
                self.clamp_selection();
            }
            AppEvent::Deleted {
                id,
                result: Err(err),
            } => {
                self.delete_state.finish(false);
                self.pending_delete = None;
                warn!(task_id = id, error = %err, "delete task failed");
            }
        }
    }

    /// Drain and apply every event that has arrived. Non-blocking; the UI
    /// calls this once per tick.
    pub fn pump(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.apply(event);
        }
    }

    /// Await the next event without applying it. Test seam; the UI uses
    /// [`TaskApp::pump`].
    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }

    /// Take one already-arrived event without blocking, if any.
    pub fn poll_event(&mut self) -> Option<AppEvent> {
        self.rx.try_recv().ok()
    }

    // ─── Selection ────────────────────────────────────────────────────────────

    pub fn select_next(&mut self) {
        let len = self.visible_len();
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    // ─── Render state accessors ───────────────────────────────────────────────

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    /// The whole cached collection (server order), empty before first load.
    pub fn tasks(&self) -> Vec<Task> {
        self.cache
            .read(TASKS_KEY)
            .map(|read| read.value)
            .unwrap_or_default()
    }

    /// The rendered slice: at most [`VISIBLE_TASKS`] rows.
    pub fn visible_tasks(&self) -> Vec<Task> {
        let mut tasks = self.tasks();
        tasks.truncate(VISIBLE_TASKS);
        tasks
    }

    fn visible_len(&self) -> usize {
        self.tasks().len().min(VISIBLE_TASKS)
    }

    pub fn is_create_pending(&self) -> bool {
        self.create_state.is_pending()
    }

    pub fn is_update_pending(&self) -> bool {
        self.update_state.is_pending()
    }

    /// Whether this row's delete is in flight, by id identity.
    pub fn is_delete_pending_for(&self, id: TaskId) -> bool {
        self.pending_delete == Some(id)
    }

    pub fn is_fetching(&self) -> bool {
        self.fetch_in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn app_with(tasks: Vec<Task>) -> TaskApp {
        let cache = Arc::new(QueryCache::new(Duration::from_secs(60)));
        cache.replace(TASKS_KEY, tasks);
        TaskApp::new(ApiClient::new("http://localhost:0"), cache)
    }

    fn task(id: TaskId) -> Task {
        Task {
            id,
            title: format!("task {id}"),
            completed: false,
        }
    }

    #[test]
    fn focus_toggles_between_input_and_list() {
        let mut app = app_with(vec![]);
        assert_eq!(app.focus(), Focus::Input);
        app.toggle_focus();
        assert_eq!(app.focus(), Focus::List);
        app.toggle_focus();
        assert_eq!(app.focus(), Focus::Input);
    }

    #[test]
    fn selection_stays_within_the_visible_slice() {
        let mut app = app_with((1..=3).map(task).collect());

        app.select_prev();
        assert_eq!(app.selected(), 0);

        app.select_next();
        app.select_next();
        app.select_next();
        assert_eq!(app.selected(), 2, "selection stops at the last row");
    }

    #[test]
    fn selection_is_capped_by_the_render_limit() {
        let mut app = app_with((1..=20).map(task).collect());
        for _ in 0..30 {
            app.select_next();
        }
        assert_eq!(app.selected(), VISIBLE_TASKS - 1);
    }

    #[test]
    fn input_editing() {
        let mut app = app_with(vec![]);
        app.push_char('h');
        app.push_char('i');
        assert_eq!(app.input(), "hi");
        app.backspace();
        assert_eq!(app.input(), "h");
        app.backspace();
        app.backspace();
        assert_eq!(app.input(), "");
    }
}
