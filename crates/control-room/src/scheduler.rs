use common::ids;
use common::ptz::{CinematicInstruction, PtzCommand};
use common::tasks::{
    CameraQueueStatus, PollingRequest, Task, TaskLayer, TaskPayload, TaskStatus,
};
use common::validation::epoch_ms;
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;
use tracing::debug;

/// Per-camera queue state. Direct PTZ commands occupy the high-priority
/// layer; cinematic instructions run only while the PTZ layer is empty.
struct CameraQueue {
    camera_id: String,
    ptz_queue: VecDeque<Task>,
    cinematic_queue: VecDeque<Task>,
    executing_task: Option<Task>,
    interrupt_pending: bool,
    last_polling_at_ms: i64,
}

impl CameraQueue {
    fn new(camera_id: &str) -> Self {
        Self {
            camera_id: camera_id.to_string(),
            ptz_queue: VecDeque::new(),
            cinematic_queue: VecDeque::new(),
            executing_task: None,
            interrupt_pending: false,
            last_polling_at_ms: 0,
        }
    }

    fn status(&self) -> CameraQueueStatus {
        CameraQueueStatus {
            camera_id: self.camera_id.clone(),
            ptz_queue_size: self.ptz_queue.len().min(u32::MAX as usize) as u32,
            cinematic_queue_size: self.cinematic_queue.len().min(u32::MAX as usize) as u32,
            executing_task: self.executing_task.clone(),
            last_polling_at_ms: self.last_polling_at_ms,
        }
    }
}

/// Two-layer command scheduler, one queue per camera. One lock over all
/// queues; enqueue and poll are brief and never suspend while holding it.
#[derive(Default)]
pub struct CommandScheduler {
    queues: RwLock<HashMap<String, CameraQueue>>,
}

impl CommandScheduler {
    pub fn new() -> Self {
        Self {
            queues: RwLock::new(HashMap::new()),
        }
    }

    /// Accept a direct PTZ command. The entire cinematic queue is dropped
    /// and, if a cinematic task is executing, the FD is flagged to abort it
    /// at its next poll.
    pub async fn enqueue_ptz(&self, camera_id: &str, command: PtzCommand) -> String {
        let mut queues = self.queues.write().await;
        let queue = queues
            .entry(camera_id.to_string())
            .or_insert_with(|| CameraQueue::new(camera_id));

        let task_id = ids::next_id("ptz-task");
        let task = Task {
            task_id: task_id.clone(),
            layer: TaskLayer::Ptz,
            status: TaskStatus::Pending,
            payload: TaskPayload::Ptz { command },
            created_at_ms: epoch_ms(),
            interrupted: false,
        };

        let dropped = queue.cinematic_queue.len();
        queue.cinematic_queue.clear();
        if dropped > 0 {
            telemetry::metrics::SCHEDULER_TASKS_PREEMPTED.inc_by(dropped as u64);
        }

        if queue
            .executing_task
            .as_ref()
            .is_some_and(|task| task.layer == TaskLayer::Cinematic)
        {
            queue.interrupt_pending = true;
        }

        queue.ptz_queue.push_back(task);
        telemetry::metrics::SCHEDULER_TASKS_ENQUEUED
            .with_label_values(&["ptz"])
            .inc();

        debug!(
            camera_id = %camera_id,
            task_id = %task_id,
            dropped_cinematic = dropped,
            "ptz command enqueued"
        );
        task_id
    }

    /// Accept a cinematic instruction. Never touches the PTZ layer, the
    /// executing task, or the interrupt flag.
    pub async fn enqueue_cinematic(
        &self,
        camera_id: &str,
        instruction: CinematicInstruction,
    ) -> String {
        let mut queues = self.queues.write().await;
        let queue = queues
            .entry(camera_id.to_string())
            .or_insert_with(|| CameraQueue::new(camera_id));

        let task_id = ids::next_id("cine-task");
        let task = Task {
            task_id: task_id.clone(),
            layer: TaskLayer::Cinematic,
            status: TaskStatus::Pending,
            payload: TaskPayload::Cinematic { instruction },
            created_at_ms: epoch_ms(),
            interrupted: false,
        };

        queue.cinematic_queue.push_back(task);
        telemetry::metrics::SCHEDULER_TASKS_ENQUEUED
            .with_label_values(&["cinematic"])
            .inc();

        debug!(camera_id = %camera_id, task_id = %task_id, "cinematic instruction enqueued");
        task_id
    }

    /// One atomic poll pass: completion bookkeeping, interrupt snapshot,
    /// then head/next selection with the PTZ layer taking priority.
    pub async fn poll(&self, req: &PollingRequest) -> (Option<Task>, Option<Task>, bool) {
        let mut queues = self.queues.write().await;
        let queue = queues
            .entry(req.camera_id.clone())
            .or_insert_with(|| CameraQueue::new(&req.camera_id));

        queue.last_polling_at_ms = epoch_ms();
        telemetry::metrics::SCHEDULER_POLLS.inc();

        // Completion is idempotent: an unknown or already-dequeued task id
        // leaves both queues untouched.
        if !req.completed_task_id.is_empty() {
            Self::dequeue_completed(&mut queue.ptz_queue, &req.completed_task_id);
            Self::dequeue_completed(&mut queue.cinematic_queue, &req.completed_task_id);
            if queue
                .executing_task
                .as_ref()
                .is_some_and(|task| task.task_id == req.completed_task_id)
            {
                queue.executing_task = None;
            }
        }

        let interrupt = std::mem::take(&mut queue.interrupt_pending);

        let src = if !queue.ptz_queue.is_empty() {
            &mut queue.ptz_queue
        } else {
            &mut queue.cinematic_queue
        };

        if src.is_empty() {
            return (None, None, interrupt);
        }

        src[0].status = TaskStatus::Executing;
        let current = src[0].clone();
        let next = src.get(1).cloned();
        queue.executing_task = Some(current.clone());

        (Some(current), next, interrupt)
    }

    fn dequeue_completed(queue: &mut VecDeque<Task>, task_id: &str) {
        if let Some(pos) = queue.iter().position(|task| task.task_id == task_id) {
            queue.remove(pos);
        }
    }

    /// Queue snapshot for one camera; unknown cameras report empty queues.
    pub async fn queue_status(&self, camera_id: &str) -> CameraQueueStatus {
        let queues = self.queues.read().await;
        match queues.get(camera_id) {
            Some(queue) => queue.status(),
            None => CameraQueueStatus {
                camera_id: camera_id.to_string(),
                ptz_queue_size: 0,
                cinematic_queue_size: 0,
                executing_task: None,
                last_polling_at_ms: 0,
            },
        }
    }

    /// Queue snapshots for every camera the scheduler has seen.
    pub async fn all_queue_statuses(&self) -> Vec<CameraQueueStatus> {
        let queues = self.queues.read().await;
        queues.values().map(CameraQueue::status).collect()
    }
}
