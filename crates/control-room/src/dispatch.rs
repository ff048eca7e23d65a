use crate::event_bus::PtzEventBus;
use common::ids;
use common::ptz::{
    CinematicInstruction, CinematographyResult, ControlCommand, ControlCommandResult,
    PtzCommandEvent,
};
use common::validation::epoch_ms;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Synthesised execution time reported on the legacy synchronous path.
const EXECUTION_TIME_MS: u32 = 100;

/// Legacy synchronous command path. Accepts a command, synthesises a success
/// result immediately and fans it out on the bus; nothing is enqueued.
/// Field devices that can poll should use the scheduler instead.
pub struct CommandDispatcher {
    bus: Arc<PtzEventBus>,
    commands: RwLock<HashMap<String, ControlCommand>>,
    instructions: RwLock<HashMap<String, CinematicInstruction>>,
}

impl CommandDispatcher {
    pub fn new(bus: Arc<PtzEventBus>) -> Self {
        Self {
            bus,
            commands: RwLock::new(HashMap::new()),
            instructions: RwLock::new(HashMap::new()),
        }
    }

    /// Accept a control command and publish the command/result pair to the
    /// camera's subscribers. The result always reports success; there is no
    /// FD acknowledgement to correlate on this path.
    pub async fn send_control_command(&self, mut command: ControlCommand) -> ControlCommandResult {
        if command.command_id.is_empty() {
            command.command_id = ids::next_id("cmd");
        }

        let resulting_ptz = command.ptz_parameters.clone().unwrap_or_default();
        let result = ControlCommandResult {
            command_id: command.command_id.clone(),
            success: true,
            error_message: String::new(),
            resulting_ptz,
            execution_time_ms: EXECUTION_TIME_MS,
        };

        let camera_id = command.camera_id.clone();
        {
            let mut commands = self.commands.write().await;
            commands.insert(command.command_id.clone(), command.clone());
        }

        if !camera_id.is_empty() {
            let event = PtzCommandEvent {
                command: Some(command),
                result: Some(result.clone()),
                timestamp_ms: epoch_ms(),
            };
            self.bus.publish(&camera_id, event).await;
        }

        info!(
            command_id = %result.command_id,
            camera_id = %camera_id,
            "control command dispatched"
        );
        result
    }

    pub async fn get_control_command(&self, command_id: &str) -> Option<ControlCommand> {
        let commands = self.commands.read().await;
        commands.get(command_id).cloned()
    }

    /// Record a cinematography instruction and acknowledge it as applied.
    pub async fn execute_cinematography(
        &self,
        mut instruction: CinematicInstruction,
    ) -> CinematographyResult {
        if instruction.instruction_id.is_empty() {
            instruction.instruction_id = ids::next_id("instr");
        }

        let applied_ptz = instruction.ptz_parameters.clone().unwrap_or_default();
        let result = CinematographyResult {
            instruction_id: instruction.instruction_id.clone(),
            camera_id: instruction.camera_id.clone(),
            success: true,
            error_message: String::new(),
            applied_ptz,
            completed_at_ms: epoch_ms(),
        };

        let mut instructions = self.instructions.write().await;
        instructions.insert(instruction.instruction_id.clone(), instruction);

        result
    }

    pub async fn get_instruction(&self, instruction_id: &str) -> Option<CinematicInstruction> {
        let instructions = self.instructions.read().await;
        instructions.get(instruction_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ptz::PtzParameters;

    fn dispatcher_with_bus() -> (Arc<PtzEventBus>, CommandDispatcher) {
        let bus = Arc::new(PtzEventBus::new(8));
        let dispatcher = CommandDispatcher::new(Arc::clone(&bus));
        (bus, dispatcher)
    }

    #[tokio::test]
    async fn send_assigns_id_and_echoes_requested_ptz() {
        let (_bus, dispatcher) = dispatcher_with_bus();
        let ptz = PtzParameters {
            pan: 10.0,
            tilt: 5.0,
            zoom: 2.0,
            ..Default::default()
        };

        let result = dispatcher
            .send_control_command(ControlCommand {
                command_id: String::new(),
                camera_id: "cam-b".to_string(),
                ptz_parameters: Some(ptz.clone()),
            })
            .await;

        assert!(result.success);
        assert!(!result.command_id.is_empty());
        assert_eq!(result.resulting_ptz, ptz);
        assert_eq!(result.execution_time_ms, 100);

        let stored = dispatcher.get_control_command(&result.command_id).await;
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn send_without_ptz_reports_neutral_position() {
        let (_bus, dispatcher) = dispatcher_with_bus();

        let result = dispatcher
            .send_control_command(ControlCommand {
                command_id: "cmd-1".to_string(),
                camera_id: "cam-b".to_string(),
                ptz_parameters: None,
            })
            .await;

        assert_eq!(result.command_id, "cmd-1");
        assert_eq!(result.resulting_ptz, PtzParameters::default());
    }

    #[tokio::test]
    async fn send_publishes_to_subscribers() {
        let (bus, dispatcher) = dispatcher_with_bus();
        let mut sub = bus.subscribe("cam-b").await;

        dispatcher
            .send_control_command(ControlCommand {
                command_id: String::new(),
                camera_id: "cam-b".to_string(),
                ptz_parameters: None,
            })
            .await;

        let event = sub.recv().await.expect("published event");
        assert!(event.command.is_some());
        assert!(event.result.as_ref().is_some_and(|r| r.success));
    }

    #[tokio::test]
    async fn cinematography_result_echoes_instruction() {
        let (_bus, dispatcher) = dispatcher_with_bus();
        let result = dispatcher
            .execute_cinematography(CinematicInstruction {
                instruction_id: String::new(),
                camera_id: "cam-b".to_string(),
                shot_type: Default::default(),
                target_angle: Default::default(),
                target_subjects: vec![],
                ptz_parameters: None,
                duration_ms: 500,
            })
            .await;

        assert!(result.success);
        assert!(!result.instruction_id.is_empty());
        assert_eq!(result.camera_id, "cam-b");
        assert!(dispatcher.get_instruction(&result.instruction_id).await.is_some());
    }
}
