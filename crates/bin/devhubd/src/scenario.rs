//! The household scenario: a light, a speaker and a toilet going through a
//! wake-up routine and a sleep routine.
//!
//! Each routine is a parallel program for the independent commands followed
//! by a sequential program for the ones that must come after.

use std::sync::Arc;

use devhub_adapter_virtual::{HueLight, SmartSpeaker, SmartToilet};
use devhub_app::services::hub_service::HubService;
use devhub_domain::error::DispatchError;
use devhub_domain::id::DeviceId;
use devhub_domain::message::{CommandKind, Message};
use devhub_domain::program::Program;
use devhub_domain::report::ProgramReport;

use crate::config::DevicesConfig;

/// Song played once the speaker is on.
pub const WAKE_UP_SONG: &str = "Rick Astley - Never Gonna Give You Up";

/// Errors raised while setting up or running the scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// A registration task did not complete.
    #[error("device registration task failed")]
    Registration(#[from] tokio::task::JoinError),
    /// A program failed.
    #[error("program failed")]
    Dispatch(#[from] DispatchError),
}

/// The registered devices, with handles to inspect their state.
pub struct Household {
    pub light: Arc<HueLight>,
    pub speaker: Arc<SmartSpeaker>,
    pub toilet: Arc<SmartToilet>,
    pub light_id: DeviceId,
    pub speaker_id: DeviceId,
    pub toilet_id: DeviceId,
}

/// Build the three devices and register them concurrently.
///
/// # Errors
///
/// Returns [`ScenarioError::Registration`] if a registration task panics.
pub async fn register_household(
    hub: &HubService,
    devices: &DevicesConfig,
) -> Result<Household, ScenarioError> {
    let light = Arc::new(HueLight::new(devices.light_latency()));
    let speaker = Arc::new(SmartSpeaker::new(devices.speaker_latency()));
    let toilet = Arc::new(SmartToilet::new(devices.toilet_latency()));

    let light_task = tokio::spawn({
        let (hub, device) = (hub.clone(), Arc::clone(&light));
        async move { hub.register(device) }
    });
    let speaker_task = tokio::spawn({
        let (hub, device) = (hub.clone(), Arc::clone(&speaker));
        async move { hub.register(device) }
    });
    let toilet_task = tokio::spawn({
        let (hub, device) = (hub.clone(), Arc::clone(&toilet));
        async move { hub.register(device) }
    });

    let (light_id, speaker_id, toilet_id) =
        tokio::try_join!(light_task, speaker_task, toilet_task)?;

    Ok(Household {
        light,
        speaker,
        toilet,
        light_id,
        speaker_id,
        toilet_id,
    })
}

/// Light and speaker on together, then the song.
#[must_use]
pub fn wake_up(household: &Household) -> [Program; 2] {
    [
        Program::parallel(vec![
            Message::new(household.light_id, CommandKind::SwitchOn),
            Message::new(household.speaker_id, CommandKind::SwitchOn),
        ]),
        Program::sequential(vec![Message::with_payload(
            household.speaker_id,
            CommandKind::PlaySong,
            WAKE_UP_SONG,
        )]),
    ]
}

/// Light off, speaker off and flush together, then clean.
#[must_use]
pub fn sleep(household: &Household) -> [Program; 2] {
    [
        Program::parallel(vec![
            Message::new(household.light_id, CommandKind::SwitchOff),
            Message::new(household.speaker_id, CommandKind::SwitchOff),
            Message::new(household.toilet_id, CommandKind::Flush),
        ]),
        Program::sequential(vec![Message::new(household.toilet_id, CommandKind::Clean)]),
    ]
}

/// Run the wake-up routine then the sleep routine, program after program.
///
/// # Errors
///
/// Returns the first program failure; later programs are not run.
pub async fn run(
    hub: &HubService,
    household: &Household,
) -> Result<Vec<ProgramReport>, DispatchError> {
    let mut reports = Vec::with_capacity(4);
    for program in wake_up(household).into_iter().chain(sleep(household)) {
        reports.push(hub.run_program(program).await?);
    }
    Ok(reports)
}
