//! `cyclolens avg` - one-shot average indicator

use super::{runtime, Session};
use anyhow::Result;
use cyclolens::controller::{Controller, ControllerState, Trigger};
use cyclolens::presentation::TerminalIndicator;
use std::time::Instant;
use tracing::debug;

/// Run one AVERAGE analysis through the controller and print the indicator.
///
/// Always succeeds: analyzer failures are logged and leave the indicator
/// hidden, the same way an editor status item would just not appear.
pub fn run(session: &Session, no_emoji: bool) -> Result<()> {
    let ctx = session.editor_context();
    let trigger = if ctx.active_file.is_some() {
        Trigger::EditorChanged
    } else {
        Trigger::Command
    };

    let now = Instant::now();
    let state = ControllerState::new(now).with_indicator(session.config.show_indicator());
    let mut controller = Controller::new(
        state,
        TerminalIndicator::new(no_emoji),
        session.config.controller_settings(),
    );

    let rt = runtime()?;
    let invocations = rt.block_on(controller.drive(&session.invoker, trigger, &ctx, now));
    debug!(
        "Average for {} took {} invocation(s)",
        session.target.display(),
        invocations
    );
    Ok(())
}
