//! Event loop driving an `EngineController`.
//!
//! One task owns the engine and processes inputs and timer expiries
//! strictly one at a time. Every timer is a single-flight `Deadline`:
//! - idle detection, re-armed on every pointer move
//! - countdown tick, armed only while a challenge is live
//! - one auto-dismiss deadline per notice kind

use tokio::sync::{broadcast, mpsc};
use vigil_common::{GateState, Result, VigilError};

use crate::controller::EngineController;
use crate::event::{EngineEvent, InputEvent};
use crate::notice::NoticeKind;
use crate::timer::Deadline;

/// Run the engine until the input channel closes or shutdown is signalled.
///
/// Returns the engine so the caller can inspect final scores.
pub async fn run_engine(
    mut engine: EngineController,
    mut inputs: mpsc::Receiver<InputEvent>,
    outputs: mpsc::Sender<EngineEvent>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<EngineController> {
    let idle_timeout = engine.idle_timeout();
    let tick = engine.config().challenge.tick();
    let dismiss_after = engine.config().challenge.notice_dismiss();

    let mut idle = Deadline::new();
    let mut countdown = Deadline::new();
    let mut bot_notice = Deadline::new();
    let mut fail_notice = Deadline::new();

    tracing::info!("Engine loop started");

    loop {
        tokio::select! {
            maybe_event = inputs.recv() => {
                let Some(event) = maybe_event else {
                    tracing::info!("Input channel closed");
                    break;
                };
                let moved = matches!(event, InputEvent::PointerMove { .. });
                engine.handle(event);
                if moved {
                    idle.arm(idle_timeout);
                }
            }
            _ = idle.fired() => {
                engine.on_idle_timeout();
            }
            _ = countdown.fired() => {
                engine.on_countdown_tick();
            }
            _ = bot_notice.fired() => {
                engine.dismiss_notice(NoticeKind::BotSuspected);
            }
            _ = fail_notice.fired() => {
                engine.dismiss_notice(NoticeKind::ChallengeFailed);
            }
            _ = shutdown.recv() => {
                tracing::info!("Engine loop shutting down...");
                break;
            }
        }

        if engine.gate_state() == GateState::Armed {
            if !countdown.is_armed() {
                countdown.arm(tick);
            }
        } else {
            countdown.cancel();
        }

        for event in engine.drain_events() {
            if let EngineEvent::NoticeRaised { kind, .. } = &event {
                match kind {
                    NoticeKind::BotSuspected => bot_notice.arm(dismiss_after),
                    NoticeKind::ChallengeFailed => fail_notice.arm(dismiss_after),
                }
            }
            outputs
                .send(event)
                .await
                .map_err(|_| VigilError::Internal("engine output channel closed".into()))?;
        }
    }

    idle.cancel();
    countdown.cancel();
    engine.teardown();

    Ok(engine)
}
