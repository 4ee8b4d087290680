//! # Opsis simulator
//!
//! Runs both link nodes on the host against a virtual millisecond clock
//! and a lossy in-memory transport. Every random stream derives from one
//! seed, so a run is reproducible from its config file alone.
//!
//! ```text
//! opsis-sim [config.toml]
//! ```
//!
//! With no argument the built-in scenario runs: five virtual seconds,
//! 5 % datagram loss, a stick sweep right then up, level button policy.

use std::cell::Cell;
use std::env;
use std::path::Path;
use std::rc::Rc;

use anyhow::Result;
use rand_core::SeedableRng;
use rand_wyrand::WyRand;
use tracing::{info, warn};

mod config;
mod link;
mod peripherals;

use opsis_core::config::ButtonPolicy;
use opsis_core::control::{AxisThresholds, ControlCell, OneShotLatch};
use opsis_core::diag::FpsMeter;
use opsis_core::node::{
    boot_camera, handle_inbound_control, handle_inbound_frame, CameraNode, DisplayNode, MediaEvent,
};
use opsis_protocol::peer::format_peer;
use opsis_protocol::{PeerAddress, MAX_FRAME_LEN};

use config::SimConfig;
use link::{inbox, LinkStats, LossyLink};
use peripherals::{Clock, ConsoleSink, DriveSerial, ScriptedStick, SimButton, SimCamera};

/// Station addresses from the reference hardware
const CAMERA_PEER: PeerAddress = [0x80, 0xB5, 0x4E, 0xCD, 0x29, 0x20];
const DISPLAY_PEER: PeerAddress = [0xC0, 0x49, 0xEF, 0xE0, 0xDF, 0xB4];

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = match env::args().nth(1) {
        Some(path) => SimConfig::load(Path::new(&path))?,
        None => SimConfig::default(),
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        duration_ms = config.run.duration_ms,
        seed = config.run.seed,
        loss_percent = config.link.loss_percent,
        "starting link simulation"
    );
    info!(
        camera = format_peer(&CAMERA_PEER).as_str(),
        display = format_peer(&DISPLAY_PEER).as_str(),
        "stations"
    );

    run(&config)
}

fn run(config: &SimConfig) -> Result<()> {
    let clock: Clock = Rc::new(Cell::new(0));
    let seed = config.run.seed;

    // Independent streams so changing one knob does not reshuffle the rest
    let media_rng = WyRand::seed_from_u64(seed);
    let control_rng = WyRand::seed_from_u64(seed ^ 0x1);
    let camera_rng = WyRand::seed_from_u64(seed ^ 0x2);

    let to_display = inbox();
    let to_camera = inbox();
    let media_stats = Rc::new(std::cell::RefCell::new(LinkStats::default()));
    let control_stats = Rc::new(std::cell::RefCell::new(LinkStats::default()));

    let mut sensor = SimCamera::new(config.camera.clone(), clock.clone(), camera_rng);
    let capture = boot_camera(&mut sensor, config.camera.fast_memory)
        .map_err(|err| anyhow::anyhow!("capture bring-up failed: {err:?}"))?;
    info!(buffers = capture.buffer_count, "camera node ready");

    let drive_lines = Rc::new(Cell::new(0u64));
    let mut camera = CameraNode::new(
        sensor,
        LossyLink::new(
            "media",
            to_display.clone(),
            media_rng,
            config.link.loss_percent,
            0,
            media_stats.clone(),
        ),
        DriveSerial::new(drive_lines.clone()),
        DISPLAY_PEER,
        config.timing,
    );

    let latch = OneShotLatch::new();
    let button = match config.input.button {
        ButtonPolicy::Level => SimButton::level(&config.input, clock.clone()),
        ButtonPolicy::OneShot => SimButton::one_shot(&latch),
    };
    let mut display = DisplayNode::new(
        ScriptedStick::new(config.input.stick.clone(), clock.clone()),
        button,
        LossyLink::new(
            "control",
            to_camera.clone(),
            control_rng,
            config.link.loss_percent,
            config.link.corrupt_percent,
            control_stats.clone(),
        ),
        CAMERA_PEER,
        AxisThresholds::default(),
        config.timing,
    );

    let control_cell = ControlCell::new();
    let mut sink = ConsoleSink::default();
    let mut meter = FpsMeter::new();
    let mut discarded_control = 0u64;
    let mut stalled_polls = 0u64;

    for now_ms in 0..=config.run.duration_ms {
        clock.set(now_ms);

        // Wire the one-shot trigger edge as the ISR would
        if config.input.button == ButtonPolicy::OneShot
            && config.input.press_at_ms == Some(now_ms)
        {
            latch.record_edge();
        }

        display.poll(now_ms);

        while let Some(payload) = to_camera.borrow_mut().pop_front() {
            if let Err(err) = handle_inbound_control(&payload, &control_cell) {
                discarded_control += 1;
                warn!(?err, "control datagram discarded");
            }
        }

        let poll = camera.poll(&control_cell, now_ms);
        match poll.media {
            Some(MediaEvent::Sent {
                report: Some(reported),
                ..
            }) => {
                info!(frames = camera.frames_sent(), "sent {} bytes", reported);
            }
            Some(MediaEvent::SendFailed(err)) => warn!(?err, "frame transmit failed"),
            Some(MediaEvent::Stalled) => stalled_polls += 1,
            _ => {}
        }

        while let Some(payload) = to_display.borrow_mut().pop_front() {
            match handle_inbound_frame(&payload, MAX_FRAME_LEN, &mut sink, &mut meter, now_ms) {
                Ok(Some(report)) => {
                    info!(fps = report.fps, bytes = report.last_frame_bytes, "render rate");
                }
                Ok(None) => {}
                Err(err) => warn!(?err, "inbound frame dropped"),
            }
        }
    }

    info!(
        frames_sent = camera.frames_sent(),
        frames_rendered = sink.rendered,
        frames_rejected = sink.rejected,
        media_dropped = media_stats.borrow().dropped,
        control_dropped = control_stats.borrow().dropped,
        control_corrupted = control_stats.borrow().corrupted,
        control_discarded = discarded_control,
        drive_lines = drive_lines.get(),
        stalled_polls,
        "simulation complete"
    );

    Ok(())
}
