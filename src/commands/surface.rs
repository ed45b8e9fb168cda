//! CLI command handlers driving the surface.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rgbscape::config::SurfaceConfig;
use rgbscape::devices::{SinkKind, TerminalSession, VirtualDeviceProvider};
use rgbscape::surface::Surface;
use rgbscape::{CustomUpdateData, TimerUpdateTrigger, UpdateTrigger};
use tracing::info;

use super::{setup_interrupt_handler, CommandResult};
use crate::cli::Output;

/// Rows above the device grids in the terminal preview
const HEADER_ROWS: u16 = 2;

fn build(
    config: &SurfaceConfig,
    sink: SinkKind,
) -> anyhow::Result<(Arc<Surface>, VirtualDeviceProvider)> {
    let provider =
        VirtualDeviceProvider::new(config.device.clone(), sink).with_terminal_top(HEADER_ROWS);
    let surface = Surface::new();
    let devices = surface.load(&provider)?;
    let groups = config.attach_groups(&surface)?;
    info!(
        "Surface ready: {} devices, {} groups, boundary {:?}",
        devices,
        groups,
        surface.boundary()
    );
    Ok((surface, provider))
}

/// Run the surface until Ctrl-C, q/Esc in the preview, or `frames` frames.
pub fn run(
    config: &SurfaceConfig,
    fps: Option<f64>,
    frames: Option<u64>,
    output: Output,
) -> CommandResult {
    let sink = match output {
        Output::Terminal => SinkKind::Terminal,
        Output::Log => SinkKind::Log,
        Output::Memory => SinkKind::Memory,
    };
    let running = setup_interrupt_handler();
    let (surface, provider) = build(config, sink)?;

    let frame_count = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&frame_count);
    surface.updated().subscribe(move |_| {
        counter.fetch_add(1, Ordering::Relaxed);
    });
    let error_count = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&error_count);
    surface.exception().subscribe(move |_| {
        counter.fetch_add(1, Ordering::Relaxed);
    });

    let fps = fps.unwrap_or(config.surface.fps);
    let timer = Arc::new(TimerUpdateTrigger::with_fps("surface", fps));
    timer.set_custom_data(CustomUpdateData::default().flush_leds(config.surface.flush_leds));
    surface.register_trigger(timer.clone());

    let session = match output {
        Output::Terminal => Some(TerminalSession::enter()?),
        _ => None,
    };
    timer.start()?;
    let started = Instant::now();

    while running.load(Ordering::SeqCst) {
        let done = frame_count.load(Ordering::Relaxed);
        if frames.is_some_and(|limit| done >= limit) {
            break;
        }
        match &session {
            Some(session) => {
                session.status(
                    0,
                    &format!(
                        "rgbscape | {:.0} fps | frame {} | {} errors | q/Esc to quit",
                        fps,
                        done,
                        error_count.load(Ordering::Relaxed)
                    ),
                )?;
                if session.poll_quit(Duration::from_millis(50))? {
                    break;
                }
            }
            None => std::thread::sleep(Duration::from_millis(50)),
        }
    }

    surface.dispose();
    drop(session);

    let frames_done = frame_count.load(Ordering::Relaxed);
    println!(
        "Rendered {} frames in {:.1}s ({} errors)",
        frames_done,
        started.elapsed().as_secs_f64(),
        error_count.load(Ordering::Relaxed)
    );
    if output == Output::Memory {
        for device in &config.device {
            let name = device.name.clone().unwrap_or_else(|| {
                rgbscape::DeviceInfo::create_device_name(&device.manufacturer, &device.model)
            });
            if let Some(sink) = provider.memory_sink(&name) {
                println!(
                    "  {:<16} {} batches, {} LEDs lit",
                    name,
                    sink.batches().len(),
                    sink.last_colors().values().filter(|c| c.a() > 0.0).count()
                );
            }
        }
    }
    Ok(())
}

/// Render a single frame and print the resulting LED colors.
pub fn dump(config: &SurfaceConfig, json: bool, flush: bool) -> CommandResult {
    let (surface, _provider) = build(config, SinkKind::Memory)?;
    surface.update(flush);

    if json {
        let leds: Vec<serde_json::Value> = surface
            .devices()
            .iter()
            .flat_map(|device| {
                let name = device.name().to_string();
                device.leds().into_iter().map(move |led| {
                    serde_json::json!({
                        "device": name,
                        "id": led.id().0,
                        "boundary": led.absolute_boundary(),
                        "color": led.color(),
                    })
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "boundary": surface.boundary(),
                "leds": leds,
            }))?
        );
    } else {
        println!("Surface boundary: {:?}", surface.boundary());
        println!();
        println!(
            "{:<16} {:>5} {:>8} {:>8}  Color",
            "Device", "LED", "X", "Y"
        );
        println!("{}", "-".repeat(52));
        for device in surface.devices() {
            for led in device.leds() {
                let rect = led.absolute_boundary();
                println!(
                    "{:<16} {:>5} {:>8.1} {:>8.1}  {}",
                    device.name(),
                    led.id().0,
                    rect.x(),
                    rect.y(),
                    led.color().to_hex_argb()
                );
            }
        }
    }

    surface.dispose();
    Ok(())
}
