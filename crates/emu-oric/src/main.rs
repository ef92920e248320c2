//! Oric emulator binary.
//!
//! Runs in real time with a render thread, or headless for a fixed number
//! of frames. Host events arrive on stdin as one hex bus address per line
//! (`FBCD`, `$F01E`, `0xFCBA`); only addresses in the `$F000` page count.

use std::error::Error;
use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;
use std::thread;

use emu_core::Observable;
use emu_oric::{
    EventSender, FrameRunner, FrameSink, MediaLibrary, NoRomHalt, NullSink, Oric, OricConfig,
    Pacer, Settings, Snapshot, capture, event_queue, spawn_renderer,
};
use log::{info, warn};

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

struct CliArgs {
    config_path: Option<PathBuf>,
    folder: Option<PathBuf>,
    headless: bool,
    frames: Option<u64>,
    screenshot_path: Option<PathBuf>,
    record_dir: Option<PathBuf>,
    load_state: Option<PathBuf>,
    save_state: Option<PathBuf>,
    no_tape: bool,
    no_fdc: bool,
    dump_state: bool,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        config_path: None,
        folder: None,
        headless: false,
        frames: None,
        screenshot_path: None,
        record_dir: None,
        load_state: None,
        save_state: None,
        no_tape: false,
        no_fdc: false,
        dump_state: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                cli.config_path = args.get(i).map(PathBuf::from);
            }
            "--folder" => {
                i += 1;
                cli.folder = args.get(i).map(PathBuf::from);
            }
            "--headless" => {
                cli.headless = true;
            }
            "--frames" => {
                i += 1;
                cli.frames = args.get(i).and_then(|s| s.parse().ok());
            }
            "--screenshot" => {
                i += 1;
                cli.screenshot_path = args.get(i).map(PathBuf::from);
            }
            "--record" => {
                i += 1;
                cli.record_dir = args.get(i).map(PathBuf::from);
            }
            "--load-state" => {
                i += 1;
                cli.load_state = args.get(i).map(PathBuf::from);
            }
            "--save-state" => {
                i += 1;
                cli.save_state = args.get(i).map(PathBuf::from);
            }
            "--no-tape" => {
                cli.no_tape = true;
            }
            "--no-fdc" => {
                cli.no_fdc = true;
            }
            "--dump-state" => {
                cli.dump_state = true;
            }
            "--help" | "-h" => {
                eprintln!("Usage: emu-oric [OPTIONS]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --config <file>      Settings file (JSON, e.g. {{\"FOLDER\": \"/oric\"}})");
                eprintln!("  --folder <dir>       Media folder, overrides the settings file");
                eprintln!("  --headless           Run without pacing or a render thread");
                eprintln!("  --frames <n>         Frames to run [headless default: 200]");
                eprintln!("  --screenshot <file>  Save a PNG screenshot at the end");
                eprintln!("  --record <dir>       Save every rendered frame as PNG");
                eprintln!("  --load-state <file>  Restore a snapshot before running");
                eprintln!("  --save-state <file>  Write a snapshot at the end");
                eprintln!("  --no-tape            Leave the cassette deck out");
                eprintln!("  --no-fdc             Leave the floppy controller out");
                eprintln!("  --dump-state         Print every observable value at the end");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

// ---------------------------------------------------------------------------
// Event transport
// ---------------------------------------------------------------------------

fn parse_hex(line: &str) -> Option<u16> {
    let text = line.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .or_else(|| text.strip_prefix('$'))
        .unwrap_or(text);
    u16::from_str_radix(digits, 16).ok()
}

/// Feed stdin lines to the event queue until stdin closes.
fn spawn_stdin_transport(mut events: EventSender) -> io::Result<()> {
    thread::Builder::new()
        .name("oric-events".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                match parse_hex(&line) {
                    Some(address) => {
                        events.snoop(address);
                    }
                    None if line.trim().is_empty() => {}
                    None => warn!("events: not an address: {line}"),
                }
            }
            info!("events: stdin closed, {} dropped", events.dropped());
        })?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

fn frame_sink(cli: &CliArgs) -> Result<Box<dyn FrameSink>, Box<dyn Error>> {
    Ok(match &cli.record_dir {
        Some(dir) => Box::new(capture::PngSink::new(dir)?),
        None => Box::new(NullSink),
    })
}

fn make_oric(cli: &CliArgs) -> Result<Oric, Box<dyn Error>> {
    let settings = match &cli.config_path {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let folder = cli
        .folder
        .clone()
        .unwrap_or_else(|| PathBuf::from(settings.folder()));

    let media = MediaLibrary::new(&folder);
    if let Err(e) = media.ensure_folder() {
        warn!("media: cannot create {}: {e}", folder.display());
    }

    let rom = match media.load_rom() {
        Ok(rom) => rom,
        Err(e) if cli.headless => return Err(e.into()),
        Err(e) => NoRomHalt::new(&e, frame_sink(cli)?).run(),
    };

    let mut config = OricConfig::new(rom, media.load_boot_rom(), folder);
    config.tape_enabled = !cli.no_tape;
    config.fdc_enabled = !cli.no_fdc;
    let mut oric = Oric::new(config)?;

    if let Some(path) = &cli.load_state {
        let snapshot = Snapshot::from_bytes(&fs::read(path)?)?;
        oric.restore(&snapshot);
    }
    Ok(oric)
}

fn finish(cli: &CliArgs, oric: Oric) -> Result<(), Box<dyn Error>> {
    if cli.dump_state {
        for path in oric.query_paths() {
            if let Some(value) = oric.query(path) {
                println!("{path} = {value}");
            }
        }
    }
    if let Some(path) = &cli.screenshot_path {
        capture::save_screenshot(&oric, path)?;
        eprintln!("Screenshot saved to {}", path.display());
    }
    if let Some(path) = &cli.save_state {
        fs::write(path, Snapshot::capture(&oric).to_bytes())?;
        eprintln!("Snapshot saved to {}", path.display());
    }
    oric.discard();
    Ok(())
}

// ---------------------------------------------------------------------------
// Run modes
// ---------------------------------------------------------------------------

fn run_headless(cli: &CliArgs) -> Result<(), Box<dyn Error>> {
    let mut oric = make_oric(cli)?;
    let (events, receiver) = event_queue();
    spawn_stdin_transport(events)?;
    let mut runner = FrameRunner::new(receiver);
    if cli.record_dir.is_some() {
        runner = runner.with_display(spawn_renderer(frame_sink(cli)?)?);
    }

    let frames = cli.frames.unwrap_or(200);
    for _ in 0..frames {
        runner.run_frame(&mut oric);
    }
    if let Some(display) = runner.take_display() {
        display.stop();
    }
    info!("oric: {frames} frames, {} ticks", oric.ticks());
    finish(cli, oric)
}

fn run_realtime(cli: &CliArgs) -> Result<(), Box<dyn Error>> {
    let mut oric = make_oric(cli)?;
    let (events, receiver) = event_queue();
    spawn_stdin_transport(events)?;
    let display = spawn_renderer(frame_sink(cli)?)?;
    let mut runner = FrameRunner::new(receiver).with_display(display);
    let mut pacer = Pacer::default();

    while cli.frames.is_none_or(|n| runner.frames() < n) {
        let report = runner.run_frame(&mut oric);
        pacer.pace(report.exec_time);
    }

    if let Some(display) = runner.take_display() {
        let presented = display.stop();
        info!(
            "oric: {} frames, {presented} presented, {} overruns",
            runner.frames(),
            pacer.overruns()
        );
    }
    finish(cli, oric)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = parse_args();
    if cli.headless {
        run_headless(&cli)
    } else {
        run_realtime(&cli)
    }
}
