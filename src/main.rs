mod nmea;
mod render;
mod serialstream;
mod session;
mod state;
mod template;

use crate::nmea::types::Key;
use crate::render::Render;
use crate::serialstream::{LineReader, SerialStream};
use crate::session::{Flow, Options, Session};
use crate::template::Template;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use env_logger::Builder;
use log::{debug, info, warn};
use structopt::StructOpt;

/// Pause between polls when the device has no complete line
const IDLE_BACKOFF: Duration = Duration::from_millis(20);

#[derive(Debug, StructOpt)]
#[structopt(name = "gnss-reader",
            about = "Read and interpret NMEA-0183 sentences from a GNSS receiver.")]
struct Opt {
    /// Serial device of the receiver
    #[structopt(short, long, default_value = "/dev/ttyUSB0")]
    port: String,

    /// Baud rate of the serial device
    #[structopt(short, long, default_value = "115200")]
    baud: u32,

    /// Emit compact JSON status lines once per second
    #[structopt(short, long)]
    json: bool,

    /// Echo valid NMEA sentences
    #[structopt(short, long)]
    raw: bool,

    /// Append valid NMEA sentences to this file
    #[structopt(short, long, parse(from_os_str))]
    log: Option<PathBuf>,

    /// Exit after the first complete fix summary
    #[structopt(short, long)]
    once: bool,

    /// Custom format string, e.g. '%(utc_time)s|lat: %(lat).6f'
    #[structopt(short, long)]
    format: Option<String>,

    /// Allow output before latitude, longitude and time are known
    #[structopt(short = "P", long)]
    partial: bool,

    /// Show available format keys and exit
    #[structopt(long)]
    help_format: bool,
}

fn print_format_keys() {
    println!("Available format keys for use with --format:");
    for key in Key::ALL {
        println!("  {:<28} - {}", key.example(), key.help());
    }
    println!("\nExample format strings:");
    println!("  --format 'Lat: %(lat).6f, Lon: %(lon).6f'");
    println!("  --format '%(utc_time)s | %(lat).6f,%(lon).6f | Alt: %(alt_m).1fm | Sats: %(num_sats)d'");
    println!("  --format 'Speed: %(speed_kmh).1f km/h | Course: %(course_deg).0f deg'");
}

fn main() -> Result<()> {
    Builder::from_default_env().format_timestamp_secs().init();

    /**************************************************************************
     * Program arguments
     **************************************************************************/
    let opt = Opt::from_args();
    if opt.help_format {
        print_format_keys();
        return Ok(());
    }

    let render = if let Some(f) = &opt.format {
        let template = Template::new(f);
        if let Some(e) = template.problem() {
            warn!("format string '{}' will not render: {}", f, e);
        }
        Render::Template(template)
    } else if opt.json {
        Render::Json
    } else {
        Render::Human
    };

    let log = match &opt.log {
        Some(path) => {
            let sink = session::open_log(path)
                .with_context(|| format!("unable to open log file {}", path.display()))?;
            Some(Box::new(sink) as Box<dyn Write>)
        }
        None => None,
    };

    let stream = SerialStream::open(&opt.port, opt.baud)
        .with_context(|| format!("failed to open {} at {}", opt.port, opt.baud))?;
    info!("reading from {} at {} baud", opt.port, opt.baud);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || r.store(false, Ordering::SeqCst))
        .context("unable to install interrupt handler")?;

    /**************************************************************************
     * Main Program logic
     **************************************************************************/
    let options = Options {
        render,
        partial: opt.partial,
        once: opt.once,
        echo_raw: opt.raw,
    };
    let mut session = Session::new(options, io::stdout(), log);
    let mut lines = LineReader::new(stream);

    while running.load(Ordering::SeqCst) {
        match lines.next_line().context("error reading from device")? {
            Some(line) => {
                let flow = session
                    .feed(&line, Instant::now())
                    .context("error writing output")?;
                if flow == Flow::Finished {
                    break;
                }
            }
            None => thread::sleep(IDLE_BACKOFF),
        }
    }
    if !running.load(Ordering::SeqCst) {
        info!("interrupted");
        session.interrupted().context("error writing output")?;
    }

    debug!("final state: {:?}", session.state());
    session.finish().context("unable to flush output")?;
    Ok(())
}
