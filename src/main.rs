mod args;
mod coord;
mod delay;
mod enu;
mod error;
mod mbr;
mod obs;
mod plot;

use std::fs::File;
use std::io::{BufWriter, Write};

use clap::{CommandFactory, Parser};

use coord::HourAngleMode;
use delay::{delay_series, delay_to_seconds};
use enu::{baseline_vector, east_west, north_south};
use error::DynError;

fn main() -> Result<(), DynError> {
    if std::env::args_os().len() == 1 {
        args::Args::command().print_help()?;
        println!();
        return Ok(());
    }

    let args = args::Args::parse();
    if args.cpu == 0 {
        return Err("--cpu must be at least 1".into());
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(args.cpu)
        .build_global()
        .map_err(|_| "Failed to initialise rayon thread pool")?;

    let obs_data = if let Some(obs_path) = &args.obs {
        Some(obs::parse_obs_file(obs_path)?)
    } else {
        None
    };
    let session = args::resolve_session(&args, obs_data.as_ref())?;

    let baseline = baseline_vector(session.station1, session.station2);
    let ew = east_west(baseline);
    let ns = north_south(baseline);

    let ha_label = match session.ha_mode {
        HourAngleMode::FromSiderealTime => "computed from sidereal timestamps".to_string(),
        HourAngleMode::Fixed(fixed) => format!("fixed {:.6} deg", fixed.value()),
    };

    println!("Starting delay tracking with the following arguments:");
    println!("--------------------------------------------------");
    println!("  ant1:       {}", args.ant1.display());
    if let Some(ant2) = &args.ant2 {
        println!("  ant2:       {}", ant2.display());
    }
    println!("  source:     {}", session.source_label);
    println!(
        "  ra/dec:     {:.6} / {:.6} deg",
        session.target.ra.value(),
        session.target.dec.value()
    );
    println!(
        "  station1:   lat {:.4} deg, lon {:.4} deg",
        session.station1.latitude.value(),
        session.station1.longitude.value()
    );
    println!(
        "  station2:   lat {:.4} deg, lon {:.4} deg",
        session.station2.latitude.value(),
        session.station2.longitude.value()
    );
    println!("  hour-angle: {}", ha_label);
    println!(
        "  ha-wrap:    {}",
        if args.legacy_wrap { "single-pass (legacy)" } else { "modulo" }
    );
    println!(
        "  baseline:   ({:.3}, {:.3}, {:.3}) m, |b| = {:.3} m",
        baseline.e,
        baseline.n,
        baseline.u,
        baseline.norm()
    );
    println!("  ew-comp:    {:.3} m", ew.e);
    println!("  ns-comp:    {:.3} m", ns.n);
    println!("  cpu:        {}", args.cpu);
    if let Some(output) = &args.output {
        println!("  output:     {}", output.display());
    }
    if let Some(plot_path) = &args.plot {
        println!("  plot:       {}", plot_path.display());
    }
    println!("--------------------------------------------------");

    println!("[info] Reading packet headers from {}", args.ant1.display());
    let headers = mbr::read_headers(&args.ant1)?;
    if headers.is_empty() {
        return Err("No complete packets found in the ant1 capture".into());
    }
    println!("[info] Read {} packet headers", headers.len());
    if let Some(first) = headers.first() {
        println!(
            "[info] ant1 stream: DSP {} observing {}",
            first.dsp_id, first.source_name
        );
    }

    if let Some(ant2_path) = &args.ant2 {
        let headers2 = mbr::read_headers(ant2_path)?;
        println!(
            "[info] ant2 capture {} holds {} packets (timing taken from ant1)",
            ant2_path.display(),
            headers2.len()
        );
        if headers2.len() != headers.len() {
            println!(
                "[warn] Packet counts differ between captures ({} vs {})",
                headers.len(),
                headers2.len()
            );
        }
    }

    let epochs: Vec<coord::ObservationEpoch> = headers.iter().map(|h| h.epoch()).collect();

    println!("[info] Computing delays for {} epochs", epochs.len());
    let delays = delay_series(
        session.target,
        session.station1,
        &epochs,
        baseline,
        session.ha_mode,
        session.wrap,
    )?;

    let min = delays.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = delays.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    println!(
        "[info] Delay range: {:.6} .. {:.6} m ({:.6e} .. {:.6e} s)",
        min,
        max,
        delay_to_seconds(min),
        delay_to_seconds(max)
    );
    println!(
        "[info] First delay {:.6} m, last delay {:.6} m",
        delays[0],
        delays[delays.len() - 1]
    );

    if let Some(output) = &args.output {
        let mut writer = BufWriter::new(File::create(output)?);
        for d in &delays {
            writeln!(writer, "{d:.9e}")?;
        }
        writer.flush()?;
        println!("[info] Wrote {} delay values to {}", delays.len(), output.display());
    }

    if let Some(plot_path) = &args.plot {
        plot::plot_delay_series(&delays, plot_path)?;
        println!("[info] Wrote delay plot to {}", plot_path.display());
    }

    println!("[info] Delay tracking complete");
    Ok(())
}
