use std::path::Path;

use plotters::prelude::*;

use crate::error::DynError;

/// Render the delay series (metres vs packet index) to a PNG file.
pub fn plot_delay_series(delays: &[f64], filename: &Path) -> Result<(), DynError> {
    if delays.is_empty() {
        return Err("No delay values to plot".into());
    }

    let path_text = filename
        .to_str()
        .ok_or("Plot path is not valid UTF-8")?;
    let root = BitMapBackend::new(path_text, (1280, 720)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_max = (delays.len() - 1).max(1) as f64;
    let y_min = delays.iter().cloned().fold(f64::INFINITY, f64::min);
    let y_max = delays.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    // A constant series (fixed hour-angle mode) still needs a non-empty range.
    let pad = ((y_max - y_min).abs() * 0.05).max(1.0);

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(48)
        .y_label_area_size(72)
        .build_cartesian_2d(0.0..x_max, (y_min - pad)..(y_max + pad))?;

    chart
        .configure_mesh()
        .x_desc("packet index")
        .y_desc("geometric delay [m]")
        .label_style(("sans-serif", 20).into_font())
        .axis_desc_style(("sans-serif", 24).into_font())
        .light_line_style(WHITE.mix(0.0))
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            delays.iter().enumerate().map(|(i, &d)| (i as f64, d)),
            &BLUE,
        ))
        .map(|s| {
            s.label("delay")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], BLUE))
        })?;

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .label_font(("sans-serif", 20).into_font())
        .draw()?;

    root.present()?;
    Ok(())
}
