use std::path::{Path, PathBuf};

use anyhow::Error;

use clap::Parser;

use plotters::prelude::*;

use nrl_core::{bed, estimate, input::Reader, Config, Estimate, Input};

const FILTERED_COLOR: RGBColor = RGBColor(0xd6, 0x27, 0x28);
const MAXES_COLOR: RGBColor = RGBColor(0x1f, 0x77, 0xb4);
const MINS_COLOR: RGBColor = RGBColor(0x8f, 0x2e, 0xff);
const AUC_COLOR: RGBColor = RGBColor(0xa8, 0xa8, 0xa8);

/// Plot fragment length counts and estimated repeat lengths.
#[derive(Debug, Parser)]
pub struct Plot {
    /// Input BED file.
    ///
    /// If no file is provided, stdin will be used. The input may be gzipped. The fragment length
    /// of a record is the difference between its start and end coordinates.
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output SVG file.
    #[arg(short = 'o', long, value_name = "FILE")]
    output: PathBuf,

    /// Smallest fragment length to filter.
    ///
    /// Shorter fragments still count towards the histogram and the area under the curve, but the
    /// filter and the extrema search only consider lengths from this value onwards.
    #[arg(long, default_value_t = 75, value_name = "INT")]
    offset: usize,

    /// Cutoff frequency of the low-pass filter.
    ///
    /// The cutoff is relative to a sampling frequency of 1000 per fragment length unit, and must
    /// lie strictly between 0 and 500.
    #[arg(long, default_value_t = 40.0, value_name = "FLOAT")]
    freq_cutoff: f64,

    /// Number of fragments required to report an extremum.
    ///
    /// Extrema at fragment lengths observed this many times or fewer are dropped from the output.
    #[arg(long, default_value_t = 10, value_name = "INT")]
    count_thr: u64,
}

impl Plot {
    pub fn run(self) -> Result<(), Error> {
        let lengths = match Input::new(self.input)?.open()? {
            Reader::File(reader) => bed::read_lengths(reader)?,
            Reader::Stdin(reader) => bed::read_lengths(reader)?,
        };

        let config = Config {
            offset: self.offset,
            freq_cutoff: self.freq_cutoff,
            count_thr: self.count_thr,
        };
        let estimate = estimate(&lengths, &config)?;

        draw(&estimate, &self.output)?;
        log::info!("Wrote plot to '{}'.", self.output.display());

        Ok(())
    }
}

fn draw(estimate: &Estimate, path: &Path) -> Result<(), Error> {
    let counts = estimate.histogram().counts();
    let filtered = estimate.filtered();
    let offset = filtered.offset();

    let last = filtered
        .values()
        .iter()
        .rposition(|&v| v > 1.0)
        .map_or(counts.len() - 1, |i| offset + i);
    let x_max = f64::max((last as f64 * 1.1).round(), 10.0);
    let max_count = counts.iter().copied().max().unwrap_or(1) as f64;
    let y_max = f64::max(max_count.powf(1.1), 10.0);

    let root = SVGBackend::new(path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..x_max, (1.0..y_max).log_scale())?;

    chart
        .configure_mesh()
        .x_desc("Fragment length")
        .y_desc("Counts")
        .draw()?;

    // Counts below one cannot be drawn on the logarithmic axis.
    if let Some(&first) = estimate.mins().first() {
        let mut band = counts[first..]
            .iter()
            .enumerate()
            .map(|(i, &c)| ((first + i) as f64, f64::max(c as f64, 1.0)))
            .collect::<Vec<_>>();
        band.push((counts.len() as f64 - 1.0, 1.0));
        band.push((first as f64, 1.0));

        chart
            .draw_series(std::iter::once(Polygon::new(band, AUC_COLOR.filled())))?
            .label("Area under the curve")
            .legend(|(x, y)| Rectangle::new([(x, y - 4), (x + 16, y + 4)], AUC_COLOR.filled()));
    }

    chart
        .draw_series(LineSeries::new(
            counts
                .iter()
                .enumerate()
                .filter(|(_, &c)| c > 0)
                .map(|(i, &c)| (i as f64, c as f64)),
            BLACK,
        ))?
        .label("Raw counts")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], BLACK));

    chart
        .draw_series(LineSeries::new(
            filtered
                .values()
                .iter()
                .enumerate()
                .filter(|(_, &v)| v > 0.0)
                .map(|(i, &v)| ((offset + i) as f64, v)),
            FILTERED_COLOR,
        ))?
        .label("Filtered counts")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], FILTERED_COLOR));

    chart
        .draw_series(estimate.maxes().iter().map(|&i| {
            let value = filtered.values()[i - offset];
            Circle::new((i as f64, f64::max(value, 1.0)), 4, MAXES_COLOR.filled())
        }))?
        .label("Maxes (NRLs)")
        .legend(|(x, y)| Circle::new((x + 8, y), 4, MAXES_COLOR.filled()));

    chart
        .draw_series(estimate.mins().iter().map(|&i| {
            let value = filtered.values()[i - offset];
            Circle::new((i as f64, f64::max(value, 1.0)), 4, MINS_COLOR.filled())
        }))?
        .label("Mins")
        .legend(|(x, y)| Circle::new((x + 8, y), 4, MINS_COLOR.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;

    Ok(())
}
