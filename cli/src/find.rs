use std::{fmt, io, path::PathBuf};

use anyhow::Error;

use clap::{Parser, ValueEnum};

use nrl_core::{bed, estimate, input::Reader, Config, Input};

mod runner;
use runner::Runner;

/// Estimate nucleosome repeat lengths from BED records.
#[derive(Debug, Parser)]
pub struct Find {
    /// Input BED file.
    ///
    /// If no file is provided, stdin will be used. The input may be gzipped. The fragment length
    /// of a record is the difference between its start and end coordinates.
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Statistic to print.
    #[arg(short = 's', long, value_enum, default_value_t = Statistic::Maxes, value_name = "STAT")]
    statistic: Statistic,

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

    /// Delimiter between reported fragment lengths.
    #[arg(short = 'd', long, default_value_t = ',', value_name = "CHAR")]
    delimiter: char,

    /// Precision to use when printing the area under the curve.
    #[arg(short = 'p', long, default_value_t = 0, value_name = "INT")]
    precision: usize,
}

#[derive(ValueEnum, Clone, Copy, Debug, Eq, PartialEq)]
pub enum Statistic {
    /// Fragment lengths at the maxima of the filtered histogram, i.e. the repeat length estimates.
    Maxes,
    /// Fragment lengths at the minima of the filtered histogram.
    Mins,
    /// Number of fragments at least as long as the first minimum.
    Auc,
}

impl Statistic {
    pub fn name(&self) -> &'static str {
        match self {
            Statistic::Maxes => "maxes",
            Statistic::Mins => "mins",
            Statistic::Auc => "auc",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Find {
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

        let mut runner = Runner::new(io::stdout().lock(), self.delimiter, self.precision);
        runner.run(self.statistic, &estimate)
    }
}
