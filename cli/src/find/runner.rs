use std::{fmt, io};

use anyhow::Error;

use nrl_core::Estimate;

use super::Statistic;

#[derive(Debug)]
pub struct Runner<W> {
    writer: W,
    delimiter: char,
    precision: usize,
}

impl<W> Runner<W>
where
    W: io::Write,
{
    pub fn new(writer: W, delimiter: char, precision: usize) -> Self {
        Self {
            writer,
            delimiter,
            precision,
        }
    }

    pub fn run(&mut self, statistic: Statistic, estimate: &Estimate) -> Result<(), Error> {
        match statistic {
            Statistic::Maxes => self.write_lengths(estimate.maxes()),
            Statistic::Mins => self.write_lengths(estimate.mins()),
            Statistic::Auc => self.write_auc(estimate.auc()),
        }
    }

    fn write_auc(&mut self, auc: f64) -> Result<(), Error> {
        writeln!(self.writer, "{auc:.precision$}", precision = self.precision)?;

        Ok(())
    }

    fn write_lengths(&mut self, lengths: &[usize]) -> Result<(), Error> {
        self.write_with_delimiter(lengths)
    }

    fn write_with_delimiter<I>(&mut self, items: I) -> Result<(), Error>
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        for (i, x) in items.into_iter().enumerate() {
            if i > 0 {
                write!(self.writer, "{}", self.delimiter)?;
            }
            write!(self.writer, "{x}")?;
        }
        writeln!(self.writer)?;

        Ok(())
    }
}
