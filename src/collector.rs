//! Terminal form collecting the seven measurements
//!
//! Mirrors the bounded sliders of a form: every prompt shows the range and the
//! starting value, an empty answer keeps the starting value and anything
//! outside the range is clamped to the nearest bound.

use crate::error::Result;
use crate::types::features::{Feature, FeatureVector};
use std::io::{BufRead, Write};
use tracing::{debug, warn};

pub struct InputCollector<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> InputCollector<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Ask for every measurement. `None` when input ends before the form is complete.
    pub fn collect(&mut self) -> Result<Option<FeatureVector>> {
        let mut features = FeatureVector::default();

        writeln!(self.writer, "Enter soil and weather parameters (press Enter to keep the default)")?;
        for feature in Feature::FORM_ORDER {
            match self.ask(feature)? {
                Some(value) => features.set(feature, value),
                None => return Ok(None),
            }
        }

        debug!(features = ?features, "Form submitted");
        Ok(Some(features))
    }

    /// Yes/no question; anything but an answer starting with `y` means no.
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        write!(self.writer, "{} [y/N]: ", question)?;
        self.writer.flush()?;
        Ok(self
            .read_answer()?
            .map(|answer| answer.to_ascii_lowercase().starts_with('y'))
            .unwrap_or(false))
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.writer
    }

    fn ask(&mut self, feature: Feature) -> Result<Option<f64>> {
        let (min, max) = feature.bounds();
        let unit = match feature.unit() {
            "" => String::new(),
            unit => format!(" {}", unit),
        };

        loop {
            write!(
                self.writer,
                "{}{} [{}-{}] ({}): ",
                feature.label(),
                unit,
                min,
                max,
                feature.default_value()
            )?;
            self.writer.flush()?;

            let answer = match self.read_answer()? {
                Some(answer) => answer,
                None => return Ok(None),
            };
            if answer.is_empty() {
                return Ok(Some(feature.default_value()));
            }

            let value = match answer.parse::<f64>() {
                Ok(value) if value.is_finite() => value,
                _ => {
                    writeln!(self.writer, "  `{}` is not a number, try again", answer)?;
                    continue;
                }
            };

            let clamped = feature.clamp(value);
            if clamped != value {
                warn!(feature = %feature, value = value, clamped = clamped, "Input clamped to range");
                writeln!(self.writer, "  {} is out of range, using {}", value, clamped)?;
            }
            return Ok(Some(clamped));
        }
    }

    /// Trimmed line, or `None` at end of input.
    fn read_answer(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
