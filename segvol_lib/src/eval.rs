//! # Evaluation
//!
//! Frame time statistics and the results table shared by all runs.

use std::{
    fs::{self, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::Path,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use log::info;
use thiserror::Error;

/// Number of individual frame times kept in a result
pub const RECORDED_FRAMES: usize = 16;

pub const CSV_HEADER: &str =
    "Data Set,frame min [ms],frame avg [ms],frame max [ms],stdv,frame med [ms]";

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("No frame times to evaluate")]
    NoFrames,

    #[error("Invalid frame time {value:?} on line {line}")]
    InvalidFrameTime { line: usize, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Anything that can draw one frame and report how long it took.
pub trait FrameRenderer {
    fn render_frame(&mut self) -> Duration;
}

/// Frame time statistics, all in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalResult {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    /// Population variance
    pub var: f64,
    pub med: f64,
    /// First frames, zero when fewer were rendered
    pub frame: [f64; RECORDED_FRAMES],
}

impl EvalResult {
    pub fn stdv(&self) -> f64 {
        self.var.max(0.0).sqrt()
    }
}

/// Statistics of frame times in milliseconds.
pub fn summarize(times: &[f64]) -> Result<EvalResult, EvalError> {
    if times.is_empty() {
        return Err(EvalError::NoFrames);
    }

    let n = times.len() as f64;
    let min = times.iter().copied().fold(f64::INFINITY, f64::min);
    let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let avg = times.iter().sum::<f64>() / n;
    let var = times.iter().map(|t| t * t).sum::<f64>() / n - avg * avg;

    let mut sorted = times.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    let med = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    let mut frame = [0.0; RECORDED_FRAMES];
    for (f, t) in frame.iter_mut().zip(times) {
        *f = *t;
    }

    Ok(EvalResult {
        min,
        max,
        avg,
        var,
        med,
        frame,
    })
}

/// Renders one warm-up frame, then `frames` measured ones.
pub fn measure_frames<R>(renderer: &mut R, frames: usize) -> Result<EvalResult, EvalError>
where
    R: FrameRenderer + ?Sized,
{
    // first frame uploads data, not measured
    renderer.render_frame();

    let times: Vec<f64> = (0..frames)
        .map(|_| renderer.render_frame().as_secs_f64() * 1000.0)
        .collect();

    summarize(&times)
}

/// Frame times in milliseconds, one per line. Blank lines are skipped.
pub fn read_frame_times<R: BufRead>(input: R) -> Result<Vec<f64>, EvalError> {
    let mut times = vec![];
    for (i, line) in input.lines().enumerate() {
        let line = line?;
        let value = line.trim();
        if value.is_empty() {
            continue;
        }
        let time = value
            .parse::<f64>()
            .map_err(|_| EvalError::InvalidFrameTime {
                line: i + 1,
                value: value.to_owned(),
            })?;
        times.push(time);
    }
    Ok(times)
}

pub fn read_frame_times_file<P: AsRef<Path>>(path: P) -> Result<Vec<f64>, EvalError> {
    let file = fs::File::open(path)?;
    read_frame_times(BufReader::new(file))
}

pub fn log_result(result: &EvalResult) {
    let frames: Vec<String> = result.frame.iter().map(|f| f.to_string()).collect();
    info!("Render time [ms/frame]:");
    info!("  frames: {}", frames.join(", "));
    info!("  min: {}", result.min);
    info!("  avg: {}", result.avg);
    info!("  sdv: {}", result.stdv());
    info!("  max: {}", result.max);
}

/// One CSV line for a data set, without line end.
pub fn result_line(name: &str, result: &EvalResult, time: u64) -> String {
    let mut line = format!(
        "{},{},{},{},{},{}",
        name,
        result.min,
        result.avg,
        result.max,
        result.stdv(),
        result.med
    );
    for f in &result.frame {
        line.push_str(&format!(",{f}"));
    }
    line.push_str(&format!(",{time}"));
    line
}

pub fn csv_header() -> String {
    let mut header = CSV_HEADER.to_owned();
    for i in 0..RECORDED_FRAMES {
        header.push_str(&format!(",frame{i}"));
    }
    header.push_str(",time");
    header
}

/// Append a result to the CSV file at `path`, writing the header if the file is new.
pub fn export_results<P: AsRef<Path>>(
    name: &str,
    result: &EvalResult,
    path: P,
) -> Result<(), EvalError> {
    let path = path.as_ref();
    let new_file = !path.exists();
    if new_file {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if new_file {
        writeln!(file, "{}", csv_header())?;
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    writeln!(file, "{}", result_line(name, result, now))?;

    info!("Results of {name} appended to {}", path.display());
    Ok(())
}
