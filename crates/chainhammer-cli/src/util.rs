use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use chainhammer_estimator::{Trajectory, TrajectoryOptions};

use crate::schema::TrajectoryFile;

/// Destination of a JSON report.
#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    /// Writes `value` as pretty JSON to `output_path`, or stdout if `None`.
    pub fn save_json<T>(value: &T, output_path: Option<&Path>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = match output_path {
            Some(path) => Output::create(path)?,
            None => Output::Stdout {
                writer: io::stdout().lock(),
            },
        };
        output.write_json(value)?;
        tracing::info!(destination = %output.display_path(), "report written");
        Ok(())
    }

    fn create(path: &Path) -> anyhow::Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path: path.to_owned(),
        })
    }

    fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Read and validate a trajectory from a JSON file
///
/// Values in `overrides` replace the ones stored in the file.
///
/// # Errors
///
/// Returns error if the file cannot be opened or parsed, or if the
/// trajectory is malformed (empty, label out of range, bad time step)
pub fn read_trajectory_file<P>(path: P, overrides: &TrajectoryOptions) -> anyhow::Result<Trajectory>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file: TrajectoryFile = read_json_file("trajectory", path)?;
    let trajectory = file
        .into_trajectory(overrides)
        .with_context(|| format!("Malformed trajectory in {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        samples = trajectory.len(),
        num_states = trajectory.num_states(),
        dt = trajectory.dt(),
        "loaded trajectory"
    );
    Ok(trajectory)
}
