//! Append-only per-generation CSV log.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::compute::Network;

const HEADER: &str = "Generation,Genome,Fitness";

/// CSV log with one `Generation,Genome,Fitness` row per genome per generation.
#[derive(Debug, Clone)]
pub struct StatsLog {
    path: PathBuf,
}

impl StatsLog {
    /// Start a new log named `Stats_<unix-millis>.csv` inside `dir`.
    pub fn create<P: AsRef<Path>>(dir: P) -> io::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        Self::open(dir.join(format!("Stats_{millis}.csv")))
    }

    /// Append to `path`, writing the header only if the file is new.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            let mut file = File::create(&path)?;
            writeln!(file, "{HEADER}")?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row per genome, in population order.
    pub fn append(&mut self, generation: usize, population: &[Network]) -> io::Result<()> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = BufWriter::new(file);
        for (genome, network) in population.iter().enumerate() {
            writeln!(writer, "{},{},{}", generation, genome, network.fitness)?;
        }
        writer.flush()
    }
}
