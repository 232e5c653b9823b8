//! Score artifact files.
//!
//! Score files hold one `score<TAB>name` line per attribute in the order of
//! the set; best-k files hold one `name<TAB>k` line per attribute in name order.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::ReliefSeqConfig;
use crate::error::SelectionError;
use crate::scores::{BestKTable, ScoreSet};

/// Where a run writes its score files: `<dir>/<prefix>.<suffix>`.
#[derive(Debug, Clone)]
pub struct ScoreArtifacts {
    dir: PathBuf,
    prefix: String,
}

impl ScoreArtifacts {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn from_config(config: &ReliefSeqConfig) -> Self {
        Self::new(config.out_dir.clone(), config.out_files_prefix.clone())
    }

    fn path_with(&self, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", self.prefix, suffix))
    }

    /// Raw scores of one elimination iteration.
    pub fn iteration_scores_path(&self, iteration: usize) -> PathBuf {
        self.path_with(&format!("{}.scores.dat", iteration))
    }

    pub fn final_scores_path(&self) -> PathBuf {
        self.path_with("reliefseq")
    }

    pub fn k_scores_path(&self, k: usize) -> PathBuf {
        self.path_with(&format!("{}.reliefseq", k))
    }

    pub fn best_k_path(&self) -> PathBuf {
        self.path_with("bestk")
    }

    pub fn write_iteration_scores(&self, iteration: usize, scores: &ScoreSet) -> Result<PathBuf> {
        let path = self.iteration_scores_path(iteration);
        log::info!("Writing ALL reliefseq scores to [{}]", path.display());
        write_scores(&path, scores)?;
        Ok(path)
    }

    pub fn write_final_scores(&self, scores: &ScoreSet) -> Result<PathBuf> {
        let path = self.final_scores_path();
        log::info!("Writing reliefseq scores to [{}]", path.display());
        write_scores(&path, scores)?;
        Ok(path)
    }

    pub fn write_k_scores(&self, k: usize, scores: &ScoreSet) -> Result<PathBuf> {
        let path = self.k_scores_path(k);
        log::info!("Writing reliefseq scores for k={} to [{}]", k, path.display());
        write_scores(&path, scores)?;
        Ok(path)
    }

    pub fn write_best_k(&self, best_k: &BestKTable) -> Result<PathBuf> {
        let path = self.best_k_path();
        log::info!("Writing reliefseq best k's to [{}]", path.display());
        write_best_k(&path, best_k)?;
        Ok(path)
    }
}

/// Write `score<TAB>name` lines in the set's current order.
pub fn write_scores(path: &Path, scores: &ScoreSet) -> Result<()> {
    write_lines(path, |out| {
        for s in scores {
            writeln!(out, "{}\t{}", s.score, s.name)?;
        }
        Ok(())
    })
}

/// Write `name<TAB>k` lines in name order.
pub fn write_best_k(path: &Path, best_k: &BestKTable) -> Result<()> {
    write_lines(path, |out| {
        for (name, k) in best_k {
            writeln!(out, "{}\t{}", name, k)?;
        }
        Ok(())
    })
}

fn write_lines<F>(path: &Path, body: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let io_err = |source| SelectionError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    body(&mut out).map_err(io_err)?;
    out.flush().map_err(io_err)?;
    Ok(())
}
