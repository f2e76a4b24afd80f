use crate::error::ReportError;
use core_types::{DecisionHistory, DualMomentumRecord, Gap, Instrument, LaaRecord};
use std::fs;
use std::path::PathBuf;

/// Writes the decision-history artifacts as CSV files.
///
/// Every artifact is first written to a `.tmp` sibling and renamed into place
/// only after the whole set succeeded, so a failed run never leaves a
/// partially written artifact behind.
pub struct CsvReportWriter {
    out_dir: PathBuf,
}

type Staged = (PathBuf, PathBuf);

impl CsvReportWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Writes the wide signal history, the narrow picks history, and the gap
    /// list for a Dual Momentum run. Returns the final artifact paths.
    pub fn write_dual_momentum(
        &self,
        candidates: &[Instrument],
        history: &DecisionHistory<DualMomentumRecord>,
    ) -> Result<Vec<PathBuf>, ReportError> {
        fs::create_dir_all(&self.out_dir)?;

        let mut staged = Vec::new();
        let result = self.stage_dual_momentum(candidates, history, &mut staged);
        self.commit(staged, result)
    }

    /// Writes the signal history, picks history, and gap list for an LAA run.
    pub fn write_laa(
        &self,
        history: &DecisionHistory<LaaRecord>,
    ) -> Result<Vec<PathBuf>, ReportError> {
        fs::create_dir_all(&self.out_dir)?;

        let mut staged = Vec::new();
        let result = self.stage_laa(history, &mut staged);
        self.commit(staged, result)
    }

    fn stage_dual_momentum(
        &self,
        candidates: &[Instrument],
        history: &DecisionHistory<DualMomentumRecord>,
        staged: &mut Vec<Staged>,
    ) -> Result<(), ReportError> {
        staged.push(self.stage("dm_signals.csv", |writer| {
            let mut header = vec!["date".to_string()];
            for candidate in candidates {
                header.push(format!("{} 12m", candidate.symbol));
            }
            header.extend(
                ["winner_symbol", "winner_name", "winner_return", "threshold_return", "pick_symbol", "pick_name"]
                    .map(str::to_string),
            );
            writer.write_record(&header)?;

            for record in &history.records {
                let mut row = vec![record.as_of.to_string()];
                for candidate in &record.candidates {
                    row.push(candidate.trailing_return.to_string());
                }
                row.push(record.winner.symbol.clone());
                row.push(record.winner.name.clone());
                row.push(record.winner_return.to_string());
                row.push(record.threshold_return.to_string());
                row.push(record.selection.symbol.clone());
                row.push(record.selection.name.clone());
                writer.write_record(&row)?;
            }
            Ok(())
        })?);

        staged.push(self.stage("dm_picks.csv", |writer| {
            writer.write_record(["date", "symbol", "name"])?;
            for record in &history.records {
                writer.write_record([
                    record.as_of.to_string(),
                    record.selection.symbol.clone(),
                    record.selection.name.clone(),
                ])?;
            }
            Ok(())
        })?);

        staged.push(self.stage_gaps("dm_gaps.csv", &history.gaps)?);
        Ok(())
    }

    fn stage_laa(
        &self,
        history: &DecisionHistory<LaaRecord>,
        staged: &mut Vec<Staged>,
    ) -> Result<(), ReportError> {
        staged.push(self.stage("laa_signals.csv", |writer| {
            writer.write_record([
                "date",
                "price",
                "price_sma",
                "macro_value",
                "macro_sma",
                "risk_off",
                "pick_symbol",
                "pick_name",
            ])?;
            for record in &history.records {
                writer.write_record([
                    record.as_of.to_string(),
                    record.price.to_string(),
                    record.sma.to_string(),
                    record.macro_current.to_string(),
                    record.macro_sma.to_string(),
                    record.risk_off.to_string(),
                    record.selection.symbol.clone(),
                    record.selection.name.clone(),
                ])?;
            }
            Ok(())
        })?);

        staged.push(self.stage("laa_picks.csv", |writer| {
            writer.write_record(["date", "symbol", "name"])?;
            for record in &history.records {
                writer.write_record([
                    record.as_of.to_string(),
                    record.selection.symbol.clone(),
                    record.selection.name.clone(),
                ])?;
            }
            Ok(())
        })?);

        staged.push(self.stage_gaps("laa_gaps.csv", &history.gaps)?);
        Ok(())
    }

    fn stage_gaps(&self, file_name: &str, gaps: &[Gap]) -> Result<Staged, ReportError> {
        self.stage(file_name, |writer| {
            writer.write_record(["date", "series", "reason"])?;
            for gap in gaps {
                writer.write_record([
                    gap.as_of.to_string(),
                    gap.series.clone(),
                    gap.reason.to_string(),
                ])?;
            }
            Ok(())
        })
    }

    /// Writes one artifact to its temp path and returns (temp, final).
    fn stage<F>(&self, file_name: &str, fill: F) -> Result<Staged, ReportError>
    where
        F: FnOnce(&mut csv::Writer<fs::File>) -> Result<(), ReportError>,
    {
        let final_path = self.out_dir.join(file_name);
        let tmp_path = self.out_dir.join(format!("{file_name}.tmp"));

        let mut writer = csv::Writer::from_path(&tmp_path)?;
        if let Err(e) = fill(&mut writer).and_then(|_| writer.flush().map_err(Into::into)) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        Ok((tmp_path, final_path))
    }

    /// Renames every staged artifact into place, or removes them all if any
    /// stage failed.
    fn commit(
        &self,
        staged: Vec<Staged>,
        result: Result<(), ReportError>,
    ) -> Result<Vec<PathBuf>, ReportError> {
        if let Err(e) = result {
            for (tmp, _) in &staged {
                let _ = fs::remove_file(tmp);
            }
            return Err(e);
        }

        let mut written = Vec::with_capacity(staged.len());
        for (tmp, final_path) in staged {
            fs::rename(&tmp, &final_path)?;
            tracing::info!(path = %final_path.display(), "wrote report artifact");
            written.push(final_path);
        }
        Ok(written)
    }
}
