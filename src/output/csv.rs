use std::fs::File;
use std::path::Path;

use crate::labels;
use crate::output::{OutputError, PlayerSink, RunContext};
use crate::record::{PLAYER_FIELDS, ParsedPlayer};

/// One row per player: provenance, every field of the record table in table
/// order, then label columns for the coded fields.
pub struct CsvSink {
    run_id: String,
    writer: csv::Writer<File>,
}

impl CsvSink {
    pub fn new(context: &RunContext, run_output_dir: &Path) -> Result<Self, OutputError> {
        let file = File::create(run_output_dir.join("players.csv"))?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

        let mut header = vec!["run_id", "offset", "chunk", "strategy"];
        header.extend(PLAYER_FIELDS.iter().map(|spec| spec.name));
        header.extend(["position_label", "foot_label", "height_cm", "weight_kg"]);
        writer.write_record(&header)?;

        Ok(Self {
            run_id: context.run_id.clone(),
            writer,
        })
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl PlayerSink for CsvSink {
    fn record_player(&mut self, player: &ParsedPlayer) -> Result<(), OutputError> {
        let mut row = vec![
            self.run_id.clone(),
            player.offset.to_string(),
            opt(player.chunk),
            player.strategy.as_str().to_string(),
        ];
        row.extend(PLAYER_FIELDS.iter().map(|spec| opt(player.get(spec.name))));
        let position = player.get("preferredposition1");
        row.push(opt(position.and_then(labels::position_label)));
        row.push(opt(player.get("preferredfoot").and_then(labels::foot_label)));
        row.push(opt(player.get("height").and_then(labels::height_cm)));
        row.push(opt(player.get("weight").and_then(labels::weight_kg)));
        self.writer.write_record(&row)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        self.writer.flush()?;
        Ok(())
    }
}
