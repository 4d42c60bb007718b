use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::output::{OutputError, PlayerSink, RunContext};
use crate::record::ParsedPlayer;

pub struct JsonlSink {
    run_id: String,
    input_sha256: String,
    writer: BufWriter<File>,
}

#[derive(Serialize)]
struct PlayerRecord<'a> {
    run_id: &'a str,
    input_sha256: &'a str,
    #[serde(flatten)]
    player: &'a ParsedPlayer,
}

impl JsonlSink {
    pub fn new(context: &RunContext, run_output_dir: &Path) -> Result<Self, OutputError> {
        let file = File::create(run_output_dir.join("players.jsonl"))?;
        Ok(Self {
            run_id: context.run_id.clone(),
            input_sha256: context.input_sha256.clone(),
            writer: BufWriter::new(file),
        })
    }
}

impl PlayerSink for JsonlSink {
    fn record_player(&mut self, player: &ParsedPlayer) -> Result<(), OutputError> {
        let record = PlayerRecord {
            run_id: &self.run_id,
            input_sha256: &self.input_sha256,
            player,
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        self.writer.flush()?;
        Ok(())
    }
}
