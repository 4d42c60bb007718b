use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use squadcarve::{SquadParser, cli, config, evidence, logging, output, progress, util};

fn main() -> Result<()> {
    logging::init_logging();

    let cli_opts = cli::parse();
    let loaded = config::load_config(cli_opts.config_path.as_deref())?;
    let mut cfg = loaded.config;
    util::apply_cli_overrides(&mut cfg.scan, &cli_opts)?;

    if cli_opts.input_sha256.is_some() && cli_opts.compute_input_sha256 {
        bail!("set either --input-sha256 or --compute-input-sha256, not both");
    }

    let run_output_dir = cli_opts.output.join(&cfg.run_id);
    util::ensure_output_dir(&run_output_dir)?;

    info!(
        "starting run_id={} input={} output={}",
        cfg.run_id,
        cli_opts.input.display(),
        run_output_dir.display()
    );

    let data = evidence::load_input(&cli_opts.input)
        .with_context(|| format!("loading {}", cli_opts.input.display()))?;

    let input_sha256 = if let Some(hash) = cli_opts.input_sha256.as_ref() {
        hash.trim().to_string()
    } else if cli_opts.compute_input_sha256 {
        let hash = evidence::sha256_hex(&data);
        info!("input sha256={hash}");
        hash
    } else {
        String::new()
    };

    let parser = SquadParser::new(cfg.scan.clone());
    let result = if cli_opts.progress {
        let (reporter, rx) = progress::channel_reporter(64);
        let printer = progress::spawn_log_printer(rx);
        let result = parser.parse(&data, Some(&reporter));
        drop(reporter);
        progress::join_printer(printer);
        result
    } else {
        parser.parse(&data, None)
    };

    let context = output::RunContext {
        run_id: cfg.run_id.clone(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        config_hash: loaded.config_hash,
        input_path: cli_opts.input.to_string_lossy().to_string(),
        input_sha256,
    };

    let backend = util::backend_from_cli(cli_opts.format);
    let mut sink = output::build_sink(backend, &context, &run_output_dir)?;
    let written = output::write_players(sink.as_mut(), &result)?;
    let summary_path =
        output::write_summary(&run_output_dir, &output::RunSummary::new(&context, &result))?;

    if result.success {
        info!(
            "squadcarve run finished: {written} players, summary at {}",
            summary_path.display()
        );
    } else {
        warn!(
            "squadcarve run finished without players: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}
