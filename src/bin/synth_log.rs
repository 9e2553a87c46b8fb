use std::io::Write;

use anyhow::Context;
use telemetry_timeline::synthetic_log::generate_log;

fn main() -> anyhow::Result<()> {
    let mut seconds: u32 = 600;
    let mut seed: u64 = 7;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seconds" => {
                let raw = args.next().context("--seconds needs a value")?;
                seconds = raw.parse().context("invalid --seconds")?;
            }
            "--seed" => {
                let raw = args.next().context("--seed needs a value")?;
                seed = raw.parse().context("invalid --seed")?;
            }
            other => anyhow::bail!("unknown argument '{other}'"),
        }
    }

    let log = generate_log(seconds, seed);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    out.write_all(log.as_bytes()).context("write log")?;
    Ok(())
}
