//! Selftest command - verify the payload encoding round trip
//!
//! Parses a few sample lines, encodes them the way the loader does and
//! decodes the payload again. No files or stores are touched.
//!
//! # Usage
//!
//! ```bash
//! memload selftest
//! memload selftest --quiet
//! ```

use anyhow::{Context, Result, ensure};
use clap::Args;

use memload_protocol::{decode_payload, encode, parse_line};

/// Lines checked by the selftest
const SAMPLE_LINES: [&str; 3] = [
    "idfa\t1rfw452y52g2gq4g\t55.55\t42.42\t1423,43,567,3,7,23",
    "gaid\t7rfw452y52g2gq4g\t55.55\t42.42\t7423,424",
    "dvid\t0c1f7b1d2e3a\t-33.86\t151.2\t",
];

#[derive(Args, Debug)]
pub struct SelftestArgs {
    /// Quiet mode - don't print details
    #[arg(short, long)]
    quiet: bool,
}

/// Run the selftest
///
/// Returns `Ok(true)` when every sample survives the round trip.
pub fn run(args: SelftestArgs) -> Result<bool> {
    for line in SAMPLE_LINES {
        check_line(line).with_context(|| format!("selftest failed for line {line:?}"))?;
        if !args.quiet {
            println!("ok   {}", line.replace('\t', " "));
        }
    }

    if !args.quiet {
        println!("\n{} lines passed", SAMPLE_LINES.len());
    }
    Ok(true)
}

fn check_line(line: &str) -> Result<()> {
    let record = parse_line(line)?;
    let item = encode(&record)?;
    let decoded = decode_payload(&item.payload)?;

    ensure!(
        item.key == format!("{}:{}", record.device_type, record.device_id),
        "unexpected key {}",
        item.key
    );
    ensure!(decoded.apps == record.apps, "apps differ: {:?}", decoded.apps);
    ensure!(decoded.lat == Some(record.lat), "lat differs: {:?}", decoded.lat);
    ensure!(decoded.lon == Some(record.lon), "lon differs: {:?}", decoded.lon);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_pass() {
        assert!(run(SelftestArgs { quiet: true }).unwrap());
    }

    #[test]
    fn test_check_line_rejects_bad_line() {
        assert!(check_line("idfa\tonly-two").is_err());
    }
}
