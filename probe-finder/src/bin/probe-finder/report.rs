use std::io::Write;

use anyhow::Result;
use probe_finder::Registry;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One tab separated line per probe
    Table,
    /// A JSON array of probes
    Json,
}

pub fn write(out: &mut impl Write, registry: &Registry, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => write_table(out, registry),
        OutputFormat::Json => write_json(out, registry),
    }
}

fn write_table(out: &mut impl Write, registry: &Registry) -> Result<()> {
    if registry.is_empty() {
        writeln!(out, "No debug probes were found.")?;
        return Ok(());
    }

    for entry in registry.entries() {
        writeln!(
            out,
            "{}\t{:04X}:{:04X}\t{:<20}\tS/N: {}",
            entry.ordinal, entry.vendor_id, entry.product_id, entry.label, entry.serial
        )?;
    }
    Ok(())
}

fn write_json(out: &mut impl Write, registry: &Registry) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, &registry.entries())?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use probe_finder::{ProbeRecord, ProbeType, UNKNOWN_SERIAL};

    fn render(registry: &Registry, format: OutputFormat) -> String {
        let mut out = Vec::new();
        write(&mut out, registry, format).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .append(ProbeRecord::new(
                ProbeType::BlackMagic,
                "Black Magic Probe",
                "7BB180B4",
                0x1d50,
                0x6018,
            ))
            .unwrap();
        registry
            .append(ProbeRecord::new(
                ProbeType::StLink,
                "STLink V2",
                UNKNOWN_SERIAL,
                0x0483,
                0x3748,
            ))
            .unwrap();
        registry
    }

    #[test]
    fn table_output() {
        assert_eq!(
            render(&registry(), OutputFormat::Table),
            "1\t1D50:6018\tBlack Magic Probe   \tS/N: 7BB180B4\n\
             2\t0483:3748\tSTLink V2           \tS/N: Unknown\n"
        );
    }

    #[test]
    fn empty_table() {
        assert_eq!(
            render(&Registry::new(), OutputFormat::Table),
            "No debug probes were found.\n"
        );
    }

    #[test]
    fn json_output() {
        let json: serde_json::Value =
            serde_json::from_str(&render(&registry(), OutputFormat::Json)).unwrap();

        assert_eq!(json[1]["ordinal"], 2);
        assert_eq!(json[1]["label"], "STLink V2");
        assert_eq!(json[1]["serial"], "Unknown");
        assert_eq!(json[0]["probe_type"], "black-magic");
    }
}
