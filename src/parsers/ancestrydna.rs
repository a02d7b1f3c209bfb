// ==============================================================================
// ancestrydna.rs - AncestryDNA Raw Data Parser
// ==============================================================================
// Description: Parser for AncestryDNA raw data exports
// Author: Matt Barham
// Created: 2026-02-03
// Modified: 2026-02-03
// Version: 1.0.0
// ==============================================================================
// Format: Tab-delimited text, five columns with the two alleles separate
// Example:
//   #AncestryDNA raw data download
//   rsid    chromosome    position    allele1    allele2
//   rs3131972    1    752721    G    G
// ==============================================================================

use tracing::debug;

use super::{normalize_chromosome, ParseError, RawRecord};

/// Parser for AncestryDNA raw data files
#[derive(Debug, Clone, Default)]
pub struct AncestryDnaParser;

impl AncestryDnaParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse pre-read lines into records; malformed lines are skipped
    pub fn parse_lines(&self, lines: &[String]) -> Result<Vec<RawRecord>, ParseError> {
        let mut records = Vec::new();
        let mut skipped = 0usize;

        for line in lines {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match self.parse_line(line) {
                Some(record) => records.push(record),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!("Skipped {} malformed lines in AncestryDNA export", skipped);
        }

        Ok(records)
    }

    /// Parse a single line: rsid, chromosome, position, allele1, allele2.
    /// The two allele columns are joined into the uniform genotype string.
    fn parse_line(&self, line: &str) -> Option<RawRecord> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 5 {
            return None;
        }

        let rsid = fields[0].trim();
        if rsid.eq_ignore_ascii_case("rsid") {
            return None; // column header row
        }
        if !(rsid.starts_with("rs") || rsid.starts_with('i')) {
            return None;
        }

        let position = fields[2].trim().parse::<u64>().ok()?;
        let genotype = format!("{}{}", fields[3].trim(), fields[4].trim());

        Some(RawRecord {
            rsid: rsid.to_string(),
            chromosome: normalize_chromosome(fields[1]),
            position,
            genotype,
        })
    }
}
