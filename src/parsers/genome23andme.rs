// ==============================================================================
// genome23andme.rs - 23andMe Raw Data Parser
// ==============================================================================
// Description: Parser for 23andMe raw genome data files (also the generic
//              tab-format fallback)
// Author: Matt Barham
// Created: 2026-02-03
// Modified: 2026-02-03
// Version: 1.0.0
// ==============================================================================
// Format: Tab-delimited text with header comments
// Example:
//   # rsid    chromosome    position    genotype
//   rs548049170    1    69869    TT
//   rs13328684    1    74792    --
// ==============================================================================

use tracing::debug;

use super::{normalize_chromosome, ParseError, RawRecord};

/// Parser for 23andMe raw genome files
#[derive(Debug, Clone, Default)]
pub struct Genome23Parser {
    /// Chromosomes to include. Empty means all chromosomes.
    pub include_chromosomes: Vec<String>,
}

impl Genome23Parser {
    /// Create a parser that includes all chromosomes
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser that only includes autosomal chromosomes (1-22)
    pub fn autosomal_only() -> Self {
        Self {
            include_chromosomes: (1..=22).map(|n| n.to_string()).collect(),
        }
    }

    /// Parse pre-read lines into records.
    ///
    /// Consumer files are messy: malformed lines are skipped rather than
    /// failing the whole export. Comment lines and the column-header line
    /// are ignored.
    pub fn parse_lines(&self, lines: &[String]) -> Result<Vec<RawRecord>, ParseError> {
        let mut records = Vec::new();
        let mut skipped = 0usize;

        for line in lines {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('/') {
                continue;
            }

            match self.parse_line(line) {
                Some(record) => {
                    if !self.include_chromosomes.is_empty()
                        && !self.include_chromosomes.contains(&record.chromosome)
                    {
                        continue;
                    }
                    records.push(record);
                }
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!("Skipped {} malformed lines in 23andMe export", skipped);
        }

        Ok(records)
    }

    /// Parse a single tab-delimited line: rsid, chromosome, position, genotype
    fn parse_line(&self, line: &str) -> Option<RawRecord> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 4 {
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

        Some(RawRecord {
            rsid: rsid.to_string(),
            chromosome: normalize_chromosome(fields[1]),
            position,
            genotype: fields[3].trim().replace(' ', ""),
        })
    }
}
