// ==============================================================================
// myheritage.rs - MyHeritage / FamilyTreeDNA CSV Parser
// ==============================================================================
// Description: Parser for comma-separated raw data exports
// Author: Matt Barham
// Created: 2026-02-03
// Modified: 2026-02-03
// Version: 1.0.0
// ==============================================================================
// Format: Quoted CSV, four columns (MyHeritage, FTDNA):
//   "RSID","CHROMOSOME","POSITION","RESULT"
//   "rs4477212","1","82154","AA"
// Some FTDNA builds export five columns with the alleles split; both are
// handled. Tab-delimited FTDNA files route to the tab parsers upstream.
// ==============================================================================

use csv::ReaderBuilder;
use tracing::debug;

use super::{normalize_chromosome, ParseError, RawRecord};

/// Parser for MyHeritage and FamilyTreeDNA CSV exports
#[derive(Debug, Clone, Default)]
pub struct MyHeritageParser;

impl MyHeritageParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse pre-read lines into records; malformed rows are skipped
    pub fn parse_lines(&self, lines: &[String]) -> Result<Vec<RawRecord>, ParseError> {
        let data: String = lines
            .iter()
            .filter(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
            .map(|l| l.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(data.as_bytes());

        let mut records = Vec::new();
        let mut skipped = 0usize;

        for row in reader.records() {
            let row = row?;
            match self.parse_row(&row) {
                Some(record) => records.push(record),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!("Skipped {} malformed rows in CSV export", skipped);
        }

        Ok(records)
    }

    fn parse_row(&self, row: &csv::StringRecord) -> Option<RawRecord> {
        if row.len() < 4 {
            return None;
        }

        let rsid = row.get(0)?.trim();
        if rsid.eq_ignore_ascii_case("rsid") {
            return None; // column header row
        }
        if !(rsid.starts_with("rs") || rsid.starts_with('i')) {
            return None;
        }

        let position = row.get(2)?.trim().parse::<u64>().ok()?;

        // Five-column variants carry the alleles split
        let genotype = if row.len() >= 5 {
            format!("{}{}", row.get(3)?.trim(), row.get(4)?.trim())
        } else {
            row.get(3)?.trim().to_string()
        };

        Some(RawRecord {
            rsid: rsid.to_string(),
            chromosome: normalize_chromosome(row.get(1)?),
            position,
            genotype,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_parse_myheritage_csv() {
        let input = lines(
            "# MyHeritage DNA raw data.\n\
             RSID,CHROMOSOME,POSITION,RESULT\n\
             \"rs4477212\",\"1\",\"82154\",\"AA\"\n\
             \"rs3094315\",\"1\",\"752566\",\"AG\"\n\
             \"rs12124819\",\"1\",\"776546\",\"--\"",
        );
        let records = MyHeritageParser::new().parse_lines(&input).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].rsid, "rs4477212");
        assert_eq!(records[0].chromosome, "1");
        assert_eq!(records[0].position, 82154);
        assert_eq!(records[0].genotype, "AA");
        assert_eq!(records[2].genotype, "--");
    }

    #[test]
    fn test_parse_five_column_ftdna() {
        let input = lines("rs1,1,100,A,G");
        let records = MyHeritageParser::new().parse_lines(&input).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].genotype, "AG");
    }

    #[test]
    fn test_short_rows_skipped() {
        let input = lines("rs1,1,100\nrs2,1,200,TT");
        let records = MyHeritageParser::new().parse_lines(&input).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].rsid, "rs2");
    }

    #[test]
    fn test_mt_chromosome_normalized() {
        let input = lines("\"rs199476128\",\"MT\",\"4917\",\"GG\"");
        let records = MyHeritageParser::new().parse_lines(&input).unwrap();
        assert_eq!(records[0].chromosome, "M");
    }
}
