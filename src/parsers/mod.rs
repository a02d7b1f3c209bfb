// ==============================================================================
// mod.rs - Consumer DNA File Parsers
// ==============================================================================
// Description: Provider detection and dispatch for raw genotype exports
// Author: Matt Barham
// Created: 2026-02-03
// Modified: 2026-02-03
// Version: 1.0.0
// ==============================================================================
// Supported providers: 23andMe, AncestryDNA, MyHeritage, FamilyTreeDNA, and
// a generic tab format. Provider is detected from header comments first,
// then column-count heuristics. Plain text and gzip-compressed exports are
// both accepted.
// ==============================================================================

pub mod ancestrydna;
pub mod genome23andme;
pub mod myheritage;

pub use ancestrydna::AncestryDnaParser;
pub use genome23andme::Genome23Parser;
pub use myheritage::MyHeritageParser;

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::GenotypeMap;

/// A single parsed genotype call, uniform across providers
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// SNP identifier ("rs..." or provider-internal "i...")
    pub rsid: String,
    /// Normalized chromosome label ("1"-"22", "X", "Y", "M")
    pub chromosome: String,
    /// Base pair position
    pub position: u64,
    /// Raw two-letter genotype as exported (may be a no-call)
    pub genotype: String,
}

/// Errors that can occur while parsing a raw DNA export
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("File is empty or contains no genotype records")]
    EmptyFile,

    #[error("Unrecognized file format")]
    UnrecognizedFormat,
}

/// Detected export provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    TwentyThreeAndMe,
    AncestryDna,
    MyHeritage,
    FamilyTreeDna,
    Generic,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::TwentyThreeAndMe => "23andMe",
            Provider::AncestryDna => "AncestryDNA",
            Provider::MyHeritage => "MyHeritage",
            Provider::FamilyTreeDna => "FamilyTreeDNA",
            Provider::Generic => "generic",
        }
    }
}

/// Genotype symbols that mean "no usable call": deletions, insertions,
/// no-reads, and placeholder zeros
pub fn is_no_call(genotype: &str) -> bool {
    genotype.len() != 2
        || genotype
            .chars()
            .any(|c| matches!(c, '0' | '-' | 'N' | 'D' | 'I'))
}

/// Normalize a chromosome label: strip any "chr" prefix, fold MT to M
pub fn normalize_chromosome(raw: &str) -> String {
    let stripped = raw.trim().trim_start_matches("chr");
    if stripped.eq_ignore_ascii_case("MT") {
        "M".to_string()
    } else {
        stripped.to_string()
    }
}

/// Detect the provider from header lines, falling back to column-count
/// heuristics on the first data line
pub fn detect_provider(lines: &[String]) -> Provider {
    let header: String = lines
        .iter()
        .take(30)
        .map(|l| l.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    if header.contains("ancestrydna") || header.contains("ancestry") {
        return Provider::AncestryDna;
    }
    if header.contains("23andme") {
        return Provider::TwentyThreeAndMe;
    }
    if header.contains("myheritage") {
        return Provider::MyHeritage;
    }
    if header.contains("ftdna") || header.contains("familytreedna") {
        return Provider::FamilyTreeDna;
    }

    // No vendor banner; guess from the shape of the first data line
    for line in lines {
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let tab_fields = line.split('\t').count();
        if tab_fields >= 5 {
            return Provider::AncestryDna;
        }
        if tab_fields == 4 {
            return Provider::TwentyThreeAndMe;
        }
        if line.matches(',').count() >= 3 {
            return Provider::MyHeritage;
        }
        break;
    }

    Provider::Generic
}

/// Read a raw export into lines, transparently decompressing gzip
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>, ParseError> {
    let path = path.as_ref();
    let file = File::open(path)?;

    let reader: Box<dyn Read> = if path.extension().is_some_and(|e| e == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let mut lines = Vec::new();
    for line in BufReader::new(reader).lines() {
        lines.push(line?);
    }
    Ok(lines)
}

/// Parse a raw DNA export into uniform records, auto-detecting the provider
pub fn parse_dna_file<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>, ParseError> {
    let lines = read_lines(path.as_ref())?;
    if lines.iter().all(|l| l.trim().is_empty()) {
        return Err(ParseError::EmptyFile);
    }

    let provider = detect_provider(&lines);
    info!("Detected provider: {}", provider.as_str());

    let records = match provider {
        Provider::AncestryDna => AncestryDnaParser::new().parse_lines(&lines)?,
        Provider::TwentyThreeAndMe | Provider::Generic => {
            Genome23Parser::new().parse_lines(&lines)?
        }
        Provider::MyHeritage | Provider::FamilyTreeDna => {
            MyHeritageParser::new().parse_lines(&lines)?
        }
    };

    if records.is_empty() {
        return Err(ParseError::EmptyFile);
    }

    debug!("Parsed {} records from {} export", records.len(), provider.as_str());
    Ok(records)
}

/// Parse a raw export and reduce it to the rsID -> genotype mapping the
/// scoring engine consumes. No-call genotypes are filtered here so the
/// core never sees them.
pub fn load_genotype_map<P: AsRef<Path>>(path: P) -> Result<GenotypeMap, ParseError> {
    let records = parse_dna_file(path)?;
    let total = records.len();

    let mut genotypes = GenotypeMap::new();
    let mut no_calls = 0usize;

    for record in records {
        if is_no_call(&record.genotype) {
            no_calls += 1;
            continue;
        }
        genotypes.insert(record.rsid, record.genotype.to_uppercase());
    }

    if no_calls > 0 {
        debug!("Filtered {} no-call genotypes", no_calls);
    }
    info!("Loaded {} usable genotypes from {} records", genotypes.len(), total);

    if genotypes.is_empty() {
        warn!("Export contained records but no usable genotype calls");
    }

    Ok(genotypes)
}
