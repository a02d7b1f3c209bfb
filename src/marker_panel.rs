// ==============================================================================
// marker_panel.rs - Ancestry-Informative Marker Panel
// ==============================================================================
// Description: Built-in and file-loaded marker sets with population allele
//              frequencies (dbSNP ALFA / gnomAD v4 / 1000 Genomes sources)
// Author: Matt Barham
// Created: 2026-02-03
// Modified: 2026-02-03
// Version: 1.0.0
// ==============================================================================
// The panel is immutable after load and shared read-only across analyses.
// Strand-ambiguous (A/T, C/G) SNPs are rejected at validation: they cannot
// be oriented against an unknown-strand consumer file.
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::models::Marker;

/// Errors raised while loading or validating a marker panel
#[derive(Error, Debug)]
pub enum PanelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Panel deserialization failed: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Panel contains no markers")]
    Empty,

    #[error("Duplicate marker '{0}'")]
    DuplicateMarker(String),

    #[error("Marker '{rsid}': {details}")]
    InvalidMarker { rsid: String, details: String },
}

/// Immutable set of ancestry-informative markers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerPanel {
    markers: Vec<Marker>,
}

impl MarkerPanel {
    /// Build a panel from an explicit marker list, validating every entry
    pub fn new(markers: Vec<Marker>) -> Result<Self, PanelError> {
        let panel = Self { markers };
        panel.validate()?;
        Ok(panel)
    }

    /// Load a panel from a JSON file (array of markers)
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, PanelError> {
        let file = File::open(path.as_ref())?;
        let markers: Vec<Marker> = serde_json::from_reader(BufReader::new(file))?;
        let panel = Self::new(markers)?;
        info!("Loaded {} markers from {:?}", panel.len(), path.as_ref());
        Ok(panel)
    }

    /// Markers in the panel
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Number of markers (the confidence denominator)
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Structural validation: rsID syntax, allele sanity, frequency ranges
    fn validate(&self) -> Result<(), PanelError> {
        if self.markers.is_empty() {
            return Err(PanelError::Empty);
        }

        let mut seen: Vec<&str> = Vec::with_capacity(self.markers.len());
        for marker in &self.markers {
            if seen.contains(&marker.rsid.as_str()) {
                return Err(PanelError::DuplicateMarker(marker.rsid.clone()));
            }
            seen.push(&marker.rsid);

            let invalid = |details: &str| PanelError::InvalidMarker {
                rsid: marker.rsid.clone(),
                details: details.to_string(),
            };

            let well_formed_id = marker
                .rsid
                .strip_prefix("rs")
                .or_else(|| marker.rsid.strip_prefix('i'))
                .is_some_and(|digits| {
                    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
                });
            if !well_formed_id {
                return Err(invalid("identifier is not rs<digits> or i<digits>"));
            }

            for allele in [marker.ref_allele, marker.alt_allele] {
                if !matches!(allele, 'A' | 'C' | 'G' | 'T') {
                    return Err(invalid("alleles must be A, C, G, or T"));
                }
            }
            if marker.ref_allele == marker.alt_allele {
                return Err(invalid("reference and alternate alleles are identical"));
            }
            if marker.is_palindromic() {
                return Err(invalid("strand-ambiguous (palindromic) SNP"));
            }

            if marker.alt_frequencies.is_empty() {
                return Err(invalid("no population frequencies"));
            }
            for (code, freq) in &marker.alt_frequencies {
                if !(0.0..=1.0).contains(freq) {
                    return Err(invalid(&format!(
                        "frequency {} for {} outside [0, 1]",
                        freq, code
                    )));
                }
            }
        }

        Ok(())
    }

    /// The built-in panel of ancestry-informative markers.
    ///
    /// Alternate-allele frequencies sourced from dbSNP ALFA, gnomAD v4 and
    /// the 1000 Genomes Project. Positions are GRCh37/hg19.
    pub fn builtin() -> Self {
        let panel = Self {
            markers: builtin_markers(),
        };
        // Curated data, validated by unit test rather than at every startup
        debug_assert!(panel.validate().is_ok());
        panel
    }
}

fn marker(
    rsid: &str,
    gene: &str,
    chromosome: &str,
    position: u64,
    ref_allele: char,
    alt_allele: char,
    alt_frequencies: &[(&str, f64)],
) -> Marker {
    Marker {
        rsid: rsid.to_string(),
        gene: gene.to_string(),
        chromosome: chromosome.to_string(),
        position,
        ref_allele,
        alt_allele,
        alt_frequencies: alt_frequencies
            .iter()
            .map(|(code, freq)| (code.to_string(), *freq))
            .collect::<BTreeMap<String, f64>>(),
    }
}

fn builtin_markers() -> Vec<Marker> {
    vec![
        // HERC2: blue vs brown eyes, the classic European marker
        marker(
            "rs12913832",
            "HERC2",
            "15",
            28365618,
            'A',
            'G',
            &[
                ("EUR", 0.7414),
                ("GBR", 0.79),
                ("CEU", 0.70),
                ("FIN", 0.82),
                ("TSI", 0.35),
                ("IBS", 0.45),
                ("AFR", 0.01),
                ("EAS", 0.0005),
                ("CHB", 0.0003),
                ("JPT", 0.0008),
                ("SAS", 0.11),
                ("MID", 0.20),
            ],
        ),
        // SLC24A5: skin pigmentation, near-fixed ref allele in Europe
        marker(
            "rs1426654",
            "SLC24A5",
            "15",
            48426484,
            'A',
            'G',
            &[
                ("EUR", 0.004),
                ("GBR", 0.002),
                ("CEU", 0.004),
                ("FIN", 0.003),
                ("TSI", 0.01),
                ("IBS", 0.02),
                ("AFR", 0.95),
                ("EAS", 0.99),
                ("CHB", 0.995),
                ("JPT", 0.992),
                ("SAS", 0.15),
                ("MID", 0.08),
            ],
        ),
        // LCT/MCM6: lactase persistence, strong north/south European cline
        marker(
            "rs4988235",
            "LCT/MCM6",
            "2",
            136608646,
            'G',
            'A',
            &[
                ("EUR", 0.5666),
                ("GBR", 0.77),
                ("CEU", 0.72),
                ("FIN", 0.58),
                ("TSI", 0.14),
                ("IBS", 0.35),
                ("AFR", 0.02),
                ("EAS", 0.0),
                ("CHB", 0.0),
                ("JPT", 0.0),
                ("SAS", 0.113),
                ("MID", 0.22),
            ],
        ),
        // DARC/ACKR1: Duffy null, nearly exclusive to African ancestry
        marker(
            "rs2814778",
            "DARC/ACKR1",
            "1",
            159174683,
            'T',
            'C',
            &[
                ("EUR", 0.0044),
                ("GBR", 0.002),
                ("AFR", 0.858),
                ("YRI", 0.95),
                ("EAS", 0.0),
                ("SAS", 0.001),
                ("MID", 0.01),
            ],
        ),
        // ALDH2: alcohol flush, nearly exclusive to East Asia
        marker(
            "rs671",
            "ALDH2",
            "12",
            112241766,
            'G',
            'A',
            &[
                ("EUR", 0.00007),
                ("AFR", 0.0005),
                ("EAS", 0.2461),
                ("CHB", 0.22),
                ("JPT", 0.30),
                ("SAS", 0.0008),
                ("MID", 0.001),
            ],
        ),
        // EDAR: hair thickness, East Asian / Indigenous American derived allele
        marker(
            "rs3827760",
            "EDAR",
            "2",
            109513601,
            'A',
            'G',
            &[
                ("EUR", 0.008),
                ("GBR", 0.005),
                ("TSI", 0.010),
                ("AFR", 0.016),
                ("EAS", 0.858),
                ("CHB", 0.92),
                ("JPT", 0.88),
                ("SAS", 0.006),
                ("MID", 0.01),
            ],
        ),
        // MC1R: red hair variant, northwestern European
        marker(
            "rs1805007",
            "MC1R",
            "16",
            89986117,
            'C',
            'T',
            &[
                ("EUR", 0.0735),
                ("GBR", 0.10),
                ("TSI", 0.03),
                ("IBS", 0.04),
                ("AFR", 0.0141),
                ("EAS", 0.001),
                ("SAS", 0.005),
                ("MID", 0.02),
            ],
        ),
        // Intergenic chr10, highly differentiated East Asian marker
        marker(
            "rs4918664",
            "ATRNL1 region",
            "10",
            94921065,
            'A',
            'G',
            &[
                ("EUR", 0.116),
                ("AFR", 0.041),
                ("EAS", 0.834),
                ("SAS", 0.312),
                ("MID", 0.15),
            ],
        ),
        // PTK6: highly differentiated African marker
        marker(
            "rs310644",
            "PTK6",
            "20",
            62159504,
            'T',
            'C',
            &[
                ("EUR", 0.060),
                ("AFR", 0.771),
                ("EAS", 0.033),
                ("SAS", 0.08),
                ("MID", 0.10),
            ],
        ),
        // ANKK1/DRD2: moderate differentiation across all continents
        marker(
            "rs1800497",
            "ANKK1/DRD2",
            "11",
            113270828,
            'G',
            'A',
            &[
                ("EUR", 0.192),
                ("AFR", 0.335),
                ("EAS", 0.392),
                ("SAS", 0.271),
                ("MID", 0.22),
            ],
        ),
        // IRF4: pigmentation/freckling, northwestern European cline
        marker(
            "rs12203592",
            "IRF4",
            "6",
            396321,
            'C',
            'T',
            &[
                ("EUR", 0.155),
                ("GBR", 0.18),
                ("CEU", 0.14),
                ("FIN", 0.05),
                ("TSI", 0.08),
                ("IBS", 0.10),
                ("AFR", 0.03),
                ("EAS", 0.003),
                ("SAS", 0.05),
                ("MID", 0.04),
            ],
        ),
        // HERC2/OCA2 region eye color modifier
        marker(
            "rs1667394",
            "HERC2/OCA2",
            "15",
            28530182,
            'T',
            'C',
            &[
                ("EUR", 0.17),
                ("GBR", 0.14),
                ("FIN", 0.10),
                ("TSI", 0.28),
                ("IBS", 0.25),
                ("AFR", 0.85),
                ("EAS", 0.95),
                ("MID", 0.35),
            ],
        ),
        // TYR pigmentation, northern vs southern European
        marker(
            "rs1393350",
            "TYR",
            "11",
            89011046,
            'G',
            'A',
            &[
                ("EUR", 0.26),
                ("GBR", 0.27),
                ("FIN", 0.22),
                ("TSI", 0.20),
                ("IBS", 0.22),
                ("AFR", 0.03),
                ("EAS", 0.001),
                ("MID", 0.12),
            ],
        ),
        // KITLG blonde-hair tendency, peaks in Fennoscandia
        marker(
            "rs12821256",
            "KITLG",
            "12",
            89328335,
            'T',
            'C',
            &[
                ("EUR", 0.15),
                ("GBR", 0.18),
                ("CEU", 0.20),
                ("FIN", 0.28),
                ("TSI", 0.05),
                ("IBS", 0.08),
                ("AFR", 0.001),
                ("EAS", 0.001),
                ("MID", 0.02),
            ],
        ),
        // TYRP1 pigmentation
        marker(
            "rs1408799",
            "TYRP1",
            "9",
            12672097,
            'C',
            'T',
            &[
                ("EUR", 0.65),
                ("GBR", 0.68),
                ("FIN", 0.65),
                ("TSI", 0.55),
                ("IBS", 0.58),
                ("AFR", 0.20),
                ("EAS", 0.85),
                ("MID", 0.45),
            ],
        ),
        // TYR second pigmentation site
        marker(
            "rs1042602",
            "TYR",
            "11",
            88911696,
            'C',
            'A',
            &[
                ("EUR", 0.38),
                ("GBR", 0.40),
                ("TSI", 0.30),
                ("IBS", 0.33),
                ("AFR", 0.02),
                ("EAS", 0.001),
                ("SAS", 0.07),
                ("MID", 0.25),
            ],
        ),
        // OCA2 His615Arg, East Asian skin-lightening allele
        marker(
            "rs1800414",
            "OCA2",
            "15",
            28197037,
            'T',
            'C',
            &[
                ("EUR", 0.001),
                ("AFR", 0.001),
                ("EAS", 0.60),
                ("CHB", 0.62),
                ("JPT", 0.55),
                ("SAS", 0.01),
                ("MID", 0.002),
            ],
        ),
        // FADS2 region, lipid metabolism with strong continental cline
        marker(
            "rs174570",
            "FADS2",
            "11",
            61597212,
            'C',
            'T',
            &[
                ("EUR", 0.13),
                ("AFR", 0.02),
                ("EAS", 0.55),
                ("SAS", 0.20),
                ("MID", 0.11),
            ],
        ),
    ]
}
