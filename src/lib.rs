// ==============================================================================
// lib.rs - Ancestry Engine Library
// ==============================================================================
// Description: Library interface for ancestry inference modules
// Author: Matt Barham
// Created: 2026-02-03
// Modified: 2026-02-03
// Version: 1.0.0
// ==============================================================================

pub mod parsers;
pub mod validator;
pub mod genotype_matcher;
pub mod models;
pub mod marker_panel;
pub mod populations;
pub mod scoring;
pub mod aggregator;
pub mod processor;
