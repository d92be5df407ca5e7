// Reconciliation pipeline: date normalization, status correction and catalog merging

pub mod processing;
