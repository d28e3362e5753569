//! End-to-end tests for the PivotHire chat relay live under `tests/`
