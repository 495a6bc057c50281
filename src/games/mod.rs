//! Games the harness can drive.

pub mod chessblitz;
