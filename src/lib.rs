//! Match reconstruction and statistics engine for tagged badminton event
//! exports: CSV rows in, rally-by-rally match record and analysis payload
//! out.

pub mod analysis;
pub mod error;
pub mod export;
pub mod roster;
pub mod rows;
pub mod score;
pub mod segment;
pub mod stats;
