//! Sequencing libraries, their captures and normal/cancer pairings

/// Identity of one sample library capture
pub mod capture;

/// Sample sheet loading and pairing enumeration
pub mod sheet;
