//! Types and methods for reading and parsing input and writing output.

pub mod bed;
pub mod file;
pub mod tsv;

pub use bed::{read_bed, BedIterator};
pub use file::{InputFile, OutputFile, OutputWriter};
pub use tsv::build_tsv_reader;
