//! Input/Output file handling with [`InputFile`] and [`OutputFile`].
//!
//! These types abstract over reading/writing both plaintext and gzip-compressed
//! input/output.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Write};
use std::path::PathBuf;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Check if a file is a gzipped by looking for the magic numbers
pub fn is_gzipped_file(file_path: impl Into<PathBuf>) -> io::Result<bool> {
    let mut file = File::open(file_path.into())?;
    let mut buffer = [0; 2];
    let n = file.read(&mut buffer)?;
    Ok(n == 2 && buffer == GZIP_MAGIC)
}

/// Check if an in-memory buffer holds gzip-compressed data.
pub fn is_gzipped_bytes(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[..2] == GZIP_MAGIC
}

/// Wrap in-memory file contents (e.g. an uploaded file) in a reader,
/// decompressing if needed.
pub fn bytes_reader(bytes: Vec<u8>) -> Box<dyn Read> {
    if is_gzipped_bytes(&bytes) {
        Box::new(GzDecoder::new(Cursor::new(bytes)))
    } else {
        Box::new(Cursor::new(bytes))
    }
}

/// Represents an input file.
///
/// This abstracts how data is read in, allowing for both plaintext and gzip-compressed input
/// to be read through a common interface.
#[derive(Clone, Debug)]
pub struct InputFile {
    pub filepath: PathBuf,
}

impl InputFile {
    /// Constructs a new `InputFile`. Compression is detected from the file
    /// contents, not the extension.
    pub fn new(filepath: impl Into<PathBuf>) -> Self {
        Self {
            filepath: filepath.into(),
        }
    }

    /// Opens the file and returns a buffered reader, transparently
    /// decompressing gzip input.
    pub fn reader(&self) -> io::Result<BufReader<Box<dyn Read>>> {
        let file = File::open(&self.filepath)?;
        let is_gzipped = is_gzipped_file(&self.filepath)?;
        let reader: Box<dyn Read> = if is_gzipped {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(BufReader::new(reader))
    }
}

/// Represents an output file.
///
/// Paths ending in `.gz` are written gzip-compressed.
pub struct OutputFile {
    filepath: PathBuf,
}

impl OutputFile {
    pub fn new(filepath: impl Into<PathBuf>) -> Self {
        Self {
            filepath: filepath.into(),
        }
    }

    /// Opens the file and returns a writer. Call [`OutputWriter::finish`]
    /// once done so a failed final write is reported.
    pub fn writer(&self) -> io::Result<OutputWriter> {
        let file = File::create(&self.filepath)?;
        let is_gzip = self
            .filepath
            .extension()
            .map_or(false, |ext| ext == "gz");
        let writer = if is_gzip {
            OutputWriter::Gzip(BufWriter::new(GzEncoder::new(file, Compression::default())))
        } else {
            OutputWriter::Plain(BufWriter::new(file))
        };
        Ok(writer)
    }
}

/// A buffered writer over a plaintext or gzip-compressed [`OutputFile`].
pub enum OutputWriter {
    Plain(BufWriter<File>),
    Gzip(BufWriter<GzEncoder<File>>),
}

impl OutputWriter {
    /// Flush buffered data and, for gzip output, write the trailer.
    pub fn finish(self) -> io::Result<()> {
        match self {
            OutputWriter::Plain(mut writer) => writer.flush(),
            OutputWriter::Gzip(writer) => {
                let encoder = writer.into_inner().map_err(|e| e.into_error())?;
                encoder.finish()?;
                Ok(())
            }
        }
    }
}

impl Write for OutputWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputWriter::Plain(w) => w.write(buf),
            OutputWriter::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputWriter::Plain(w) => w.flush(),
            OutputWriter::Gzip(w) => w.flush(),
        }
    }
}
