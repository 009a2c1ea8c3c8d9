use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use osmpbf::ElementReader;

use crate::import::error::ImportError;

/// A map extract that can be scanned more than once.
///
/// Pass 2 of the import must re-read identical byte content from the
/// start, so the random-access capability is verified up front: a
/// source that cannot seek (a pipe, a socket) is rejected here rather
/// than failing silently mid-import.
#[derive(Debug, Clone)]
pub struct Extract {
    path: PathBuf,
}

impl Extract {
    pub fn open(path: impl Into<PathBuf>) -> Result<Extract, ImportError> {
        let path = path.into();

        let mut file = File::open(&path)?;
        if file.seek(SeekFrom::Start(0)).is_err() {
            return Err(ImportError::NotSeekable(path));
        }

        Ok(Extract { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A fresh scan over the extract, starting from the first byte.
    pub fn reader(&self) -> Result<ElementReader<BufReader<File>>, ImportError> {
        Ok(ElementReader::from_path(&self.path)?)
    }
}
