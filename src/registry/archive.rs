use super::ArchiveUnpacker;
use crate::error::UnpackError;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

impl ArchiveFormat {
    /// Wheels and zips are zip containers; `.tar.gz` / `.tgz` are gzip tars.
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".whl") || name.ends_with(".zip") {
            Some(ArchiveFormat::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveFormat::TarGz)
        } else {
            None
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StandardUnpacker;

impl ArchiveUnpacker for StandardUnpacker {
    fn unpack(&self, archive: &Path, dest: &Path) -> Result<(), UnpackError> {
        let Some(format) = ArchiveFormat::detect(archive) else {
            debug!("unsupported archive format: {}", archive.display());
            return Ok(());
        };
        let file = File::open(archive).map_err(|source| UnpackError::Open {
            path: archive.to_path_buf(),
            source,
        })?;
        match format {
            ArchiveFormat::Zip => {
                let mut zip =
                    zip::ZipArchive::new(BufReader::new(file)).map_err(|source| UnpackError::Zip {
                        path: archive.to_path_buf(),
                        source,
                    })?;
                zip.extract(dest).map_err(|source| UnpackError::Zip {
                    path: archive.to_path_buf(),
                    source,
                })
            }
            ArchiveFormat::TarGz => {
                let mut tar = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
                tar.unpack(dest).map_err(|source| UnpackError::Tar {
                    path: archive.to_path_buf(),
                    source,
                })
            }
        }
    }
}
