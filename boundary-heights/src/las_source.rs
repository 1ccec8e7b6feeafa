/// LAS/LAZ-backed cloud source adapter
use crate::error::Result;
use crate::point::CloudPoint;
use crate::subset::CloudSource;
use las::Reader;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Cloud source streaming a `.las`/`.laz` file. A fresh reader is opened
/// per enumeration; the loader streams the file exactly once per run.
pub struct LasCloudSource {
    path: PathBuf,
}

impl LasCloudSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CloudSource for LasCloudSource {
    fn point_count_hint(&self) -> Option<u64> {
        create_reader(&self.path)
            .ok()
            .map(|reader| reader.header().number_of_points())
    }

    fn for_each_point(&mut self, visit: &mut dyn FnMut(CloudPoint)) -> Result<()> {
        let mut reader = create_reader(&self.path)?;
        for point_result in reader.points() {
            let point = point_result?;
            visit(CloudPoint {
                x: point.x,
                y: point.y,
                z: point.z,
                colour: point.color.map(|c| (c.red, c.green, c.blue)),
            });
        }
        Ok(())
    }
}

/// Create LAS file reader for point cloud access.
/// Handles both .las and .laz compressed formats.
fn create_reader(file_path: &Path) -> Result<Reader> {
    let file = File::open(file_path)?;
    let buf_reader = BufReader::new(file);
    Ok(Reader::new(buf_reader)?)
}
