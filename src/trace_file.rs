//! Opens (truncating) the on-disk state-trace file at a configurable path,
//! independent of the in-process trace writer logic in `engine::trace`,
//! which only needs something `Write`.

use crate::error::{PetriNetError, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Opens `path` for writing, truncating any existing contents. Boxed as
/// `dyn Write + Send` so it can be handed straight to `Supervisor::run`.
pub fn open(path: impl AsRef<Path>) -> Result<Box<dyn Write + Send>> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| PetriNetError::TraceIo {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Box::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn truncates_existing_file_on_open() {
        let dir = std::env::temp_dir().join(format!("petri_nets_trace_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("trace.txt");
        std::fs::write(&path, "stale contents").unwrap();

        {
            let mut sink = open(&path).unwrap();
            writeln!(sink, "fresh").unwrap();
        }

        let mut contents = String::new();
        File::open(&path).unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "fresh\n");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn reports_io_error_for_unwritable_path() {
        let err = open("/nonexistent-directory-for-petri-nets/trace.txt").unwrap_err();
        assert!(matches!(err, PetriNetError::TraceIo { .. }));
    }
}
