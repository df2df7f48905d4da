//! Report output: stdout plus an optional mirror file.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use rand::Rng;

use crate::error::{HarnessError, Result};

/// Replace every `X` in `template` with a random decimal digit.
///
/// `bench-XXXX.txt` becomes something like `bench-0381.txt`, so repeated runs
/// do not overwrite each other's reports.
pub fn generate_file_name<R: Rng + ?Sized>(template: &str, rng: &mut R) -> String {
    template
        .chars()
        .map(|c| {
            if c == 'X' {
                char::from(b'0' + rng.gen_range(0..10u8))
            } else {
                c
            }
        })
        .collect()
}

/// Writes everything to `out` (stdout unless given) and, when set, to a
/// mirror file.
pub struct Tee<W = io::Stdout> {
    out: W,
    mirror: Option<File>,
}

impl Tee {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Mirror all stdout output into a newly created file at `path`.
    pub fn with_mirror(path: &Path) -> Result<Self> {
        Self::mirrored(io::stdout(), path)
    }
}

impl<W: Write> Tee<W> {
    pub fn new(out: W) -> Self {
        Self { out, mirror: None }
    }

    pub fn mirrored(out: W, path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| HarnessError::file(path, e))?;
        Ok(Self {
            out,
            mirror: Some(file),
        })
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Write for Tee<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write_all(buf)?;
        if let Some(file) = &mut self.mirror {
            file.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()?;
        if let Some(file) = &mut self.mirror {
            file.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn placeholder_digits() {
        let mut rng = StdRng::seed_from_u64(7);
        let name = generate_file_name("bench-XXX-x.txt", &mut rng);
        assert_eq!(name.len(), "bench-XXX-x.txt".len());
        assert!(name.starts_with("bench-"));
        assert!(name.ends_with("-x.txt"));
        assert!(name[6..9].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn no_placeholder_is_unchanged() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(generate_file_name("results.txt", &mut rng), "results.txt");
    }

    #[test]
    fn mirror_receives_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut tee = Tee::mirrored(Vec::new(), &path).unwrap();
        writeln!(tee, "TOTAL = 3/4").unwrap();
        tee.flush().unwrap();
        let out = tee.into_inner();
        assert_eq!(String::from_utf8(out).unwrap(), "TOTAL = 3/4\n");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "TOTAL = 3/4\n");
    }

    #[test]
    fn unmirrored_output_goes_only_to_writer() {
        let mut tee = Tee::new(Vec::new());
        write!(tee, "Gmean").unwrap();
        assert_eq!(tee.into_inner(), b"Gmean");
    }

    #[test]
    fn mirror_in_missing_directory_is_a_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.txt");
        let err = Tee::mirrored(Vec::new(), &path).err().unwrap();
        assert!(err.to_string().starts_with("Couldn't open file"), "{}", err);
    }
}
