use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;
use tracing::info;

use ls8::Ls8;

/// Loads the program at `path` and runs it to completion, printing to stdout.
///
/// Load failures (including a missing file) are reported without executing anything.
pub fn run(path: &Path) -> anyhow::Result<()> {
    let mut ls8 = Ls8::new();
    ls8.load_file(path)?;
    info!(program = %path.display(), "running");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = ls8.run(&mut out);
    out.flush()?;

    result.with_context(|| format!("machine stopped: {}", ls8.trace_line()))
}
