//! Key-value outputs for the surrounding CI system.

use std::fs::OpenOptions;
use std::io::Write;

/// Appends `key=value` lines to the file named by `$GITHUB_OUTPUT`.
/// When the variable is unset there is nowhere to write and the call
/// is a no-op.
pub fn set_outputs(outputs: &[(&str, &str)]) -> std::io::Result<()> {
    let Some(path) = std::env::var_os("GITHUB_OUTPUT") else {
        return Ok(());
    };

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for (key, value) in outputs {
        if value.contains('\n') {
            writeln!(file, "{key}<<JGATE_EOF\n{value}\nJGATE_EOF")?;
        } else {
            writeln!(file, "{key}={value}")?;
        }
    }

    Ok(())
}
