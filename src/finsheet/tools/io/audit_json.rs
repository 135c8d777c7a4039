use std::fs;
use std::path::Path;

use crate::finsheet::tools::audit::AuditLog;
use crate::finsheet::tools::error::Result;

/// Writes the audit trail as a pretty-printed JSON array.
pub fn write_audit_json(path: &Path, audit: &AuditLog) -> Result<()> {
    let json_string = serde_json::to_string_pretty(audit)?;
    fs::write(path, json_string)?;
    Ok(())
}

/// Loads an audit trail previously written by [`write_audit_json`].
pub fn read_audit_json(path: &Path) -> Result<AuditLog> {
    let source = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&source)?)
}
