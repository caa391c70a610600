//! Shared fixtures for unit tests

use std::fs;
use std::path::Path;

use crate::crypto::FernetKey;

/// Write `keys` to `path`, one per line, readable by the owner only
pub(crate) fn write_key_file(path: &Path, keys: &[FernetKey]) {
    let contents: Vec<String> = keys.iter().map(FernetKey::to_base64).collect();
    fs::write(path, contents.join("\n")).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600)).unwrap();
    }
}
