/// Largest accepted upload: 50 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// MIME types an upload may declare. `image/jpg` isn't registered anywhere
/// but some platforms report it anyway.
pub const ALLOWED_MIME_TYPES: [&str; 5] = ["image/jpeg", "image/jpg", "image/png", "application/pdf", "application/zip"];

/// Extensions offered by the file picker. A hint for the user, validation
/// only ever looks at the MIME type.
pub const ACCEPTED_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".pdf", ".zip"];

/// Fallback when nothing better is known about a file.
pub const OCTET_STREAM: &str = "application/octet-stream";
