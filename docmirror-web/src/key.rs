use md5::{Digest, Md5};

/// Content-addressed file stem for a URL: lower-case hex MD5 of the string.
///
/// A pure function of its input, so names are stable across runs. It hashes
/// the URL, not the page body.
///
/// ```
/// use docmirror_web::filename_key;
///
/// assert_eq!(filename_key(""), "d41d8cd98f00b204e9800998ecf8427e");
/// assert_eq!(filename_key("/docs/intro"), filename_key("/docs/intro"));
/// ```
pub fn filename_key(url: &str) -> String {
    hex::encode(Md5::digest(url.as_bytes()))
}
