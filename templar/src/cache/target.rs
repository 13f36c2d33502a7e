//! Where rendered HTML is appended, e.g. a DOM node.
use parking_lot::Mutex;

/// Mutable append target for rendered templates.
///
/// Targets are shared between the caller and background fetches,
/// so appending goes through a shared reference.
pub trait Target: Send + Sync {
    fn append(&self, html: &str);
}

impl Target for Mutex<String> {
    fn append(&self, html: &str) {
        self.lock().push_str(html);
    }
}

impl Target for Mutex<Vec<String>> {
    fn append(&self, html: &str) {
        self.lock().push(html.to_string());
    }
}
